mod common;

use std::time::Duration;

use common::{login_ok, MockJudge, MockResponse};
use serde_json::json;
use syojctl::ui::{self, Context};
use syojctl::{ClientConfig, CredentialStore, Credentials};
use tempfile::TempDir;

fn context(judge: &MockJudge, dir: &TempDir) -> Context {
    Context {
        client: ClientConfig::default()
            .with_base_url(judge.base_url())
            .with_timeout(Duration::from_secs(5)),
        store: CredentialStore::at(dir.path().join("credentials.json")),
    }
}

#[test]
fn login_saves_the_session() {
    let judge = MockJudge::start(|_| login_ok("abc", "def"));
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&judge, &dir);

    ui::login(&ctx, Some("user@example.com".into()), Some("pw".into())).unwrap();
    assert_eq!(ctx.store.load().unwrap(), Credentials::new("abc", "def"));
}

#[test]
fn login_with_partial_session_saves_nothing() {
    let judge = MockJudge::start(|_| {
        MockResponse::json(200, json!({"message": "Successfully logged in"}))
            .with_cookie("Token=abc; Path=/")
    });
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&judge, &dir);

    let err = ui::login(&ctx, Some("user".into()), Some("pw".into())).unwrap_err();
    assert!(err.to_string().contains("nothing was saved"));
    assert_eq!(judge.requests().len(), 1);
    assert!(!ctx.store.path().exists());
}

#[test]
fn rejected_login_keeps_the_previous_session() {
    let judge = MockJudge::start(|_| MockResponse::text(401, "Unauthorized"));
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&judge, &dir);
    ctx.store.save(&Credentials::new("old", "old-id")).unwrap();

    assert!(ui::login(&ctx, Some("user".into()), Some("wrong".into())).is_err());
    assert_eq!(ctx.store.load().unwrap(), Credentials::new("old", "old-id"));
}
