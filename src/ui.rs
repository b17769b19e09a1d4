// UI layer: one function per subcommand. Each builds what it needs from the
// `Context`, talks to the store and the judge client, and reports back on
// the terminal. Errors are returned with enough context for `main` to print.

use std::io::{self, IsTerminal, Read};
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context as _, Result};
use dialoguer::{Input, Password};
use indicatif::{ProgressBar, ProgressStyle};

use crate::api::{ClientConfig, JudgeClient, SubmissionRequest};
use crate::credentials::CredentialStore;
use crate::error::Error;
use crate::language;
use crate::render;

/// Everything a command needs from the outside world: where the judge
/// lives and where the session is kept.
#[derive(Debug, Clone)]
pub struct Context {
    pub client: ClientConfig,
    pub store: CredentialStore,
}

/// Log in and store the session cookies. Missing values are prompted for
/// when running interactively.
pub fn login(ctx: &Context, username: Option<String>, password: Option<String>) -> Result<()> {
    let interactive = io::stdin().is_terminal();
    let username = match non_empty(username) {
        Some(u) => u,
        None if interactive => Input::<String>::new()
            .with_prompt("Email")
            .interact_text()
            .context("Failed to read username")?,
        None => bail!(
            "Username and password are required. Please provide them via flags or environment variables."
        ),
    };
    let password = match non_empty(password) {
        Some(p) => p,
        None if interactive => Password::new()
            .with_prompt("Password")
            .interact()
            .context("Failed to read password")?,
        None => bail!(
            "Username and password are required. Please provide them via flags or environment variables."
        ),
    };

    let judge = JudgeClient::new(&ctx.client).context("Failed to create API client")?;
    let spinner = spinner("Logging in...");
    let result = judge.authenticate(&username, &password);
    spinner.finish_and_clear();
    let credentials = result.context("Failed during login")?;

    if !credentials.is_usable() {
        bail!("Login was accepted but the judge did not return a complete session; nothing was saved");
    }

    ctx.store
        .save(&credentials)
        .context("Failed to save credentials to file")?;
    log::info!("credentials saved to {}", ctx.store.path().display());
    println!("Logged in. Credentials saved to {}", ctx.store.path().display());
    Ok(())
}

/// Forget the stored session.
pub fn logout(ctx: &Context) -> Result<()> {
    let removed = ctx
        .store
        .delete()
        .context("Failed to remove credentials")?;
    println!("Removed {}", removed.display());
    Ok(())
}

/// Fetch a problem and print it. Styled output is only used on a terminal.
pub fn show_problem(ctx: &Context, problem_id: &str, raw: bool) -> Result<()> {
    let judge = authenticated_client(ctx)?;

    let spinner = spinner("Fetching problem...");
    let result = judge.fetch_problem(problem_id);
    spinner.finish_and_clear();
    let problem = result.context("Failed to fetch problem")?;

    let markdown = render::problem_to_markdown(&problem);
    if raw || !io::stdout().is_terminal() {
        print!("{}", markdown);
    } else {
        render::print_markdown(&markdown).context("Failed to render problem")?;
    }
    Ok(())
}

/// Submit code from `input` (or stdin) for `problem_id`.
pub fn submit(
    ctx: &Context,
    problem_id: &str,
    input: Option<&Path>,
    language: Option<String>,
) -> Result<()> {
    let code = read_source(input)?;
    if code.is_empty() {
        bail!("No code provided for submission");
    }
    let language = resolve_language(input, language);
    if language.trim().is_empty() {
        bail!("Language must not be empty");
    }

    let judge = authenticated_client(ctx)?;
    let request = SubmissionRequest::new(code, language, problem_id);

    let spinner = spinner("Submitting...");
    let result = judge.submit(&request);
    spinner.finish_and_clear();
    let response = result.context("Failed to submit code")?;

    println!(
        "Submitted {} solution for {}: {}",
        language::display_name(&request.language),
        problem_id,
        response.message
    );
    Ok(())
}

fn authenticated_client(ctx: &Context) -> Result<JudgeClient> {
    let credentials = ctx
        .store
        .load()
        .context("Failed to load credentials. Please login first.")?;
    JudgeClient::authenticated(&ctx.client, &credentials).map_err(|e| match e {
        Error::InvalidCredentials => {
            anyhow::Error::new(e).context("Stored session is unusable. Please login again.")
        }
        other => anyhow::Error::new(other).context("Failed to create API client"),
    })
}

/// Source is sent as text; bytes that are not UTF-8 become U+FFFD rather
/// than failing the submission.
fn read_source(input: Option<&Path>) -> Result<String> {
    let bytes = match input {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("Failed to read input file {}", path.display()))?,
        None => {
            let mut stdin = io::stdin();
            if stdin.is_terminal() {
                log::info!("Reading code from standard input. Press Ctrl+D when finished.");
                eprintln!("Reading code from standard input. Press Ctrl+D when finished.");
            }
            let mut buf = Vec::new();
            stdin
                .read_to_end(&mut buf)
                .context("Failed to read code from standard input")?;
            buf
        }
    };
    Ok(source_text(bytes))
}

fn source_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("source is not valid UTF-8, replacing invalid bytes");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    }
}

/// Explicit language wins; otherwise infer from the file name, falling back
/// to the default tag.
fn resolve_language(input: Option<&Path>, explicit: Option<String>) -> String {
    if let Some(language) = explicit {
        return language;
    }
    match input {
        Some(path) => match language::infer(path) {
            Some(tag) => {
                log::info!("inferred language {} from {}", tag, path.display());
                tag.to_string()
            }
            None => {
                log::warn!(
                    "Could not infer language from file extension, defaulting to {}",
                    language::display_name(language::DEFAULT)
                );
                language::DEFAULT.to_string()
            }
        },
        None => {
            log::info!(
                "No language specified, defaulting to {}",
                language::display_name(language::DEFAULT)
            );
            language::DEFAULT.to_string()
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
