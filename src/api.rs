// API client module: a small blocking HTTP client for the SYOJ judge.
// Authentication is cookie based, so every client owns one cookie jar that
// is shared by all of its requests.

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::credentials::Credentials;
use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://syoj.org";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Message the login endpoint returns when the credentials were accepted.
pub const LOGIN_SUCCESS_MESSAGE: &str = "Successfully logged in";

pub const TOKEN_COOKIE: &str = "Token";
pub const TOKEN_ID_COOKIE: &str = "TokenId";

/// Transport settings for a [`JudgeClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("syojctl/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Login request payload.
#[derive(Serialize, Debug)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize, Debug)]
struct LoginResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    message: String,
}

/// Source code sent to the judge for evaluation.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    pub code: String,
    pub language: String,
    pub problem_id: String,
}

impl SubmissionRequest {
    pub fn new(
        code: impl Into<String>,
        language: impl Into<String>,
        problem_id: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            language: language.into(),
            problem_id: problem_id.into(),
        }
    }
}

/// What the judge says after accepting a submission.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}

/// A problem as served by `/api/problems/{id}`.
///
/// The judge omits or nulls fields freely, so every field falls back to its
/// zero value instead of failing the whole response.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Problem {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub difficulty: String,
    /// Milliseconds.
    #[serde(deserialize_with = "null_as_default")]
    pub time_limit: u64,
    /// Megabytes.
    #[serde(deserialize_with = "null_as_default")]
    pub memory_limit: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub notes: String,
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<Tag>,
    #[serde(deserialize_with = "null_as_default")]
    pub allowed_languages: Vec<AllowedLanguage>,
    #[serde(deserialize_with = "null_as_default")]
    pub author: Author,
    #[serde(deserialize_with = "null_as_default")]
    pub test_cases: Vec<TestCaseGroup>,
    #[serde(rename = "ProblemSection", deserialize_with = "null_as_default")]
    pub sections: Vec<Section>,
    #[serde(deserialize_with = "null_as_default")]
    pub allow_submit: bool,
}

impl Problem {
    /// Sections sorted by their `order` field; ties keep the served order.
    pub fn ordered_sections(&self) -> Vec<&Section> {
        let mut sections: Vec<&Section> = self.sections.iter().collect();
        sections.sort_by_key(|s| s.order);
        sections
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Tag {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AllowedLanguage {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Tag to pass as the submission language.
    #[serde(deserialize_with = "null_as_default")]
    pub value: String,
    #[serde(deserialize_with = "null_as_default")]
    pub highlight: String,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Author {
    #[serde(deserialize_with = "null_as_default")]
    pub display_name: String,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct TestCaseGroup {
    #[serde(deserialize_with = "null_as_default")]
    pub test_cases: Vec<TestCase>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct TestCase {
    #[serde(deserialize_with = "null_as_default")]
    pub input: String,
    #[serde(deserialize_with = "null_as_default")]
    pub output: String,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Section {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(deserialize_with = "null_as_default")]
    pub order: i64,
}

/// Treat an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Blocking client for the judge API. Holds the reqwest client, the base
/// URL and the cookie jar the reqwest client reads from and writes to.
#[derive(Clone)]
pub struct JudgeClient {
    client: Client,
    base_url: Url,
    jar: Arc<Jar>,
}

impl JudgeClient {
    /// Client without a session; only useful for [`authenticate`].
    ///
    /// [`authenticate`]: JudgeClient::authenticate
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = parse_base_url(&config.base_url)?;
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        log::debug!(
            "judge client for {} (timeout {:?})",
            base_url,
            config.timeout
        );
        Ok(JudgeClient {
            client,
            base_url,
            jar,
        })
    }

    /// Client whose every request carries the session cookies from
    /// `credentials`. Incomplete credentials are rejected up front, before
    /// anything touches the network.
    pub fn authenticated(config: &ClientConfig, credentials: &Credentials) -> Result<Self> {
        if !credentials.is_usable() {
            return Err(Error::InvalidCredentials);
        }
        let judge = Self::new(config)?;
        judge.jar.add_cookie_str(
            &format!("{}={}; Path=/", TOKEN_COOKIE, credentials.token),
            &judge.base_url,
        );
        judge.jar.add_cookie_str(
            &format!("{}={}; Path=/", TOKEN_ID_COOKIE, credentials.token_id),
            &judge.base_url,
        );
        Ok(judge)
    }

    /// Log in and return the session cookies the judge set in response.
    ///
    /// Only a 200 carrying the exact success message counts as a login; a
    /// 200 with any other message is a rejection. Cookies that the judge did
    /// not set come back as empty strings.
    pub fn authenticate(&self, identifier: &str, secret: &str) -> Result<Credentials> {
        let url = self.endpoint(&["api", "login"])?;
        let res = self
            .client
            .post(url.clone())
            .json(&LoginRequest {
                email: identifier,
                password: secret,
            })
            .send()?;

        let status = res.status();
        let body = res.text()?;
        log::info!("login answered with status {} ({} bytes)", status, body.len());

        let message = match serde_json::from_str::<LoginResponse>(&body) {
            Ok(parsed) => parsed.message,
            Err(e) => {
                log::debug!("login response is not JSON: {}", e);
                body.trim().to_string()
            }
        };

        if status != StatusCode::OK || message != LOGIN_SUCCESS_MESSAGE {
            log::warn!("login rejected: status {}, message {:?}", status, message);
            return Err(Error::Auth {
                status: status.as_u16(),
                message,
            });
        }

        let credentials = Credentials::new(
            self.cookie(&url, TOKEN_COOKIE).unwrap_or_default(),
            self.cookie(&url, TOKEN_ID_COOKIE).unwrap_or_default(),
        );
        if !credentials.is_usable() {
            log::warn!("login succeeded but the session cookies were not (all) set");
        }
        Ok(credentials)
    }

    /// Fetch one problem statement.
    pub fn fetch_problem(&self, problem_id: &str) -> Result<Problem> {
        if problem_id.trim().is_empty() {
            return Err(Error::InvalidInput("problem id"));
        }
        let url = self.endpoint(&["api", "problems", problem_id])?;
        let res = self.client.get(url).send()?;
        decode(res, "fetch problem", "problem")
    }

    /// Send code for evaluation. Nothing is remembered between calls, so
    /// the same request can be submitted any number of times.
    pub fn submit(&self, request: &SubmissionRequest) -> Result<SubmissionResponse> {
        if request.code.is_empty() {
            return Err(Error::InvalidInput("code"));
        }
        if request.language.trim().is_empty() {
            return Err(Error::InvalidInput("language"));
        }
        if request.problem_id.trim().is_empty() {
            return Err(Error::InvalidInput("problem id"));
        }

        let url = self.endpoint(&["api", "submit"])?;
        log::info!(
            "submitting {} bytes of {} for problem {}",
            request.code.len(),
            request.language,
            request.problem_id
        );
        let res = self.client.post(url).json(request).send()?;
        decode(res, "submit", "submission")
    }

    /// Value of the cookie called `name` that the jar would send to `url`.
    fn cookie(&self, url: &Url, name: &str) -> Option<String> {
        let header = self.jar.cookies(url)?;
        let header = header.to_str().ok()?;
        find_cookie(header, name).map(str::to_string)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "cannot be a base".into(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let invalid = |reason: String| Error::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("expected an http(s) address".into()));
    }
    Ok(url)
}

/// Check the status and decode a JSON body. Non-200 answers are reported
/// by status only; their bodies are not read.
fn decode<T: DeserializeOwned>(
    res: Response,
    operation: &'static str,
    what: &'static str,
) -> Result<T> {
    let status = res.status();
    if status != StatusCode::OK {
        log::warn!("{} failed with status {}", operation, status);
        return Err(Error::Status {
            operation,
            status: status.as_u16(),
        });
    }

    let body = res.text()?;
    log::debug!("{} response: {} bytes", what, body.len());
    serde_json::from_str(&body).map_err(|source| Error::Decode { what, source })
}

/// Pick `name` out of a `Cookie` header value (`a=1; b=2`).
fn find_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then_some(value)
    })
}
