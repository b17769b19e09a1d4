// Library root
// -----------
// The binary (`main.rs`) is a thin wrapper around these modules.
//
// Module responsibilities:
// - `credentials`: the session cookie pair and its on-disk store.
// - `api`: blocking HTTP client for the judge (login, problems, submit).
// - `error`: error type shared by `credentials` and `api`.
// - `cli`: clap command tree; the single place subcommands are registered.
// - `ui`: one function per subcommand, plus prompts and spinners.
// - `language`, `render`: language inference and problem formatting.
pub mod api;
pub mod cli;
pub mod credentials;
pub mod error;
pub mod language;
pub mod render;
pub mod ui;

pub use api::{ClientConfig, JudgeClient, Problem, SubmissionRequest, SubmissionResponse};
pub use credentials::{CredentialStore, Credentials};
pub use error::{Error, ErrorKind, Result};
