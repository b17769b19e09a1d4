// CLI module: the clap command tree and the dispatch from parsed arguments
// to the command functions in `ui`. Global options build the shared context.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;

use crate::api::{ClientConfig, DEFAULT_BASE_URL};
use crate::credentials::CredentialStore;
use crate::ui::{self, Context};

#[derive(Parser, Debug)]
#[command(name = "syojctl", version)]
#[command(about = "Command-line client for the SYOJ online judge", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Address of the judge service
    #[arg(long, global = true, env = "SYOJ_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    pub timeout: u64,

    /// Use this credentials file instead of the per-user config location
    #[arg(long, global = true, value_name = "FILE")]
    pub credentials: Option<PathBuf>,

    /// More output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and save the session for later commands
    Login {
        #[arg(short, long, env = "SYOJ_USERNAME")]
        username: Option<String>,
        #[arg(short, long, env = "SYOJ_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Remove the saved session
    Logout,
    /// Show a problem statement
    #[command(name = "show-problem")]
    ShowProblem {
        problem_id: String,
        /// Print plain markdown even on a terminal
        #[arg(long)]
        raw: bool,
    },
    /// Submit a solution, read from a file or standard input
    #[command(after_help = "Examples:\n  syojctl submit I001 -i solution.cpp\n  syojctl submit I001 < solution.cpp")]
    Submit {
        problem_id: String,
        /// Source file (standard input when omitted)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,
        /// Judge language tag, e.g. cpp20 or python (inferred from the file extension when omitted)
        #[arg(short, long)]
        language: Option<String>,
    },
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    fn context(&self) -> Result<Context> {
        let client = ClientConfig::default()
            .with_base_url(self.base_url.clone())
            .with_timeout(Duration::from_secs(self.timeout));
        let store = match &self.credentials {
            Some(path) => CredentialStore::at(path),
            None => CredentialStore::from_env().context("Failed to locate credentials file")?,
        };
        Ok(Context { client, store })
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let ctx = cli.context()?;
    match cli.command {
        Commands::Login { username, password } => ui::login(&ctx, username, password),
        Commands::Logout => ui::logout(&ctx),
        Commands::ShowProblem { problem_id, raw } => ui::show_problem(&ctx, &problem_id, raw),
        Commands::Submit {
            problem_id,
            input,
            language,
        } => ui::submit(&ctx, &problem_id, input.as_deref(), language),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_submit_flags() {
        let cli = Cli::try_parse_from([
            "syojctl", "submit", "I001", "-i", "sol.rs", "-l", "rust", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.log_level(), LevelFilter::Debug);
        match cli.command {
            Commands::Submit {
                problem_id,
                input,
                language,
            } => {
                assert_eq!(problem_id, "I001");
                assert_eq!(input, Some(PathBuf::from("sol.rs")));
                assert_eq!(language.as_deref(), Some("rust"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn show_problem_requires_an_id() {
        assert!(Cli::try_parse_from(["syojctl", "show-problem"]).is_err());
    }

    #[test]
    fn credentials_override_builds_single_file_store() {
        let cli = Cli::try_parse_from([
            "syojctl",
            "logout",
            "--credentials",
            "/tmp/creds.json",
            "--timeout",
            "5",
        ])
        .unwrap();
        let ctx = cli.context().unwrap();
        assert_eq!(ctx.store.path(), std::path::Path::new("/tmp/creds.json"));
        assert_eq!(ctx.client.timeout, Duration::from_secs(5));
    }
}
