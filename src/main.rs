// Entrypoint for the CLI application.
// - Parses the command line, installs the logger for this invocation and
//   hands over to `cli::run`.
// - Returns `anyhow::Result` so failures print their full cause chain.

use clap::Parser;
use syojctl::cli::{self, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG, when set, takes precedence over -v.
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .format_timestamp(None)
        .init();

    cli::run(cli)
}
