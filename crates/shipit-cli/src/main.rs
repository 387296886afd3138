//! shipit - package serverless functions into deployable zip archives.

use clap::Parser;
use miette::Result;
use shipit_cli::{cli, commands, error, logger, ui};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = match args.command {
        cli::Command::Zip(zip_args) => commands::zip_execute(zip_args).await,
        cli::Command::Deps(deps_args) => commands::deps_execute(deps_args),
    };

    result.map_err(error::cli_error_to_miette)
}
