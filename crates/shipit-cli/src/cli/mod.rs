//! Command-line interface definition.
//!
//! - `shipit zip` - package every function of a directory
//! - `shipit deps` - print the dependency closure of one entry file

mod commands;

use clap::Parser;

pub use commands::{Command, DepsArgs, ResolveArgs, ZipArgs};

/// shipit - package serverless functions into deployable zip archives
#[derive(Parser, Debug)]
#[command(
    name = "shipit",
    version,
    about = "Package serverless functions into deployable zip archives",
    long_about = "shipit turns a directory of serverless functions into one zip archive per function.\n\
                  Node.js functions ship with exactly the installed packages they import; Go\n\
                  binaries, python sources and prebuilt archives are packaged as they are."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn parses_zip() {
        let cli = Cli::try_parse_from([
            "shipit",
            "zip",
            "functions",
            "dist",
            "--tree-shake",
            "--search-root",
            ".plugins",
            "--search-root",
            "/opt/mods",
            "--json",
        ])
        .unwrap();

        let Command::Zip(args) = cli.command else {
            panic!("expected zip");
        };
        assert_eq!(args.src, PathBuf::from("functions"));
        assert_eq!(args.dest, PathBuf::from("dist"));
        assert!(args.json);
        assert!(args.resolve.tree_shake);
        assert_eq!(
            args.resolve.search_roots,
            vec![PathBuf::from(".plugins"), PathBuf::from("/opt/mods")]
        );
        assert_eq!(args.resolve.config, None);
    }

    #[test]
    fn parses_deps_with_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "shipit",
            "deps",
            "functions/hello/hello.js",
            "--base",
            ".",
            "--config",
            "ci.toml",
            "--verbose",
        ])
        .unwrap();

        assert!(cli.verbose);
        let Command::Deps(args) = cli.command else {
            panic!("expected deps");
        };
        assert_eq!(args.entry, PathBuf::from("functions/hello/hello.js"));
        assert_eq!(args.base, Some(PathBuf::from(".")));
        assert_eq!(args.resolve.config, Some(PathBuf::from("ci.toml")));
        assert!(!args.resolve.tree_shake);
    }

    #[test]
    fn verbose_conflicts_with_quiet() {
        let result = Cli::try_parse_from(["shipit", "-v", "-q", "zip", "a", "b"]);
        assert!(result.is_err());
    }

    #[test]
    fn zip_requires_both_directories() {
        assert!(Cli::try_parse_from(["shipit", "zip", "functions"]).is_err());
    }
}
