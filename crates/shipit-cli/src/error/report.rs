//! Miette diagnostic conversion for CLI errors.

use miette::Report;

use crate::error::CliError;

/// Convert a [`CliError`] into a miette report, attaching its hint.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err.hint() {
        Some(hint) => miette::miette!(help = hint, "{}", err),
        None => miette::miette!("{}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn report_keeps_message_and_help() {
        let err = CliError::Config(shipit_config::ConfigError::NotFound(PathBuf::from(
            "ci.toml",
        )));
        let report = cli_error_to_miette(err);
        assert!(report.to_string().contains("ci.toml"));
        let help = report.help().map(|help| help.to_string());
        assert_eq!(help.as_deref(), Some("Check the path given to --config"));
    }
}
