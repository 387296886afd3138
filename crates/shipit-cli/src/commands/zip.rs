//! `shipit zip`: package every function of a directory.

use std::time::Instant;

use shipit_bundler::{PackOptions, zip_functions};

use crate::cli::ZipArgs;
use crate::commands::utils;
use crate::error::{CliError, Result, pack_hint};
use crate::ui;

/// Execute the zip command.
///
/// Every failed function is reported on stderr; the command then fails as
/// a whole so scripts see a non-zero exit status.
pub async fn execute(args: ZipArgs) -> Result<()> {
    let start_time = Instant::now();
    let cwd = utils::get_cwd()?;
    let config = utils::load_config(&args.resolve, &cwd)?;

    let src = utils::resolve_path(&args.src, &cwd);
    let dest = utils::resolve_path(&args.dest, &cwd);
    let options = PackOptions::from_config(&config);

    let report = zip_functions(&src, &dest, options).await?;
    let total = report.packaged.len() + report.failures.len();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report.packaged)?);
    } else if total == 0 {
        ui::warning(&format!("No functions found in {}", src.display()));
    } else {
        ui::print_package_summary(&report.packaged);
    }

    for failure in &report.failures {
        ui::error(&format!("{}: {}", failure.name, failure.error));
        if let Some(hint) = pack_hint(&failure.error) {
            ui::info(&hint);
        }
    }

    if !report.is_success() {
        return Err(CliError::FunctionsFailed {
            failed: report.failures.len(),
            total,
        });
    }

    if !args.json && total > 0 {
        ui::success(&format!(
            "Packaged {} function{} in {}",
            total,
            if total == 1 { "" } else { "s" },
            ui::format_duration(start_time.elapsed())
        ));
    }
    Ok(())
}
