//! Formatting utilities for sizes, durations and the packaging summary.

use std::fs;
use std::time::Duration;

use console::Term;
use owo_colors::OwoColorize;
use shipit_bundler::PackagedFunction;

use super::colors_enabled;

/// Format file size in human-readable format.
///
/// ```
/// use shipit_cli::ui::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(1024), "1.00 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", bytes, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Format duration in human-readable format.
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{total_ms}ms")
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Print one line per packaged archive, then the total size.
pub fn print_package_summary(packaged: &[PackagedFunction]) {
    if packaged.is_empty() {
        return;
    }

    let width = usize::from(Term::stderr().size().1).min(80);
    let rule = "─".repeat(width);
    let colored = colors_enabled();

    if colored {
        eprintln!("\n{}", "Packaged functions".bold().underline());
    } else {
        eprintln!("\nPackaged functions");
    }
    eprintln!("{rule}");

    let mut total_size = 0;
    for function in packaged {
        let size = fs::metadata(&function.path).map(|m| m.len()).unwrap_or(0);
        total_size += size;
        let size = format_size(size);
        let archive = function.path.display().to_string();

        if colored {
            eprintln!(
                "  {} {} {} {} {}",
                "▸".blue(),
                function.name.bright_white().bold(),
                format!("[{}]", function.runtime).cyan(),
                archive.dimmed(),
                size.dimmed()
            );
        } else {
            eprintln!(
                "  ▸ {} [{}] {} {}",
                function.name, function.runtime, archive, size
            );
        }
    }

    eprintln!("{rule}");
    eprintln!("  Total: {}", format_size(total_size));
}
