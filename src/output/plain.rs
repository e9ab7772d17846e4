//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting.

use super::TimeDisplay;
use crate::storage::{CategoryStats, ScanRecord};
use crate::types::{Category, Source};
use crate::weather::WeatherData;
use crate::workflow::ScanOutcome;
use console::{style, Style};
use std::io::{self, Write};

const RULE: &str = "───────────────────────────────────────────────────────";
const BAR_WIDTH: usize = 30;

fn category_style(category: Category) -> Style {
    match category {
        Category::Paper => Style::new().blue().bold(),
        Category::Plastic => Style::new().yellow().bold(),
        Category::Organic => Style::new().green().bold(),
    }
}

fn source_label(source: Option<Source>) -> &'static str {
    source.map_or("-", |s| s.as_str())
}

/// Print a ledger listing as a table.
pub fn write_history<W: Write>(
    out: &mut W,
    records: &[ScanRecord],
    time: TimeDisplay,
) -> io::Result<()> {
    if records.is_empty() {
        writeln!(out, "  {}", style("No scans recorded yet.").dim())?;
        return Ok(());
    }

    writeln!(out, "  {}", style(RULE).dim())?;
    writeln!(
        out,
        "  {:>6}  {:<9}  {:<9}  {}",
        style("ID").bold(),
        style("TYPE").bold(),
        style("SOURCE").bold(),
        style("RECORDED").bold()
    )?;
    writeln!(out, "  {}", style(RULE).dim())?;

    for record in records {
        writeln!(
            out,
            "  {:>6}  {:<9}  {:<9}  {}",
            record.id,
            category_style(record.category).apply_to(record.category.as_str()),
            source_label(record.source),
            style(time.human(record.created_at)).dim()
        )?;
    }

    writeln!(out, "  {}", style(RULE).dim())?;
    writeln!(out, "  {} scan(s)", records.len())?;
    Ok(())
}

/// Print per-category counts with a proportional bar.
pub fn write_stats<W: Write>(out: &mut W, stats: &CategoryStats) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "  {}", style("Scans by category").bold())?;
    writeln!(out)?;

    for category in Category::ALL {
        let count = stats.count(category);
        let filled = if stats.total == 0 {
            0
        } else {
            count * BAR_WIDTH / stats.total
        };
        writeln!(
            out,
            "  {:<9} {:>5}  {}",
            category_style(category).apply_to(category.as_str()),
            count,
            category_style(category).apply_to("█".repeat(filled))
        )?;
    }

    writeln!(out, "  {:<9} {:>5}", style("Total").bold(), stats.total)?;
    writeln!(out)?;
    Ok(())
}

/// Print the result of a completed scan.
pub fn write_outcome<W: Write>(
    out: &mut W,
    outcome: &ScanOutcome,
    time: TimeDisplay,
) -> io::Result<()> {
    let result = &outcome.classification;

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out, "                  {} Scan Result", style("SmartBin").cyan().bold())?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    writeln!(
        out,
        "  {} {}",
        style("Category:").bold(),
        category_style(result.category).apply_to(result.category.as_str())
    )?;
    writeln!(
        out,
        "  {} {:.1}%",
        style("Confidence:").bold(),
        result.percent()
    )?;
    writeln!(out, "  {} {}", style("Source:").bold(), result.source)?;
    if let Some(details) = &result.details {
        writeln!(
            out,
            "  {} {}",
            style("Details:").bold(),
            style(truncate_string(details, 60)).dim()
        )?;
    }
    writeln!(
        out,
        "  {} #{} at {}",
        style("Recorded:").bold(),
        outcome.record.id,
        time.human(outcome.record.created_at)
    )?;

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;
    Ok(())
}

/// Print a weather reading on one line.
pub fn write_weather<W: Write>(out: &mut W, weather: &WeatherData) -> io::Result<()> {
    writeln!(
        out,
        "{} {}°C, {} ({}% humidity)",
        style(&weather.city).bold(),
        style(weather.temperature).cyan().bold(),
        weather.description,
        weather.humidity
    )
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Truncate a string to a maximum number of characters, adding ellipsis if
/// truncated.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
