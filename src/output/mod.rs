//! Output formatting module.
//!
//! Provides formatters for plain text, JSON, and CSV output of ledger
//! listings, category statistics, scan outcomes and weather readings.
//! Every formatter writes to a caller-supplied [`Write`]; the `print_*`
//! wrappers target stdout.

mod csv_format;
mod json_format;
mod plain;

pub use plain::{print_error, print_info, print_success, print_warning};

use crate::storage::{format_timestamp, CategoryStats, ScanRecord};
use crate::weather::WeatherData;
use crate::workflow::ScanOutcome;
use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Time zone used when rendering stored (UTC) timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeDisplay {
    #[default]
    Utc,
    Local,
}

impl TimeDisplay {
    pub fn from_local_flag(local: bool) -> Self {
        if local {
            Self::Local
        } else {
            Self::Utc
        }
    }

    /// RFC 3339 with milliseconds, for JSON and CSV.
    pub fn machine(self, ts: DateTime<Utc>) -> String {
        match self {
            Self::Utc => format_timestamp(ts),
            Self::Local => ts
                .with_timezone(&Local)
                .to_rfc3339_opts(SecondsFormat::Millis, false),
        }
    }

    /// Short form for terminal tables.
    pub fn human(self, ts: DateTime<Utc>) -> String {
        match self {
            Self::Utc => ts.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            Self::Local => ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Flat view of a ledger row, keyed the way the ledger names its columns.
#[derive(Debug, Serialize)]
struct HistoryRow {
    id: i64,
    #[serde(rename = "type")]
    category: &'static str,
    #[serde(rename = "createdAt")]
    created_at: String,
    source: Option<&'static str>,
}

impl HistoryRow {
    fn new(record: &ScanRecord, time: TimeDisplay) -> Self {
        Self {
            id: record.id.as_i64(),
            category: record.category.as_str(),
            created_at: time.machine(record.created_at),
            source: record.source.map(|s| s.as_str()),
        }
    }
}

/// Write a ledger listing.
pub fn write_history<W: Write>(
    out: &mut W,
    records: &[ScanRecord],
    format: OutputFormat,
    time: TimeDisplay,
) -> io::Result<()> {
    match format {
        OutputFormat::Plain => plain::write_history(out, records, time),
        OutputFormat::Json => {
            let rows: Vec<_> = records.iter().map(|r| HistoryRow::new(r, time)).collect();
            json_format::write_json(out, &rows)
        }
        OutputFormat::Csv => csv_format::write_history(out, records, time),
    }
}

/// Write per-category counts.
pub fn write_stats<W: Write>(
    out: &mut W,
    stats: &CategoryStats,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Plain => plain::write_stats(out, stats),
        OutputFormat::Json => json_format::write_json(out, stats),
        OutputFormat::Csv => csv_format::write_stats(out, stats),
    }
}

/// Write the result of a completed scan.
pub fn write_outcome<W: Write>(
    out: &mut W,
    outcome: &ScanOutcome,
    format: OutputFormat,
    time: TimeDisplay,
) -> io::Result<()> {
    match format {
        OutputFormat::Plain => plain::write_outcome(out, outcome, time),
        OutputFormat::Json => json_format::write_json(out, outcome),
        OutputFormat::Csv => csv_format::write_outcome(out, outcome, time),
    }
}

/// Write a weather reading.
pub fn write_weather<W: Write>(
    out: &mut W,
    weather: &WeatherData,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Plain => plain::write_weather(out, weather),
        OutputFormat::Json => json_format::write_json(out, weather),
        OutputFormat::Csv => csv_format::write_weather(out, weather),
    }
}

/// Print a completed scan to stdout.
pub fn print_outcome(
    outcome: &ScanOutcome,
    format: OutputFormat,
    time: TimeDisplay,
) -> io::Result<()> {
    write_outcome(&mut io::stdout().lock(), outcome, format, time)
}

/// Print a weather reading to stdout.
pub fn print_weather(weather: &WeatherData, format: OutputFormat) -> io::Result<()> {
    write_weather(&mut io::stdout().lock(), weather, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassificationResult;
    use crate::types::{Category, RecordId, Source};
    use chrono::TimeZone;

    fn record(id: i64, category: Category, source: Option<Source>) -> ScanRecord {
        ScanRecord {
            id: RecordId::new(id),
            category,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap(),
            source,
        }
    }

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_history_json_uses_ledger_column_names() {
        let records = vec![record(2, Category::Paper, Some(Source::Remote))];
        let text = render(|out| {
            write_history(out, &records, OutputFormat::Json, TimeDisplay::Utc)
        });

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["id"], 2);
        assert_eq!(value[0]["type"], "Paper");
        assert_eq!(value[0]["createdAt"], "2024-03-01T08:30:00.000Z");
        assert_eq!(value[0]["source"], "remote");
    }

    #[test]
    fn test_history_csv_leaves_unknown_source_empty() {
        let records = vec![
            record(3, Category::Organic, Some(Source::Fallback)),
            record(1, Category::Plastic, None),
        ];
        let text = render(|out| {
            write_history(out, &records, OutputFormat::Csv, TimeDisplay::Utc)
        });

        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "id,type,createdAt,source");
        assert_eq!(lines[1], "3,Organic,2024-03-01T08:30:00.000Z,fallback");
        assert_eq!(lines[2], "1,Plastic,2024-03-01T08:30:00.000Z,");
    }

    #[test]
    fn test_history_plain_lists_every_record() {
        let records = vec![
            record(2, Category::Paper, Some(Source::Manual)),
            record(1, Category::Plastic, None),
        ];
        let text = render(|out| {
            write_history(out, &records, OutputFormat::Plain, TimeDisplay::Utc)
        });

        assert!(text.contains("Paper"));
        assert!(text.contains("Plastic"));
        assert!(text.contains("2024-03-01 08:30:00 UTC"));
    }

    #[test]
    fn test_empty_history_plain() {
        let text = render(|out| write_history(out, &[], OutputFormat::Plain, TimeDisplay::Utc));
        assert!(text.contains("No scans recorded yet."));
    }

    #[test]
    fn test_stats_csv() {
        let stats = CategoryStats::from_records(&[
            record(1, Category::Paper, None),
            record(2, Category::Paper, None),
            record(3, Category::Organic, None),
        ]);
        let text = render(|out| write_stats(out, &stats, OutputFormat::Csv));
        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            vec!["type,count", "Paper,2", "Plastic,0", "Organic,1", "Total,3"]
        );
    }

    #[test]
    fn test_outcome_json_carries_classification_and_record() {
        let outcome = ScanOutcome {
            classification: ClassificationResult::new(Category::Plastic, 0.85, Source::Remote),
            record: record(7, Category::Plastic, Some(Source::Remote)),
        };
        let text = render(|out| {
            write_outcome(out, &outcome, OutputFormat::Json, TimeDisplay::Utc)
        });

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["classification"]["confidence"], 0.85);
        assert_eq!(value["record"]["id"], 7);
    }

    #[test]
    fn test_local_time_keeps_instant() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();
        let rendered = TimeDisplay::Local.machine(ts);
        let parsed = DateTime::parse_from_rfc3339(&rendered).unwrap();
        assert_eq!(parsed.with_timezone(&Utc), ts);
    }
}
