//! CSV output formatting.

use super::{HistoryRow, TimeDisplay};
use crate::storage::{CategoryStats, ScanRecord};
use crate::types::Category;
use crate::weather::WeatherData;
use crate::workflow::ScanOutcome;
use std::io::{self, Write};

/// Write ledger rows, one per record.
pub fn write_history<W: Write>(
    out: &mut W,
    records: &[ScanRecord],
    time: TimeDisplay,
) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    if records.is_empty() {
        wtr.write_record(["id", "type", "createdAt", "source"])?;
    }
    for record in records {
        wtr.serialize(HistoryRow::new(record, time))?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write one row per category plus a total.
pub fn write_stats<W: Write>(out: &mut W, stats: &CategoryStats) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record(["type", "count"])?;
    for category in Category::ALL {
        let count = stats.count(category).to_string();
        wtr.write_record([category.as_str(), count.as_str()])?;
    }
    let total = stats.total.to_string();
    wtr.write_record(["Total", total.as_str()])?;

    wtr.flush()?;
    Ok(())
}

/// Write a completed scan as a single row.
pub fn write_outcome<W: Write>(
    out: &mut W,
    outcome: &ScanOutcome,
    time: TimeDisplay,
) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    let result = &outcome.classification;
    let id = outcome.record.id.to_string();
    let confidence = format!("{:.2}", result.confidence);
    let created_at = time.machine(outcome.record.created_at);

    wtr.write_record(["id", "type", "confidence", "source", "createdAt", "details"])?;
    wtr.write_record([
        id.as_str(),
        result.category.as_str(),
        confidence.as_str(),
        result.source.as_str(),
        created_at.as_str(),
        result.details.as_deref().unwrap_or(""),
    ])?;

    wtr.flush()?;
    Ok(())
}

/// Write a weather reading as a single row.
pub fn write_weather<W: Write>(out: &mut W, weather: &WeatherData) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    let temperature = weather.temperature.to_string();
    let humidity = weather.humidity.to_string();

    wtr.write_record(["city", "temperature", "description", "humidity", "icon"])?;
    wtr.write_record([
        weather.city.as_str(),
        temperature.as_str(),
        weather.description.as_str(),
        humidity.as_str(),
        weather.icon.as_str(),
    ])?;

    wtr.flush()?;
    Ok(())
}
