use anyhow::{Context, Result};
use chrono::TimeZone;
use std::io;
use std::path::Path;

use crate::aggregate::local_day;
use crate::models::Expense;

const HEADER: [&str; 5] = ["id", "date", "description", "category", "amount"];

/// Write `expenses` as CSV, one row each, dates as local `YYYY-MM-DD`.
pub(crate) fn write_csv<W: io::Write, Tz: TimeZone>(
    out: W,
    expenses: &[&Expense],
    tz: &Tz,
) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(out);
    wtr.write_record(HEADER)?;
    for e in expenses {
        let date = local_day(e, tz).format("%Y-%m-%d").to_string();
        let amount = format!("{:.2}", e.amount);
        wtr.write_record([
            e.id.as_str(),
            date.as_str(),
            e.description.as_str(),
            e.category.as_str(),
            amount.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Returns the number of rows written.
pub(crate) fn export_to_path<Tz: TimeZone>(
    path: &Path,
    expenses: &[&Expense],
    tz: &Tz,
) -> Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv(file, expenses, tz)?;
    tracing::info!(path = %path.display(), rows = expenses.len(), "exported expenses");
    Ok(expenses.len())
}
