use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::models::YearMonth;
use crate::schema::Column;
use crate::table::{Row, Table};

#[derive(Debug, Default)]
pub struct ExportReport {
    pub written: Vec<PathBuf>,
    /// Partitions left alone because the file already existed.
    pub skipped: Vec<PathBuf>,
}

pub fn partition_path(dir: &Path, month: YearMonth) -> PathBuf {
    dir.join(format!("{month}.csv"))
}

/// Write one CSV per Year_Month under `dir`. Existing files are never
/// touched, so manual edits to a partition survive later exports.
pub fn export_monthly(table: &Table, dir: &Path) -> Result<ExportReport> {
    table.require(&[Column::YearMonth])?;
    std::fs::create_dir_all(dir)?;

    let mut groups: BTreeMap<YearMonth, Vec<&Row>> = BTreeMap::new();
    for row in table.rows() {
        if let Some(month) = table.value(row, Column::YearMonth).as_month() {
            groups.entry(month).or_default().push(row);
        }
    }

    let mut report = ExportReport::default();
    for (month, rows) in groups {
        let path = partition_path(dir, month);
        if path.exists() {
            info!("File '{}' already exists, skipping", path.display());
            report.skipped.push(path);
            continue;
        }
        let mut wtr = csv::Writer::from_path(&path)?;
        wtr.write_record(table.columns().iter().map(|c| c.header()))?;
        for row in &rows {
            wtr.write_record(row.cells().iter().map(|v| v.to_string()))?;
        }
        wtr.flush()?;
        info!("Saved {} rows for {month} in {}", rows.len(), path.display());
        report.written.push(path);
    }
    Ok(report)
}
