use std::path::Path;

use crate::cli::open_tracker;
use crate::error::{FinanceError, Result};
use crate::schema::{Column, EDITABLE_COLUMNS};

pub fn run(config: Option<&Path>, row: usize, column: &str, value: &str) -> Result<()> {
    let Some(col) = Column::from_header(column) else {
        let allowed: Vec<&str> = EDITABLE_COLUMNS.iter().map(|c| c.header()).collect();
        return Err(FinanceError::Other(format!(
            "Unknown column '{column}'. Editable columns: {}",
            allowed.join(", ")
        )));
    };
    let mut tracker = open_tracker(config)?;
    tracker.edit(row, col, value)?;
    let files = tracker.save_sources()?;
    tracker.process();
    println!("Updated row {row} {}; rewrote {files} source file(s)", col.header());
    Ok(())
}
