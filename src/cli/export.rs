use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::cli::open_tracker;
use crate::error::Result;
use crate::settings::{load_settings, shellexpand_path};

pub fn run(config: Option<&Path>, output_dir: Option<String>) -> Result<()> {
    let dir = match output_dir {
        Some(d) => PathBuf::from(shellexpand_path(&d)),
        None => load_settings(config).monthly_path(),
    };
    let tracker = open_tracker(config)?;
    let report = tracker.export_monthly(&dir)?;
    for path in &report.written {
        println!("{} {}", "Saved".green(), path.display());
    }
    for path in &report.skipped {
        println!("{} {} (already exists)", "Skipped".yellow(), path.display());
    }
    println!(
        "{} written, {} skipped in {}",
        report.written.len(),
        report.skipped.len(),
        dir.display()
    );
    Ok(())
}
