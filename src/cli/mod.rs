pub mod categories;
pub mod edit;
pub mod export;
pub mod init;
pub mod report;
pub mod transactions;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use crate::error::Result;
use crate::settings::load_settings;
use crate::tracker::Tracker;

/// Open a processed session from the settings at `config`, reporting any
/// source that failed to load.
pub(crate) fn open_tracker(config: Option<&Path>) -> Result<Tracker> {
    let settings = load_settings(config);
    let tracker = Tracker::open(settings.tracker_config()?);
    for err in tracker.load_errors() {
        eprintln!("{} {err}", "Warning:".yellow());
    }
    Ok(tracker)
}

#[derive(Parser)]
#[command(
    name = "fintrack",
    about = "Normalize, categorize and summarize Wise and Revolut exports."
)]
pub struct Cli {
    /// Settings file (default: ~/.config/fintrack/settings.json)
    #[arg(long, global = true, env = "FINTRACK_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write settings and an empty categories file.
    Init {
        /// Directory holding exports and categories (default: ~/Documents/fintrack)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Currency assumed when a row has none
        #[arg(long = "base-currency")]
        base_currency: Option<String>,
    },
    /// Aggregated reports.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// List processed transactions.
    Transactions {
        /// First completed date to include: YYYY-MM-DD
        #[arg(long = "from")]
        from_date: Option<String>,
        /// Last completed date to include: YYYY-MM-DD
        #[arg(long = "to")]
        to_date: Option<String>,
    },
    /// Change one cell and write the source files back.
    Edit {
        /// Row number as shown by `transactions`
        row: usize,
        /// Column header, e.g. Description
        column: String,
        /// New value (empty clears the cell)
        value: String,
    },
    /// Show which category a description would get.
    Categorize {
        text: String,
    },
    /// Manage categories and their keywords.
    Categories {
        #[command(subcommand)]
        command: CategoriesCommands,
    },
    /// Write one CSV per month, skipping months already exported.
    Export {
        /// Output directory (default: monthly_dir from settings)
        #[arg(long = "output-dir")]
        output_dir: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Income, expense and net per month.
    Net,
    /// Category × month pivot.
    Categories {
        #[arg(long, value_enum, default_value_t = PivotView::Expenses)]
        view: PivotView,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PivotView {
    Expenses,
    Income,
    Net,
}

#[derive(Subcommand)]
pub enum CategoriesCommands {
    /// List categories and their keywords.
    List,
    /// Add a category.
    Add {
        name: String,
        /// Initial keywords
        keywords: Vec<String>,
    },
    /// Delete a category.
    Remove {
        name: String,
    },
    /// Add keywords to a category.
    AddKeyword {
        category: String,
        #[arg(required = true)]
        keywords: Vec<String>,
    },
    /// Remove a keyword from a category.
    RemoveKeyword {
        category: String,
        keyword: String,
    },
}
