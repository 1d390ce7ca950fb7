use std::path::Path;

use chrono::NaiveDate;
use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::cli::open_tracker;
use crate::error::{FinanceError, Result};
use crate::fmt::grouped;
use crate::models::{Transaction, TransactionKind};
use crate::reports::completed_range;

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| FinanceError::Other(format!("Invalid date (expected YYYY-MM-DD): {raw}")))
}

pub fn run(config: Option<&Path>, from_date: Option<String>, to_date: Option<String>) -> Result<()> {
    let tracker = open_tracker(config)?;
    let all = tracker.transactions();

    // Row numbers always refer to the full table so `edit` can use them.
    let visible: Vec<(usize, &Transaction)> = if from_date.is_none() && to_date.is_none() {
        all.iter().enumerate().collect()
    } else {
        let Some((lo, hi)) = completed_range(tracker.table()) else {
            println!("No completed transactions.");
            return Ok(());
        };
        let from = from_date.as_deref().map(parse_date).transpose()?.unwrap_or(lo.date());
        let to = to_date.as_deref().map(parse_date).transpose()?.unwrap_or(hi.date());
        if from > to {
            return Err(FinanceError::Other(format!("--from {from} is after --to {to}")));
        }
        all.iter()
            .enumerate()
            .filter(|(_, t)| t.completed_at.is_some_and(|ts| (from..=to).contains(&ts.date())))
            .collect()
    };

    println!("{}", format_transactions(&visible));
    Ok(())
}

pub fn format_transactions(rows: &[(usize, &Transaction)]) -> String {
    if rows.is_empty() {
        return "No transactions.".to_string();
    }
    let mut table = Table::new();
    table.set_header(vec![
        "#", "Platform", "Completed", "Type", "Kind", "Description", "Amount", "Category", "Month",
    ]);
    for (i, t) in rows {
        let amount = format!("{} {}", grouped(t.amount), t.currency);
        let amount = match t.kind {
            TransactionKind::Income => amount.green().to_string(),
            TransactionKind::Expense => amount.red().to_string(),
            TransactionKind::Transfer | TransactionKind::Unknown => amount,
        };
        table.add_row(vec![
            Cell::new(i),
            Cell::new(t.source_platform),
            Cell::new(
                t.completed_at
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
            ),
            Cell::new(&t.tx_type),
            Cell::new(t.kind.label()),
            Cell::new(&t.description),
            Cell::new(amount).set_alignment(CellAlignment::Right),
            Cell::new(&t.category),
            Cell::new(t.year_month.map(|m| m.to_string()).unwrap_or_default()),
        ]);
    }
    format!("{} transactions\n{table}", rows.len())
}
