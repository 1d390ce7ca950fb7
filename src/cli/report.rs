use std::path::Path;

use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::cli::{open_tracker, PivotView};
use crate::error::Result;
use crate::fmt::grouped;
use crate::reports::{self, MonthSummary, Pivot};

pub fn net(config: Option<&Path>) -> Result<()> {
    let tracker = open_tracker(config)?;
    let summary = reports::monthly_summary(tracker.table())?;
    println!("{}", format_net(&summary, &tracker.config().base_currency));
    Ok(())
}

pub fn categories(config: Option<&Path>, view: PivotView) -> Result<()> {
    let tracker = open_tracker(config)?;
    let pivots = tracker.per_category_per_month()?;
    let (title, pivot) = match view {
        PivotView::Expenses => ("Expenses per category", &pivots.expenses),
        PivotView::Income => ("Income per category", &pivots.income),
        PivotView::Net => ("Net expenses per category", &pivots.net),
    };
    println!("{}", format_pivot(title, pivot, &tracker.config().base_currency));
    Ok(())
}

fn right(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

pub fn format_net(months: &[MonthSummary], currency: &str) -> String {
    if months.is_empty() {
        return "No income or expense transactions.".to_string();
    }
    let mut table = Table::new();
    table.set_header(vec!["Month", "Income", "Expenses", "Net"]);
    for m in months {
        let net = if m.net >= 0.0 {
            grouped(m.net).green().to_string()
        } else {
            grouped(m.net).red().to_string()
        };
        table.add_row(vec![
            Cell::new(m.month),
            right(grouped(m.income)),
            right(grouped(m.expense)),
            right(net),
        ]);
    }
    let total: f64 = months.iter().map(|m| m.net).sum();
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(""),
        Cell::new(""),
        right(grouped(total).bold().to_string()),
    ]);
    format!("Net per month ({currency})\n{table}")
}

pub fn format_pivot(title: &str, pivot: &Pivot, currency: &str) -> String {
    if pivot.is_empty() {
        return format!("{title}: nothing to show.");
    }
    let categories = pivot.categories();
    let mut header = vec!["Month".to_string()];
    header.extend(categories.iter().map(|c| c.to_string()));
    header.push("Total".to_string());

    let mut table = Table::new();
    table.set_header(header);
    for month in pivot.months() {
        let mut row = vec![Cell::new(month)];
        row.extend(categories.iter().map(|c| right(grouped(pivot.get(month, c)))));
        row.push(right(grouped(pivot.month_total(month)).bold().to_string()));
        table.add_row(row);
    }
    format!("{title} ({currency})\n{table}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_net_empty() {
        assert_eq!(format_net(&[], "EUR"), "No income or expense transactions.");
    }

    #[test]
    fn test_format_net_rows() {
        colored::control::set_override(false);
        let months = vec![MonthSummary {
            month: "2024-01".parse().unwrap(),
            income: 2500.0,
            expense: 950.0,
            net: 1550.0,
        }];
        let out = format_net(&months, "EUR");
        assert!(out.starts_with("Net per month (EUR)"));
        assert!(out.contains("2024-01"));
        assert!(out.contains("2,500.00"));
        assert!(out.contains("1,550.00"));
    }
}
