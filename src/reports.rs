use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveDateTime};

use crate::categorizer::OTHERS;
use crate::error::Result;
use crate::models::{TransactionKind, YearMonth};
use crate::schema::Column;
use crate::table::{Row, Table};

/// Month, amount and kind for every row that can be aggregated.
/// Rows without a Year_Month have no period and are skipped.
fn periodic_rows<'a>(table: &'a Table) -> impl Iterator<Item = (YearMonth, f64, &'a Row)> + 'a {
    table.rows().iter().filter_map(move |row| {
        let month = table.value(row, Column::YearMonth).as_month()?;
        Some((month, table.number(row, Column::AmountInBase), row))
    })
}

// ---------------------------------------------------------------------------
// Net per month
// ---------------------------------------------------------------------------

pub struct MonthSummary {
    pub month: YearMonth,
    pub income: f64,
    pub expense: f64,
    pub net: f64,
}

/// Income and expense sums per month, ascending. Transfers and unknown
/// types count toward neither side; a month seen on one side only gets 0
/// on the other.
pub fn monthly_summary(table: &Table) -> Result<Vec<MonthSummary>> {
    table.require(&[Column::YearMonth, Column::AmountInBase, Column::Type])?;

    let mut sums: BTreeMap<YearMonth, (f64, f64)> = BTreeMap::new();
    for (month, amount, row) in periodic_rows(table) {
        match row.kind {
            TransactionKind::Income => sums.entry(month).or_default().0 += amount,
            TransactionKind::Expense => sums.entry(month).or_default().1 += amount,
            TransactionKind::Transfer | TransactionKind::Unknown => {}
        }
    }
    Ok(sums
        .into_iter()
        .map(|(month, (income, expense))| MonthSummary {
            month,
            income,
            expense,
            net: income - expense,
        })
        .collect())
}

pub fn net_per_month(table: &Table) -> Result<BTreeMap<YearMonth, f64>> {
    Ok(monthly_summary(table)?
        .into_iter()
        .map(|s| (s.month, s.net))
        .collect())
}

// ---------------------------------------------------------------------------
// Category × month pivots
// ---------------------------------------------------------------------------

/// Month (rows) × category (columns) sums. Absent cells read as 0.0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pivot {
    cells: BTreeMap<YearMonth, BTreeMap<String, f64>>,
    categories: BTreeSet<String>,
}

impl Pivot {
    fn add(&mut self, month: YearMonth, category: &str, amount: f64) {
        *self
            .cells
            .entry(month)
            .or_default()
            .entry(category.to_string())
            .or_insert(0.0) += amount;
        self.categories.insert(category.to_string());
    }

    pub fn get(&self, month: YearMonth, category: &str) -> f64 {
        self.cells
            .get(&month)
            .and_then(|row| row.get(category))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn months(&self) -> Vec<YearMonth> {
        self.cells.keys().copied().collect()
    }

    pub fn categories(&self) -> Vec<&str> {
        self.categories.iter().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn month_total(&self, month: YearMonth) -> f64 {
        self.cells.get(&month).map_or(0.0, |row| row.values().sum())
    }
}

pub struct CategoryPivots {
    pub expenses: Pivot,
    pub income: Pivot,
    /// Net expense: `max(0, expense − income)` per cell.
    pub net: Pivot,
}

pub fn per_category_per_month(table: &Table) -> Result<CategoryPivots> {
    table.require(&[
        Column::YearMonth,
        Column::AmountInBase,
        Column::Type,
        Column::Category,
    ])?;

    let mut expenses = Pivot::default();
    let mut income = Pivot::default();
    for (month, amount, row) in periodic_rows(table) {
        let category = table.value(row, Column::Category).to_string();
        match row.kind {
            TransactionKind::Expense => expenses.add(month, &category, amount),
            TransactionKind::Income => income.add(month, &category, amount),
            TransactionKind::Transfer | TransactionKind::Unknown => {}
        }
    }

    let mut net = Pivot::default();
    let months: BTreeSet<YearMonth> = expenses.cells.keys().chain(income.cells.keys()).copied().collect();
    let categories: BTreeSet<&String> = expenses.categories.iter().chain(&income.categories).collect();
    for month in months {
        for category in &categories {
            let value = expenses.get(month, category) - income.get(month, category);
            net.add(month, category, value.max(0.0));
        }
    }

    Ok(CategoryPivots {
        expenses,
        income,
        net,
    })
}

// ---------------------------------------------------------------------------
// Dashboard queries
// ---------------------------------------------------------------------------

/// Distinct categories of expense rows, sentinel excluded, sorted.
pub fn expense_categories(table: &Table) -> Result<Vec<String>> {
    table.require(&[Column::Category])?;
    let set: BTreeSet<String> = table
        .rows()
        .iter()
        .filter(|row| row.kind == TransactionKind::Expense)
        .map(|row| table.text(row, Column::Category))
        .filter(|c| !c.is_empty() && *c != OTHERS)
        .map(str::to_string)
        .collect();
    Ok(set.into_iter().collect())
}

pub fn completed_range(table: &Table) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let mut dates = table
        .rows()
        .iter()
        .filter_map(|row| table.value(row, Column::CompletedDate).as_timestamp().copied());
    let first = dates.next()?;
    Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
}

/// Rows completed on a day within `[from, to]`. Rows without a completed
/// date never match.
pub fn filter_completed_between(table: &Table, from: NaiveDate, to: NaiveDate) -> Table {
    table.filter(|t, row| {
        t.value(row, Column::CompletedDate)
            .as_timestamp()
            .is_some_and(|ts| (from..=to).contains(&ts.date()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FinanceError;
    use crate::models::Platform;
    use crate::table::Value;

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    fn ts(s: &str) -> Value {
        Value::Timestamp(NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap())
    }

    /// (type, kind, month, amount, category, completed)
    fn processed(rows: &[(&str, TransactionKind, Option<&str>, f64, &str, Option<&str>)]) -> Table {
        let mut table = Table::new(vec![
            Column::Type,
            Column::CompletedDate,
            Column::YearMonth,
            Column::AmountInBase,
            Column::Category,
        ]);
        for (tx_type, kind, month, amount, category, completed) in rows {
            table.push_row(Row::new(
                Platform::Wise,
                *kind,
                None,
                vec![
                    Value::Text(tx_type.to_string()),
                    completed.map_or(Value::Null, ts),
                    month.map_or(Value::Null, |m| Value::Month(ym(m))),
                    Value::Number(*amount),
                    Value::Text(category.to_string()),
                ],
            ));
        }
        table
    }

    use TransactionKind::{Expense, Income, Transfer, Unknown};

    #[test]
    fn test_net_per_month_conserves_sums() {
        let table = processed(&[
            ("IN", Income, Some("2024-01"), 2500.0, OTHERS, None),
            ("OUT", Expense, Some("2024-01"), 50.0, "Groceries", None),
            ("OUT", Expense, Some("2024-01"), 100.0, "Rent", None),
            ("OUT", Expense, Some("2024-02"), 30.0, "Groceries", None),
            ("IN", Income, Some("2023-12"), 10.0, OTHERS, None),
        ]);
        let net = net_per_month(&table).unwrap();
        let months: Vec<String> = net.keys().map(|m| m.to_string()).collect();
        assert_eq!(months, vec!["2023-12", "2024-01", "2024-02"]);
        assert_eq!(net[&ym("2024-01")], 2350.0);
        assert_eq!(net[&ym("2024-02")], -30.0);
        assert_eq!(net[&ym("2023-12")], 10.0);
    }

    #[test]
    fn test_net_excludes_unknown_transfer_and_undated() {
        let table = processed(&[
            ("CARD_PAYMENT", Unknown, Some("2024-01"), 40.0, OTHERS, None),
            ("NEUTRAL", Transfer, Some("2024-01"), 500.0, OTHERS, None),
            ("OUT", Expense, None, 99.0, OTHERS, None),
            ("OUT", Expense, Some("2024-01"), 5.0, OTHERS, None),
        ]);
        let summary = monthly_summary(&table).unwrap();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].income, 0.0);
        assert_eq!(summary[0].expense, 5.0);
        assert_eq!(summary[0].net, -5.0);
    }

    #[test]
    fn test_unknown_only_month_is_absent() {
        let table = processed(&[
            ("CARD_PAYMENT", Unknown, Some("2024-03"), 40.0, OTHERS, None),
            ("TOPUP", Unknown, Some("2024-03"), 40.0, OTHERS, None),
        ]);
        assert!(net_per_month(&table).unwrap().is_empty());
    }

    #[test]
    fn test_aggregations_require_derived_columns() {
        let table = Table::new(vec![Column::Type, Column::Amount]);
        match net_per_month(&table) {
            Err(FinanceError::Schema { missing }) => {
                assert_eq!(missing, vec!["Year_Month", "Amount in Base"]);
            }
            _ => panic!("expected schema error"),
        }
        assert!(per_category_per_month(&table).is_err());
        assert!(expense_categories(&table).is_err());
    }

    #[test]
    fn test_expense_pivot_scenario() {
        let table = processed(&[("OUT", Expense, Some("2024-01"), 50.0, "Groceries", None)]);
        let pivots = per_category_per_month(&table).unwrap();
        assert_eq!(pivots.expenses.get(ym("2024-01"), "Groceries"), 50.0);
        assert_eq!(pivots.expenses.get(ym("2024-01"), "Rent"), 0.0);
        assert!(pivots.income.is_empty());
        assert_eq!(pivots.net.get(ym("2024-01"), "Groceries"), 50.0);
    }

    #[test]
    fn test_net_pivot_is_clamped_expense() {
        let table = processed(&[
            ("OUT", Expense, Some("2024-01"), 80.0, "Shopping", None),
            ("REFUND", Income, Some("2024-01"), 30.0, "Shopping", None),
            ("OUT", Expense, Some("2024-01"), 10.0, "Salary", None),
            ("IN", Income, Some("2024-01"), 2000.0, "Salary", None),
            ("IN", Income, Some("2024-02"), 5.0, "Gifts", None),
        ]);
        let pivots = per_category_per_month(&table).unwrap();
        assert_eq!(pivots.net.get(ym("2024-01"), "Shopping"), 50.0);
        assert_eq!(pivots.net.get(ym("2024-01"), "Salary"), 0.0);
        assert_eq!(pivots.net.months(), vec![ym("2024-01"), ym("2024-02")]);
        assert_eq!(pivots.net.categories(), vec!["Gifts", "Salary", "Shopping"]);
        for m in pivots.net.months() {
            for c in pivots.net.categories() {
                assert!(pivots.net.get(m, c) >= 0.0);
            }
        }
        assert_eq!(pivots.expenses.month_total(ym("2024-01")), 90.0);
    }

    #[test]
    fn test_expense_categories_skip_sentinel_and_income() {
        let table = processed(&[
            ("OUT", Expense, Some("2024-01"), 1.0, "Rent", None),
            ("OUT", Expense, Some("2024-01"), 1.0, OTHERS, None),
            ("IN", Income, Some("2024-01"), 1.0, "Salary", None),
            ("OUT", Expense, Some("2024-02"), 1.0, "Groceries", None),
            ("OUT", Expense, Some("2024-02"), 1.0, "Rent", None),
        ]);
        assert_eq!(expense_categories(&table).unwrap(), vec!["Groceries", "Rent"]);
    }

    #[test]
    fn test_completed_range_and_filter() {
        let table = processed(&[
            ("OUT", Expense, Some("2024-01"), 1.0, OTHERS, Some("2024-01-31 23:59:00")),
            ("OUT", Expense, Some("2024-02"), 2.0, OTHERS, Some("2024-02-15 08:00:00")),
            ("OUT", Expense, None, 3.0, OTHERS, None),
            ("OUT", Expense, Some("2023-12"), 4.0, OTHERS, Some("2023-12-01 00:00:00")),
        ]);
        let (lo, hi) = completed_range(&table).unwrap();
        assert_eq!(lo.to_string(), "2023-12-01 00:00:00");
        assert_eq!(hi.to_string(), "2024-02-15 08:00:00");

        let d = |s| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        let filtered = filter_completed_between(&table, d("2024-01-31"), d("2024-02-15"));
        assert_eq!(filtered.len(), 2);
        assert!(completed_range(&Table::default()).is_none());
    }
}
