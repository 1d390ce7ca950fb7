use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::{debug, info};

use crate::schema::Column;
use crate::table::{Table, Value};

/// Default-fill rule applied to a column's missing or unparseable values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    /// Missing → empty string.
    Text,
    /// Parsed as a number; missing or unparseable → 0.0.
    Number,
    /// Missing → the base currency.
    Currency,
    /// Parsed as a number; missing or unparseable → 1.0.
    Rate,
    /// Missing → "Unknown".
    Platform,
    /// Parsed as a timestamp; missing or unparseable → null.
    Timestamp,
}

/// The full policy table. Every unified column appears exactly once.
pub const FILL_POLICY: &[(Column, Fill)] = &[
    (Column::TransactionId, Fill::Text),
    (Column::Status, Fill::Text),
    (Column::Type, Fill::Text),
    (Column::StartedDate, Fill::Timestamp),
    (Column::CompletedDate, Fill::Timestamp),
    (Column::Description, Fill::Text),
    (Column::Amount, Fill::Number),
    (Column::Fee, Fill::Number),
    (Column::Currency, Fill::Currency),
    (Column::State, Fill::Text),
    (Column::Balance, Fill::Number),
    (Column::TargetAmount, Fill::Number),
    (Column::TargetCurrency, Fill::Currency),
    (Column::ExchangeRate, Fill::Rate),
    (Column::Reference, Fill::Text),
    (Column::Batch, Fill::Text),
    (Column::CreatedBy, Fill::Text),
    (Column::Product, Fill::Text),
    (Column::TargetFee, Fill::Number),
    (Column::TargetFeeCurrency, Fill::Currency),
    (Column::SourcePlatform, Fill::Platform),
];

pub const UNKNOWN_PLATFORM: &str = "Unknown";

pub fn fill_for(col: Column) -> Option<Fill> {
    FILL_POLICY.iter().find(|(c, _)| *c == col).map(|(_, f)| *f)
}

/// Parse a numeric field. Non-finite values count as unparseable.
pub fn parse_number(raw: &str) -> Option<f64> {
    let n: f64 = raw.trim().parse().ok()?;
    n.is_finite().then_some(n)
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn fill_value(value: &Value, fill: Fill, base_currency: &str) -> Value {
    match (fill, value) {
        (Fill::Text, Value::Null) => Value::Text(String::new()),
        (Fill::Text, Value::Text(_)) => value.clone(),
        (Fill::Text, other) => Value::Text(other.to_string()),

        (Fill::Number, Value::Number(_)) => value.clone(),
        (Fill::Number, Value::Text(s)) => Value::Number(parse_number(s).unwrap_or(0.0)),
        (Fill::Number, _) => Value::Number(0.0),

        (Fill::Rate, Value::Number(_)) => value.clone(),
        (Fill::Rate, Value::Text(s)) => Value::Number(parse_number(s).unwrap_or(1.0)),
        (Fill::Rate, _) => Value::Number(1.0),

        (Fill::Currency, Value::Null) => Value::Text(base_currency.to_string()),
        (Fill::Currency, _) => value.clone(),

        (Fill::Platform, Value::Null) => Value::Text(UNKNOWN_PLATFORM.to_string()),
        (Fill::Platform, _) => value.clone(),

        (Fill::Timestamp, Value::Timestamp(_)) => value.clone(),
        (Fill::Timestamp, Value::Text(s)) => match parse_timestamp(s) {
            Some(ts) => Value::Timestamp(ts),
            None => {
                debug!("Unparseable date '{s}' treated as missing");
                Value::Null
            }
        },
        (Fill::Timestamp, _) => Value::Null,
    }
}

/// Apply the fill policy to every unified column, creating absent ones
/// first. Never fails; normalizing twice gives the same table.
pub fn normalize(table: &Table, base_currency: &str) -> Table {
    let mut out = table.clone();
    for (col, _) in FILL_POLICY {
        out.ensure_column(*col);
    }
    let policies: Vec<Option<Fill>> = out.columns().iter().map(|c| fill_for(*c)).collect();

    let mut filled = 0usize;
    for row in out.rows_mut() {
        for (cell, fill) in row.cells.iter_mut().zip(&policies) {
            let Some(fill) = fill else { continue };
            let next = fill_value(cell, *fill, base_currency);
            if next != *cell {
                filled += 1;
                *cell = next;
            }
        }
    }
    info!("Normalized {} rows ({filled} cells filled or converted)", out.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Platform, TransactionKind};
    use crate::schema::UNIFIED_COLUMNS;
    use crate::table::Row;

    fn table_with(cells: Vec<(Column, Value)>) -> Table {
        let mut table = Table::new(cells.iter().map(|(c, _)| *c).collect());
        table.push_row(Row::new(
            Platform::Revolut,
            TransactionKind::Unknown,
            None,
            cells.into_iter().map(|(_, v)| v).collect(),
        ));
        table
    }

    #[test]
    fn test_policy_covers_unified_schema() {
        assert_eq!(FILL_POLICY.len(), UNIFIED_COLUMNS.len());
        for col in UNIFIED_COLUMNS {
            assert!(fill_for(*col).is_some(), "no fill policy for {col}");
        }
        assert_eq!(fill_for(Column::Category), None);
    }

    #[test]
    fn test_absent_columns_are_created() {
        let table = normalize(&table_with(vec![(Column::Amount, Value::Null)]), "EUR");
        assert_eq!(table.columns().len(), UNIFIED_COLUMNS.len());
        let row = &table.rows()[0];
        assert_eq!(table.value(row, Column::Amount), &Value::Number(0.0));
        assert_eq!(table.text(row, Column::Description), "");
    }

    #[test]
    fn test_every_column_default() {
        let mut blank = Table::new(UNIFIED_COLUMNS.to_vec());
        blank.push_row(Row::new(
            Platform::Wise,
            TransactionKind::Unknown,
            None,
            vec![Value::Null; UNIFIED_COLUMNS.len()],
        ));
        let out = normalize(&blank, "EUR");
        let row = &out.rows()[0];
        for (col, fill) in FILL_POLICY {
            let expected = match fill {
                Fill::Text => Value::Text(String::new()),
                Fill::Number => Value::Number(0.0),
                Fill::Currency => Value::Text("EUR".into()),
                Fill::Rate => Value::Number(1.0),
                Fill::Platform => Value::Text("Unknown".into()),
                Fill::Timestamp => Value::Null,
            };
            assert_eq!(out.value(row, *col), &expected, "default for {col}");
        }
    }

    #[test]
    fn test_unparseable_amount_becomes_zero() {
        let table = table_with(vec![
            (Column::Amount, Value::Text("abc".into())),
            (Column::Fee, Value::Text(" 1.25 ".into())),
        ]);
        let out = normalize(&table, "EUR");
        let row = &out.rows()[0];
        assert_eq!(out.value(row, Column::Amount), &Value::Number(0.0));
        assert_eq!(out.value(row, Column::Fee), &Value::Number(1.25));
    }

    #[test]
    fn test_missing_currency_gets_base() {
        let table = table_with(vec![
            (Column::Currency, Value::Null),
            (Column::TargetCurrency, Value::Text("USD".into())),
        ]);
        let out = normalize(&table, "GBP");
        let row = &out.rows()[0];
        assert_eq!(out.text(row, Column::Currency), "GBP");
        assert_eq!(out.text(row, Column::TargetCurrency), "USD");
    }

    #[test]
    fn test_dates_parse_or_become_null() {
        let table = table_with(vec![
            (Column::StartedDate, Value::Text("2024-02-29 13:45:00".into())),
            (Column::CompletedDate, Value::Text("not a date".into())),
        ]);
        let out = normalize(&table, "EUR");
        let row = &out.rows()[0];
        let started = out.value(row, Column::StartedDate).as_timestamp().unwrap();
        assert_eq!(started.to_string(), "2024-02-29 13:45:00");
        assert!(out.value(row, Column::CompletedDate).is_null());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let table = table_with(vec![
            (Column::Amount, Value::Text("12.5".into())),
            (Column::ExchangeRate, Value::Text("n/a".into())),
            (Column::CompletedDate, Value::Text("2024-01-31".into())),
            (Column::Description, Value::Null),
        ]);
        let once = normalize(&table, "EUR");
        let twice = normalize(&once, "EUR");
        assert_eq!(once, twice);
        assert_eq!(once.value(&once.rows()[0], Column::ExchangeRate), &Value::Number(1.0));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("-42.50"), Some(-42.5));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-01-15 10:23:45").is_some());
        assert!(parse_timestamp("2024-01-15 10:23:45.123").is_some());
        assert!(parse_timestamp("2024-01-15T10:23:45Z").is_some());
        assert!(parse_timestamp("2024-01-15").is_some());
        assert!(parse_timestamp("01/15/2024").is_some());
        assert!(parse_timestamp("2024-02-30").is_none());
        assert!(parse_timestamp("").is_none());
    }
}
