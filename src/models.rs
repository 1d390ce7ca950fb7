use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::FinanceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Platform {
    Wise,
    Revolut,
}

/// Declared load order. Wise rows always precede Revolut rows after combining.
pub const ALL_PLATFORMS: &[Platform] = &[Platform::Wise, Platform::Revolut];

impl Platform {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Wise => "wise",
            Self::Revolut => "revolut",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Wise => "Wise",
            Self::Revolut => "Revolut",
        }
    }

    pub fn from_name(name: &str) -> Option<Platform> {
        let name = name.trim();
        ALL_PLATFORMS
            .iter()
            .find(|p| p.name().eq_ignore_ascii_case(name) || p.key() == name)
            .copied()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Direction of money movement, resolved from a platform's own type vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
    Unknown,
}

impl TransactionKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
            Self::Unknown => "unknown",
        }
    }
}

/// Month-granularity period key, ordered by calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<YearMonth> {
        (1..=12).contains(&month).then_some(YearMonth { year, month })
    }

    pub fn of(ts: &NaiveDateTime) -> YearMonth {
        YearMonth {
            year: ts.year(),
            month: ts.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = FinanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || FinanceError::Other(format!("Invalid month (expected YYYY-MM): {s}"));
        let (y, m) = s.trim().split_once('-').ok_or_else(bad)?;
        let year: i32 = y.parse().map_err(|_| bad())?;
        let month: u32 = m.parse().map_err(|_| bad())?;
        YearMonth::new(year, month).ok_or_else(bad)
    }
}

/// Typed view of one processed row of the unified table.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub source_platform: Platform,
    pub kind: TransactionKind,
    pub tx_type: String,
    pub status: String,
    pub started_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub description: String,
    pub reference: String,
    pub amount: f64,
    pub fee: f64,
    pub currency: String,
    pub state: String,
    pub balance: f64,
    pub target_amount: f64,
    pub target_currency: String,
    pub exchange_rate: f64,
    pub product: String,
    pub category: String,
    pub year_month: Option<YearMonth>,
    pub amount_in_base: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_platform_from_name() {
        assert_eq!(Platform::from_name("Wise"), Some(Platform::Wise));
        assert_eq!(Platform::from_name(" revolut "), Some(Platform::Revolut));
        assert_eq!(Platform::from_name("Unknown"), None);
    }

    #[test]
    fn test_year_month_display_and_parse() {
        let ym: YearMonth = "2024-03".parse().unwrap();
        assert_eq!(ym, YearMonth { year: 2024, month: 3 });
        assert_eq!(ym.to_string(), "2024-03");
        assert!("2024-13".parse::<YearMonth>().is_err());
        assert!("march".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_year_month_orders_by_calendar() {
        let a = YearMonth::new(2023, 12).unwrap();
        let b = YearMonth::new(2024, 1).unwrap();
        let c = YearMonth::new(2024, 10).unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_year_month_of_timestamp() {
        let ts = NaiveDate::from_ymd_opt(2024, 7, 31)
            .unwrap()
            .and_hms_opt(23, 59, 0)
            .unwrap();
        assert_eq!(YearMonth::of(&ts).to_string(), "2024-07");
    }
}
