use std::fmt;

/// Every column the pipeline knows about: the unified schema plus the
/// columns `process` derives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    TransactionId,
    Status,
    Type,
    StartedDate,
    CompletedDate,
    Description,
    Amount,
    Fee,
    Currency,
    State,
    Balance,
    TargetAmount,
    TargetCurrency,
    ExchangeRate,
    Reference,
    Batch,
    CreatedBy,
    Product,
    TargetFee,
    TargetFeeCurrency,
    SourcePlatform,
    YearMonth,
    AmountInBase,
    Category,
}

/// The declared unified schema, in output order.
pub const UNIFIED_COLUMNS: &[Column] = &[
    Column::TransactionId,
    Column::Status,
    Column::Type,
    Column::StartedDate,
    Column::CompletedDate,
    Column::Description,
    Column::Amount,
    Column::Fee,
    Column::Currency,
    Column::State,
    Column::Balance,
    Column::TargetAmount,
    Column::TargetCurrency,
    Column::ExchangeRate,
    Column::Reference,
    Column::Batch,
    Column::CreatedBy,
    Column::Product,
    Column::TargetFee,
    Column::TargetFeeCurrency,
    Column::SourcePlatform,
];

/// Recomputed on every `process` call, never written back to sources.
pub const DERIVED_COLUMNS: &[Column] = &[Column::YearMonth, Column::AmountInBase, Column::Category];

/// Columns an editor may change before reprocessing.
pub const EDITABLE_COLUMNS: &[Column] = &[
    Column::Type,
    Column::StartedDate,
    Column::CompletedDate,
    Column::Description,
    Column::Amount,
    Column::Fee,
    Column::Currency,
    Column::State,
    Column::Balance,
];

const ALL_COLUMNS: &[Column] = &[
    Column::TransactionId,
    Column::Status,
    Column::Type,
    Column::StartedDate,
    Column::CompletedDate,
    Column::Description,
    Column::Amount,
    Column::Fee,
    Column::Currency,
    Column::State,
    Column::Balance,
    Column::TargetAmount,
    Column::TargetCurrency,
    Column::ExchangeRate,
    Column::Reference,
    Column::Batch,
    Column::CreatedBy,
    Column::Product,
    Column::TargetFee,
    Column::TargetFeeCurrency,
    Column::SourcePlatform,
    Column::YearMonth,
    Column::AmountInBase,
    Column::Category,
];

impl Column {
    pub fn header(&self) -> &'static str {
        match self {
            Self::TransactionId => "Transaction ID",
            Self::Status => "Status",
            Self::Type => "Type",
            Self::StartedDate => "Started Date",
            Self::CompletedDate => "Completed Date",
            Self::Description => "Description",
            Self::Amount => "Amount",
            Self::Fee => "Fee",
            Self::Currency => "Currency",
            Self::State => "State",
            Self::Balance => "Balance",
            Self::TargetAmount => "Target Amount",
            Self::TargetCurrency => "Target Currency",
            Self::ExchangeRate => "Exchange Rate",
            Self::Reference => "Reference",
            Self::Batch => "Batch",
            Self::CreatedBy => "Created By",
            Self::Product => "Product",
            Self::TargetFee => "Target Fee",
            Self::TargetFeeCurrency => "Target Fee Currency",
            Self::SourcePlatform => "Source Platform",
            Self::YearMonth => "Year_Month",
            Self::AmountInBase => "Amount in Base",
            Self::Category => "Category",
        }
    }

    /// Case-insensitive lookup by header name.
    pub fn from_header(header: &str) -> Option<Column> {
        let header = header.trim();
        ALL_COLUMNS
            .iter()
            .find(|c| c.header().eq_ignore_ascii_case(header))
            .copied()
    }

    pub fn is_derived(&self) -> bool {
        DERIVED_COLUMNS.contains(self)
    }

    pub fn is_editable(&self) -> bool {
        EDITABLE_COLUMNS.contains(self)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unified_schema_shape() {
        assert_eq!(UNIFIED_COLUMNS.len(), 21);
        assert_eq!(UNIFIED_COLUMNS[0], Column::TransactionId);
        assert_eq!(UNIFIED_COLUMNS[20], Column::SourcePlatform);
        assert!(UNIFIED_COLUMNS.iter().all(|c| !c.is_derived()));
    }

    #[test]
    fn test_header_roundtrip() {
        for col in ALL_COLUMNS {
            assert_eq!(Column::from_header(col.header()), Some(*col));
        }
        assert_eq!(Column::from_header("year_month"), Some(Column::YearMonth));
        assert_eq!(Column::from_header("Source name"), None);
    }

    #[test]
    fn test_identity_and_derived_columns_not_editable() {
        assert!(!Column::TransactionId.is_editable());
        assert!(!Column::SourcePlatform.is_editable());
        assert!(DERIVED_COLUMNS.iter().all(|c| !c.is_editable()));
        assert!(Column::Description.is_editable());
    }
}
