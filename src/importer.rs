use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{FinanceError, Result};
use crate::models::{Platform, TransactionKind};
use crate::schema::Column;
use crate::table::{Header, PartialTable, RawRecord, RawTable, Row, Value};

// ---------------------------------------------------------------------------
// Native column maps
// ---------------------------------------------------------------------------

const WISE_COLUMNS: &[(&str, Column)] = &[
    ("ID", Column::TransactionId),
    ("Status", Column::Status),
    ("Direction", Column::Type),
    ("Created on", Column::StartedDate),
    ("Finished on", Column::CompletedDate),
    ("Source fee amount", Column::Fee),
    ("Target fee amount", Column::TargetFee),
    ("Target fee currency", Column::TargetFeeCurrency),
    ("Source amount (after fees)", Column::Amount),
    ("Source currency", Column::Currency),
    ("Target name", Column::Description),
    ("Target amount (after fees)", Column::TargetAmount),
    ("Target currency", Column::TargetCurrency),
    ("Exchange rate", Column::ExchangeRate),
    ("Reference", Column::Reference),
    ("Batch", Column::Batch),
    ("Created by", Column::CreatedBy),
];

const REVOLUT_COLUMNS: &[(&str, Column)] = &[
    ("Type", Column::Type),
    ("Product", Column::Product),
    ("Started Date", Column::StartedDate),
    ("Completed Date", Column::CompletedDate),
    ("Description", Column::Description),
    ("Amount", Column::Amount),
    ("Fee", Column::Fee),
    ("Currency", Column::Currency),
    ("State", Column::State),
    ("Balance", Column::Balance),
];

// ---------------------------------------------------------------------------
// Type vocabularies
// ---------------------------------------------------------------------------

/// How one platform's `Type` strings map onto income and expense.
#[derive(Debug)]
pub struct Vocabulary {
    pub income: &'static [&'static str],
    pub expense: &'static [&'static str],
    pub transfer: &'static [&'static str],
}

const INCOME_TYPES: &[&str] = &["IN", "DEPOSIT", "REFUND", "INCOME"];
const EXPENSE_TYPES: &[&str] = &["OUT", "WITHDRAWAL", "PAYMENT", "EXPENSE"];

static WISE_VOCABULARY: Vocabulary = Vocabulary {
    income: INCOME_TYPES,
    expense: EXPENSE_TYPES,
    transfer: &["NEUTRAL"],
};

static REVOLUT_VOCABULARY: Vocabulary = Vocabulary {
    income: INCOME_TYPES,
    expense: EXPENSE_TYPES,
    transfer: &["TRANSFER", "EXCHANGE"],
};

impl Vocabulary {
    pub fn kind_of(&self, tx_type: &str) -> TransactionKind {
        let upper = tx_type.trim().to_uppercase();
        let is = |set: &[&str]| set.iter().any(|t| *t == upper);
        if is(self.income) {
            TransactionKind::Income
        } else if is(self.expense) {
            TransactionKind::Expense
        } else if is(self.transfer) {
            TransactionKind::Transfer
        } else {
            TransactionKind::Unknown
        }
    }
}

// ---------------------------------------------------------------------------
// Adapters
// ---------------------------------------------------------------------------

/// Result of loading one export file. A failed load still yields an (empty)
/// table so the pipeline can continue with the other sources.
#[derive(Debug)]
pub struct Ingest {
    pub table: PartialTable,
    pub error: Option<FinanceError>,
}

impl Platform {
    pub fn column_map(&self) -> &'static [(&'static str, Column)] {
        match self {
            Self::Wise => WISE_COLUMNS,
            Self::Revolut => REVOLUT_COLUMNS,
        }
    }

    pub fn vocabulary(&self) -> &'static Vocabulary {
        match self {
            Self::Wise => &WISE_VOCABULARY,
            Self::Revolut => &REVOLUT_VOCABULARY,
        }
    }

    pub fn kind_of(&self, tx_type: &str) -> TransactionKind {
        self.vocabulary().kind_of(tx_type)
    }

    pub fn native_header(&self, col: Column) -> Option<&'static str> {
        self.column_map()
            .iter()
            .find(|(_, c)| *c == col)
            .map(|(name, _)| *name)
    }

    /// Column whose text feeds the categorizer for a row with this id.
    /// Wise transfers carry the useful text in their reference.
    pub fn classification_column(&self, transaction_id: &str) -> Column {
        match self {
            Self::Wise if transaction_id.contains("TRANSFER") => Column::Reference,
            _ => Column::Description,
        }
    }

    pub fn load(&self, path: &Path) -> Result<RawTable> {
        RawTable::read(path).map_err(|e| FinanceError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn standardize(&self, raw: &RawTable) -> PartialTable {
        self.standardize_from(raw, None)
    }

    fn standardize_from(&self, raw: &RawTable, source: Option<Arc<Path>>) -> PartialTable {
        let map = self.column_map();
        let headers: Vec<Header> = raw
            .headers
            .iter()
            .map(|h| match map.iter().find(|(native, _)| native == h) {
                Some((_, col)) => Header::Unified(*col),
                None => {
                    debug!("{}: no unified column for '{h}'", self.name());
                    Header::Native(h.clone())
                }
            })
            .collect();
        let type_idx = headers.iter().position(|h| *h == Header::Unified(Column::Type));
        let native: Arc<[String]> = raw.headers.clone().into();

        let rows = raw
            .rows
            .iter()
            .map(|fields| {
                let kind = type_idx
                    .and_then(|i| fields.get(i))
                    .map_or(TransactionKind::Unknown, |t| self.kind_of(t));
                let cells = fields.iter().map(|f| Value::from_field(f)).collect();
                let record = RawRecord {
                    headers: native.clone(),
                    fields: fields.clone(),
                };
                Row::new(*self, kind, source.clone(), cells).with_raw(Some(record))
            })
            .collect();

        PartialTable {
            platform: *self,
            source,
            headers,
            rows,
        }
    }

    /// Load and standardize one file, downgrading failures to a LoadError.
    pub fn ingest(&self, path: &Path) -> Ingest {
        match self.load(path) {
            Ok(raw) => {
                if raw.is_empty() {
                    warn!("{} export at {} is empty", self.name(), path.display());
                }
                let source: Arc<Path> = Arc::from(path);
                let table = self.standardize_from(&raw, Some(source));
                info!("Loaded {} {} rows from {}", table.rows.len(), self.name(), path.display());
                Ingest { table, error: None }
            }
            Err(e) => {
                warn!("{e}");
                Ingest {
                    table: PartialTable::empty(*self),
                    error: Some(e),
                }
            }
        }
    }
}

/// Ingest every configured source in declared platform order. A file
/// listed more than once is only read the first time.
pub fn ingest_all(sources: &[(Platform, PathBuf)]) -> (Vec<PartialTable>, Vec<FinanceError>) {
    let mut ordered: Vec<&(Platform, PathBuf)> = Vec::new();
    for source in sources {
        if ordered.iter().any(|(_, path)| *path == source.1) {
            warn!("{} is listed twice, ignoring the repeat", source.1.display());
            continue;
        }
        ordered.push(source);
    }
    ordered.sort_by_key(|(platform, _)| *platform);

    let mut tables = Vec::new();
    let mut errors = Vec::new();
    for (platform, path) in ordered {
        let ingest = platform.ingest(path);
        tables.push(ingest.table);
        errors.extend(ingest.error);
    }
    (tables, errors)
}

// ---------------------------------------------------------------------------
// Write-back
// ---------------------------------------------------------------------------

/// Rewrite a source file wholesale from the rows' raw records, under the
/// file's own headers. Rows loaded from elsewhere carry no record and are
/// skipped.
pub fn write_source<'a>(
    platform: Platform,
    path: &Path,
    rows: impl IntoIterator<Item = &'a Row>,
) -> Result<usize> {
    let records: Vec<&RawRecord> = rows.into_iter().filter_map(|r| r.raw.as_ref()).collect();
    let Some(first) = records.first() else {
        return Ok(0);
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(first.headers.iter())?;
    for record in &records {
        wtr.write_record(&record.fields)?;
    }
    wtr.flush()?;
    info!("Wrote {} {} rows to {}", records.len(), platform.name(), path.display());
    Ok(records.len())
}
