use std::fmt;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::error::{FinanceError, Result};
use crate::models::{Platform, TransactionKind, YearMonth};
use crate::schema::Column;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single cell. CSV fields arrive as `Text` or `Null`; the normalizer
/// turns them into typed values.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Number(f64),
    Timestamp(NaiveDateTime),
    Month(YearMonth),
}

static NULL: Value = Value::Null;

impl Value {
    /// Empty CSV fields are missing values, anything else is kept verbatim.
    pub fn from_field(raw: &str) -> Value {
        if raw.is_empty() {
            Value::Null
        } else {
            Value::Text(raw.to_string())
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<&NaiveDateTime> {
        match self {
            Value::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }

    pub fn as_month(&self) -> Option<YearMonth> {
        match self {
            Value::Month(ym) => Some(*ym),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{n}"),
            Value::Timestamp(ts) => write!(f, "{}", ts.format(TIMESTAMP_FORMAT)),
            Value::Month(ym) => write!(f, "{ym}"),
        }
    }
}

/// A platform export exactly as read: native headers, string fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn read(path: &Path) -> Result<RawTable> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<RawTable> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();

        let mut rows = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let record = result?;
            if record.len() > headers.len() {
                return Err(FinanceError::Other(format!(
                    "line {}: expected {} fields, found {}",
                    i + 2,
                    headers.len(),
                    record.len()
                )));
            }
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }
        Ok(RawTable { headers, rows })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Header {
    Unified(Column),
    Native(String),
}

/// A source line exactly as read, under its file's native headers.
/// Write-back emits this text, so unedited fields survive untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub headers: Arc<[String]>,
    pub fields: Vec<String>,
}

impl RawRecord {
    pub fn position(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub platform: Platform,
    pub kind: TransactionKind,
    /// File the row was loaded from, used when writing edits back.
    pub source: Option<Arc<Path>>,
    pub raw: Option<RawRecord>,
    pub(crate) cells: Vec<Value>,
}

impl Row {
    pub fn new(
        platform: Platform,
        kind: TransactionKind,
        source: Option<Arc<Path>>,
        cells: Vec<Value>,
    ) -> Row {
        Row {
            platform,
            kind,
            source,
            raw: None,
            cells,
        }
    }

    pub fn with_raw(mut self, raw: Option<RawRecord>) -> Row {
        self.raw = raw;
        self
    }

    pub fn cells(&self) -> &[Value] {
        &self.cells
    }
}

/// One adapter's output: renamed headers, rows stamped with their platform.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialTable {
    pub platform: Platform,
    pub source: Option<Arc<Path>>,
    pub headers: Vec<Header>,
    pub rows: Vec<Row>,
}

impl PartialTable {
    pub fn empty(platform: Platform) -> PartialTable {
        PartialTable {
            platform,
            source: None,
            headers: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn position(&self, col: Column) -> Option<usize> {
        self.headers.iter().position(|h| *h == Header::Unified(col))
    }
}

/// The unified table. Every row holds one cell per entry in `columns`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Table {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn position(&self, col: Column) -> Option<usize> {
        self.columns.iter().position(|c| *c == col)
    }

    pub fn has_column(&self, col: Column) -> bool {
        self.position(col).is_some()
    }

    /// Fails with a SchemaError naming every absent column.
    pub fn require(&self, cols: &[Column]) -> Result<()> {
        let missing: Vec<String> = cols
            .iter()
            .filter(|c| !self.has_column(**c))
            .map(|c| c.header().to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(FinanceError::Schema { missing })
        }
    }

    pub fn value<'a>(&self, row: &'a Row, col: Column) -> &'a Value {
        self.position(col)
            .and_then(|i| row.cells.get(i))
            .unwrap_or(&NULL)
    }

    pub fn text<'a>(&self, row: &'a Row, col: Column) -> &'a str {
        self.value(row, col).as_text().unwrap_or("")
    }

    pub fn number(&self, row: &Row, col: Column) -> f64 {
        self.value(row, col).as_number().unwrap_or(0.0)
    }

    /// Adds a null-filled column if it is not already present.
    pub fn ensure_column(&mut self, col: Column) -> usize {
        if let Some(i) = self.position(col) {
            return i;
        }
        self.columns.push(col);
        for row in &mut self.rows {
            row.cells.push(Value::Null);
        }
        self.columns.len() - 1
    }

    pub fn drop_column(&mut self, col: Column) {
        if let Some(i) = self.position(col) {
            self.columns.remove(i);
            for row in &mut self.rows {
                row.cells.remove(i);
            }
        }
    }

    pub fn push_row(&mut self, mut row: Row) {
        row.cells.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    pub fn set(&mut self, row: usize, col: Column, value: Value) -> Result<()> {
        let len = self.rows.len();
        let i = self.ensure_column(col);
        let target = self
            .rows
            .get_mut(row)
            .ok_or(FinanceError::RowOutOfRange { row, len })?;
        target.cells[i] = value;
        Ok(())
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    /// A new table with the same columns and only the matching rows.
    pub fn filter(&self, pred: impl Fn(&Table, &Row) -> bool) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|r| pred(self, r)).cloned().collect(),
        }
    }
}
