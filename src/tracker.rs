use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::categories::{CategorySet, CategoryStore};
use crate::categorizer::categorize_table;
use crate::combiner::combine;
use crate::error::{FinanceError, Result};
use crate::export::{export_monthly, ExportReport};
use crate::importer::{ingest_all, write_source};
use crate::models::{Platform, Transaction, YearMonth};
use crate::normalizer::normalize;
use crate::reports::{self, CategoryPivots};
use crate::schema::{Column, DERIVED_COLUMNS};
use crate::table::{Row, Table, Value};

/// Which date a transaction's Year_Month is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthBasis {
    #[default]
    Completed,
    Started,
}

impl MonthBasis {
    pub fn column(&self) -> Column {
        match self {
            Self::Completed => Column::CompletedDate,
            Self::Started => Column::StartedDate,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub sources: Vec<(Platform, PathBuf)>,
    pub categories_path: PathBuf,
    pub base_currency: String,
    pub month_basis: MonthBasis,
}

/// Recompute every derived column from scratch: normalize, then Year_Month,
/// Amount in Base and Category. A pure function of its inputs.
pub fn process_table(
    table: &Table,
    categories: &CategorySet,
    base_currency: &str,
    basis: MonthBasis,
) -> Table {
    let mut stripped = table.clone();
    for col in DERIVED_COLUMNS {
        stripped.drop_column(*col);
    }
    let mut out = normalize(&stripped, base_currency);

    let date_idx = out.position(basis.column());
    let amount_idx = out.position(Column::Amount);
    let month_idx = out.ensure_column(Column::YearMonth);
    let base_idx = out.ensure_column(Column::AmountInBase);

    let mut undated = 0usize;
    for row in out.rows_mut() {
        let month = date_idx
            .and_then(|i| row.cells[i].as_timestamp())
            .map(YearMonth::of);
        if month.is_none() {
            undated += 1;
        }
        row.cells[month_idx] = month.map_or(Value::Null, Value::Month);
        // no conversion: amounts are already taken as base currency
        let amount = amount_idx.and_then(|i| row.cells[i].as_number()).unwrap_or(0.0);
        row.cells[base_idx] = Value::Number(amount);
    }
    if undated > 0 {
        info!("{undated} rows have no {} and no Year_Month", basis.column());
    }

    let (out, _) = categorize_table(&out, categories);
    out
}

fn to_transaction(table: &Table, row: &Row) -> Transaction {
    let text = |col| table.text(row, col).to_string();
    let time = |col| table.value(row, col).as_timestamp().copied();
    Transaction {
        id: text(Column::TransactionId),
        source_platform: row.platform,
        kind: row.kind,
        tx_type: text(Column::Type),
        status: text(Column::Status),
        started_at: time(Column::StartedDate),
        completed_at: time(Column::CompletedDate),
        description: text(Column::Description),
        reference: text(Column::Reference),
        amount: table.number(row, Column::Amount),
        fee: table.number(row, Column::Fee),
        currency: text(Column::Currency),
        state: text(Column::State),
        balance: table.number(row, Column::Balance),
        target_amount: table.number(row, Column::TargetAmount),
        target_currency: text(Column::TargetCurrency),
        exchange_rate: table.number(row, Column::ExchangeRate),
        product: text(Column::Product),
        category: text(Column::Category),
        year_month: table.value(row, Column::YearMonth).as_month(),
        amount_in_base: table.number(row, Column::AmountInBase),
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One pipeline session: the loaded table, its category store and the
/// errors collected while loading.
pub struct Tracker {
    config: TrackerConfig,
    store: CategoryStore,
    table: Table,
    load_errors: Vec<FinanceError>,
}

impl Tracker {
    /// Load categories and every source, then process once.
    pub fn open(config: TrackerConfig) -> Tracker {
        let store = CategoryStore::load(&config.categories_path);
        let mut tracker = Tracker {
            config,
            store,
            table: Table::default(),
            load_errors: Vec::new(),
        };
        tracker.load();
        tracker.process();
        tracker
    }

    /// Re-read every source file. Failed sources are recorded in
    /// `load_errors` and contribute no rows.
    pub fn load(&mut self) -> &[FinanceError] {
        let (tables, errors) = ingest_all(&self.config.sources);
        self.table = combine(&tables);
        self.load_errors = errors;
        &self.load_errors
    }

    pub fn process(&mut self) {
        self.table = process_table(
            &self.table,
            self.store.snapshot(),
            &self.config.base_currency,
            self.config.month_basis,
        );
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn load_errors(&self) -> &[FinanceError] {
        &self.load_errors
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.table
            .rows()
            .iter()
            .map(|row| to_transaction(&self.table, row))
            .collect()
    }

    pub fn net_per_month(&self) -> Result<BTreeMap<YearMonth, f64>> {
        reports::net_per_month(&self.table)
    }

    pub fn per_category_per_month(&self) -> Result<CategoryPivots> {
        reports::per_category_per_month(&self.table)
    }

    pub fn export_monthly(&self, dir: &Path) -> Result<ExportReport> {
        export_monthly(&self.table, dir)
    }

    // --- categories ---

    pub fn categories(&self) -> &CategorySet {
        self.store.snapshot()
    }

    /// Swap in a new snapshot, persist it and reprocess.
    pub fn set_categories(&mut self, categories: CategorySet) -> Result<()> {
        self.store.replace(categories);
        self.store.save()?;
        self.process();
        Ok(())
    }

    /// Apply one edit to the current snapshot. Nothing changes on error.
    pub fn update_categories<F>(&mut self, edit: F) -> Result<()>
    where
        F: FnOnce(&CategorySet) -> Result<CategorySet>,
    {
        let next = edit(self.store.snapshot())?;
        self.set_categories(next)
    }

    pub fn save_categories(&self) -> Result<()> {
        self.store.save()
    }

    // --- editing ---

    /// Overwrite one display cell and the matching field of the row's raw
    /// record. Callers reprocess once their edits are done.
    pub fn edit(&mut self, row: usize, column: Column, value: &str) -> Result<()> {
        if !column.is_editable() {
            return Err(FinanceError::NotEditable(column.header().to_string()));
        }
        let len = self.table.len();
        let target = self
            .table
            .rows()
            .get(row)
            .ok_or(FinanceError::RowOutOfRange { row, len })?;
        // a column the export never had cannot be written back
        let field = match &target.raw {
            Some(raw) => Some(
                target
                    .platform
                    .native_header(column)
                    .and_then(|h| raw.position(h))
                    .ok_or_else(|| {
                        FinanceError::NotEditable(format!(
                            "{} (not in the {} export)",
                            column.header(),
                            target.platform
                        ))
                    })?,
            ),
            None => None,
        };

        self.table.set(row, column, Value::from_field(value))?;
        let target = &mut self.table.rows_mut()[row];
        if let (Some(i), Some(raw)) = (field, target.raw.as_mut()) {
            raw.fields[i] = value.to_string();
        }
        if column == Column::Type {
            target.kind = target.platform.kind_of(value);
        }
        Ok(())
    }

    /// Write every loaded source file back as it was read, with edits
    /// applied. Returns how many files were rewritten.
    pub fn save_sources(&self) -> Result<usize> {
        let mut groups: BTreeMap<&Path, (Platform, Vec<&Row>)> = BTreeMap::new();
        for row in self.table.rows() {
            if let Some(source) = &row.source {
                groups
                    .entry(&**source)
                    .or_insert_with(|| (row.platform, Vec::new()))
                    .1
                    .push(row);
            }
        }
        for (path, (platform, rows)) in &groups {
            write_source(*platform, path, rows.iter().copied())?;
        }
        Ok(groups.len())
    }
}
