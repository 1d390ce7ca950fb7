use tracing::info;

use crate::models::Platform;
use crate::schema::{Column, UNIFIED_COLUMNS};
use crate::table::{Header, PartialTable, Row, Table, Value};

/// Union adapter outputs into one table over the declared unified schema.
///
/// Inputs are taken in platform order (Wise before Revolut), keeping row
/// order within each input. Unified columns an input lacks are filled with
/// nulls; native columns with no unified counterpart are dropped. Every row
/// gets its `Source Platform` cell stamped.
pub fn combine(tables: &[PartialTable]) -> Table {
    let mut ordered: Vec<&PartialTable> = tables.iter().collect();
    ordered.sort_by_key(|t| t.platform);

    let mut combined = Table::new(UNIFIED_COLUMNS.to_vec());
    for table in ordered {
        let positions: Vec<Option<usize>> = UNIFIED_COLUMNS
            .iter()
            .map(|col| table.headers.iter().position(|h| *h == Header::Unified(*col)))
            .collect();
        for row in &table.rows {
            let cells = UNIFIED_COLUMNS
                .iter()
                .zip(&positions)
                .map(|(col, pos)| match (col, pos) {
                    (Column::SourcePlatform, _) => platform_cell(row.platform),
                    (_, Some(i)) => row.cells.get(*i).cloned().unwrap_or(Value::Null),
                    (_, None) => Value::Null,
                })
                .collect();
            combined.push_row(
                Row::new(row.platform, row.kind, row.source.clone(), cells).with_raw(row.raw.clone()),
            );
        }
    }
    info!("Combined {} sources into {} rows", tables.len(), combined.len());
    combined
}

fn platform_cell(platform: Platform) -> Value {
    Value::Text(platform.name().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionKind;

    fn partial(platform: Platform, headers: Vec<Header>, rows: Vec<Vec<&str>>) -> PartialTable {
        PartialTable {
            platform,
            source: None,
            headers,
            rows: rows
                .into_iter()
                .map(|r| {
                    Row::new(
                        platform,
                        TransactionKind::Unknown,
                        None,
                        r.into_iter().map(Value::from_field).collect(),
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn test_combine_projects_to_unified_schema() {
        let revolut = partial(
            Platform::Revolut,
            vec![
                Header::Unified(Column::Description),
                Header::Unified(Column::Amount),
                Header::Native("Extra".into()),
            ],
            vec![vec!["Bakery", "-4.50", "junk"]],
        );
        let table = combine(&[revolut]);
        assert_eq!(table.columns(), UNIFIED_COLUMNS);
        let row = &table.rows()[0];
        assert_eq!(table.text(row, Column::Description), "Bakery");
        assert_eq!(table.text(row, Column::Amount), "-4.50");
        assert!(table.value(row, Column::Reference).is_null());
        assert_eq!(table.text(row, Column::SourcePlatform), "Revolut");
        assert!(row.cells().iter().all(|c| c.as_text() != Some("junk")));
    }

    #[test]
    fn test_combine_puts_wise_before_revolut() {
        let revolut = partial(
            Platform::Revolut,
            vec![Header::Unified(Column::Description)],
            vec![vec!["r1"], vec!["r2"]],
        );
        let wise = partial(
            Platform::Wise,
            vec![Header::Unified(Column::Description)],
            vec![vec!["w1"], vec!["w2"]],
        );
        let table = combine(&[revolut, wise]);
        let descs: Vec<&str> = table
            .rows()
            .iter()
            .map(|r| table.text(r, Column::Description))
            .collect();
        assert_eq!(descs, vec!["w1", "w2", "r1", "r2"]);
    }

    #[test]
    fn test_combine_empty_inputs() {
        let table = combine(&[PartialTable::empty(Platform::Wise), PartialTable::empty(Platform::Revolut)]);
        assert!(table.is_empty());
        assert_eq!(table.columns().len(), UNIFIED_COLUMNS.len());
    }
}
