use tracing::info;

use crate::categories::CategorySet;
use crate::schema::Column;
use crate::table::{Table, Value};

/// Sentinel for transactions no keyword matched.
pub const OTHERS: &str = "Others";

/// First category (in registration order) with a keyword contained in the
/// lower-cased description. Never fails.
pub fn categorize<'a>(description: &str, categories: &'a CategorySet) -> &'a str {
    let desc = description.to_lowercase();
    categories
        .iter()
        .find(|cat| cat.keywords.iter().any(|kw| desc.contains(&kw.to_lowercase())))
        .map_or(OTHERS, |cat| cat.name.as_str())
}

pub struct CategorizeResult {
    pub categorized: usize,
    pub uncategorized: usize,
}

/// Fill the Category column for every row, replacing any previous value.
pub fn categorize_table(table: &Table, categories: &CategorySet) -> (Table, CategorizeResult) {
    let mut out = table.clone();
    let idx = out.ensure_column(Column::Category);
    let id_idx = out.position(Column::TransactionId);
    let desc_idx = out.position(Column::Description);
    let ref_idx = out.position(Column::Reference);

    let mut categorized = 0usize;
    let mut uncategorized = 0usize;
    for row in out.rows_mut() {
        let text_at = |i: Option<usize>| -> String {
            i.and_then(|i| row.cells.get(i))
                .map(|v| v.to_string())
                .unwrap_or_default()
        };
        let id = text_at(id_idx);
        let text = match row.platform.classification_column(&id) {
            Column::Reference => text_at(ref_idx),
            _ => text_at(desc_idx),
        };
        let category = categorize(&text, categories);
        if category == OTHERS {
            uncategorized += 1;
        } else {
            categorized += 1;
        }
        row.cells[idx] = Value::Text(category.to_string());
    }
    info!("Categorized {categorized} rows, {uncategorized} fell back to {OTHERS}");
    (
        out,
        CategorizeResult {
            categorized,
            uncategorized,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Platform, TransactionKind};
    use crate::table::Row;

    fn store() -> CategorySet {
        CategorySet::from_json(r#"{"Groceries": ["market"], "Rent": ["landlord"]}"#).unwrap()
    }

    fn table(rows: &[(Platform, &str, &str, &str)]) -> Table {
        let mut t = Table::new(vec![Column::TransactionId, Column::Description, Column::Reference]);
        for (platform, id, desc, reference) in rows {
            t.push_row(Row::new(
                *platform,
                TransactionKind::Expense,
                None,
                vec![
                    Value::from_field(id),
                    Value::from_field(desc),
                    Value::from_field(reference),
                ],
            ));
        }
        t
    }

    #[test]
    fn test_case_insensitive_substring() {
        assert_eq!(categorize("Local Market Purchase", &store()), "Groceries");
        assert_eq!(categorize("PAID LANDLORD", &store()), "Rent");
    }

    #[test]
    fn test_no_match_is_others() {
        assert_eq!(categorize("Cinema", &store()), OTHERS);
        assert_eq!(categorize("", &store()), OTHERS);
        assert_eq!(categorize("market", &CategorySet::new()), OTHERS);
    }

    #[test]
    fn test_first_registered_category_wins() {
        let set = CategorySet::from_json(r#"{"Shops": ["mark"], "Groceries": ["market"]}"#).unwrap();
        assert_eq!(categorize("supermarket", &set), "Shops");
        let set = CategorySet::from_json(r#"{"Groceries": ["market"], "Shops": ["mark"]}"#).unwrap();
        assert_eq!(categorize("supermarket", &set), "Groceries");
    }

    #[test]
    fn test_uppercase_keywords_in_file_still_match() {
        let set = CategorySet::from_json(r#"{"Fuel": ["SHELL"]}"#).unwrap();
        assert_eq!(categorize("shell station 12", &set), "Fuel");
    }

    #[test]
    fn test_categorize_table_uses_reference_for_wise_transfers() {
        let t = table(&[
            (Platform::Wise, "TRANSFER-1", "Someone", "landlord jan"),
            (Platform::Wise, "CARD-2", "City Market", "landlord"),
            (Platform::Revolut, "TRANSFER-3", "Market", "landlord"),
            (Platform::Wise, "TRANSFER-4", "Market", ""),
        ]);
        let (out, result) = categorize_table(&t, &store());
        let cats: Vec<&str> = out.rows().iter().map(|r| out.text(r, Column::Category)).collect();
        assert_eq!(cats, vec!["Rent", "Groceries", "Groceries", OTHERS]);
        assert_eq!(result.categorized, 3);
        assert_eq!(result.uncategorized, 1);
    }

    #[test]
    fn test_recategorize_overwrites() {
        let t = table(&[(Platform::Revolut, "", "Market", "")]);
        let (once, _) = categorize_table(&t, &store());
        let (twice, _) = categorize_table(&once, &CategorySet::new());
        assert_eq!(twice.text(&twice.rows()[0], Column::Category), OTHERS);
        assert_eq!(twice.columns().len(), once.columns().len());
    }
}
