use std::path::Path;

use comfy_table::{Cell, Table};

use crate::categories::{CategorySet, CategoryStore};
use crate::categorizer::categorize;
use crate::cli::open_tracker;
use crate::error::Result;
use crate::settings::load_settings;

pub fn list(config: Option<&Path>) -> Result<()> {
    let store = CategoryStore::load(&load_settings(config).categories_path());
    println!("{}", format_categories(store.snapshot()));
    Ok(())
}

pub fn add(config: Option<&Path>, name: &str, keywords: &[String]) -> Result<()> {
    let mut tracker = open_tracker(config)?;
    tracker.update_categories(|c| c.with_category(name, keywords))?;
    println!("Added category: {}", name.trim());
    Ok(())
}

pub fn remove(config: Option<&Path>, name: &str) -> Result<()> {
    let mut tracker = open_tracker(config)?;
    tracker.update_categories(|c| c.without_category(name))?;
    println!("Deleted category: {name}");
    Ok(())
}

pub fn add_keywords(config: Option<&Path>, category: &str, keywords: &[String]) -> Result<()> {
    let mut tracker = open_tracker(config)?;
    let mut added = 0usize;
    tracker.update_categories(|c| {
        let (next, n) = c.with_keywords(category, keywords)?;
        added = n;
        Ok(next)
    })?;
    println!("Added {added} keyword(s) to {category}");
    Ok(())
}

pub fn remove_keyword(config: Option<&Path>, category: &str, keyword: &str) -> Result<()> {
    let mut tracker = open_tracker(config)?;
    tracker.update_categories(|c| c.without_keyword(category, keyword))?;
    println!("Removed '{keyword}' from {category}");
    Ok(())
}

/// Classify free text against the current categories without loading sources.
pub fn categorize_text(config: Option<&Path>, text: &str) -> Result<()> {
    let store = CategoryStore::load(&load_settings(config).categories_path());
    println!("{}", categorize(text, store.snapshot()));
    Ok(())
}

pub fn format_categories(set: &CategorySet) -> String {
    if set.is_empty() {
        return "No categories defined.".to_string();
    }
    let mut table = Table::new();
    table.set_header(vec!["Category", "Keywords"]);
    for cat in set.iter() {
        table.add_row(vec![Cell::new(&cat.name), Cell::new(cat.keywords.join(", "))]);
    }
    format!("Categories\n{table}")
}
