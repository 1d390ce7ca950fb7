use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{info, warn};

use crate::error::{FinanceError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub keywords: Vec<String>,
}

/// Immutable snapshot of the category → keywords mapping.
///
/// Iteration follows registration order, which decides ties when several
/// categories share a keyword. Every edit returns a new set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySet {
    entries: Vec<Category>,
}

fn clean_keyword(raw: &str) -> Option<String> {
    let kw = raw.trim().to_lowercase();
    (!kw.is_empty()).then_some(kw)
}

impl CategorySet {
    pub fn new() -> CategorySet {
        CategorySet::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.entries.iter().find(|c| c.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|c| c.name.as_str()).collect()
    }

    fn position(&self, name: &str) -> Result<usize> {
        self.entries
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| FinanceError::UnknownCategory(name.to_string()))
    }

    /// Register a new category at the end of the iteration order.
    /// Keywords are trimmed, lowercased and de-duplicated; blanks are skipped.
    pub fn with_category<S: AsRef<str>>(&self, name: &str, keywords: &[S]) -> Result<CategorySet> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FinanceError::EmptyCategoryName);
        }
        if self.get(name).is_some() {
            return Err(FinanceError::DuplicateCategory(name.to_string()));
        }
        let mut cleaned: Vec<String> = Vec::new();
        for kw in keywords.iter().filter_map(|k| clean_keyword(k.as_ref())) {
            if !cleaned.contains(&kw) {
                cleaned.push(kw);
            }
        }
        let mut next = self.clone();
        next.entries.push(Category {
            name: name.to_string(),
            keywords: cleaned,
        });
        Ok(next)
    }

    pub fn without_category(&self, name: &str) -> Result<CategorySet> {
        let idx = self.position(name)?;
        let mut next = self.clone();
        next.entries.remove(idx);
        Ok(next)
    }

    pub fn with_keyword(&self, category: &str, keyword: &str) -> Result<CategorySet> {
        let idx = self.position(category)?;
        let kw = clean_keyword(keyword).ok_or(FinanceError::EmptyKeyword)?;
        if self.entries[idx].keywords.contains(&kw) {
            return Err(FinanceError::DuplicateKeyword {
                category: category.to_string(),
                keyword: kw,
            });
        }
        let mut next = self.clone();
        next.entries[idx].keywords.push(kw);
        Ok(next)
    }

    /// Append several keywords, skipping ones already present.
    /// Returns the new set and how many keywords were actually added.
    pub fn with_keywords<S: AsRef<str>>(&self, category: &str, keywords: &[S]) -> Result<(CategorySet, usize)> {
        let idx = self.position(category)?;
        let mut next = self.clone();
        let mut added = 0usize;
        for kw in keywords.iter().filter_map(|k| clean_keyword(k.as_ref())) {
            let list = &mut next.entries[idx].keywords;
            if !list.contains(&kw) {
                list.push(kw);
                added += 1;
            }
        }
        if added == 0 && keywords.iter().all(|k| clean_keyword(k.as_ref()).is_none()) {
            return Err(FinanceError::EmptyKeyword);
        }
        Ok((next, added))
    }

    pub fn without_keyword(&self, category: &str, keyword: &str) -> Result<CategorySet> {
        let idx = self.position(category)?;
        let pos = self.entries[idx]
            .keywords
            .iter()
            .position(|k| k == keyword)
            .ok_or_else(|| FinanceError::UnknownKeyword {
                category: category.to_string(),
                keyword: keyword.to_string(),
            })?;
        let mut next = self.clone();
        next.entries[idx].keywords.remove(pos);
        Ok(next)
    }

    pub fn from_json(json: &str) -> Result<CategorySet> {
        Ok(serde_json::from_str(json)?)
    }

    /// Pretty JSON with four-space indentation, non-ASCII kept as UTF-8.
    pub fn to_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        String::from_utf8(buf).map_err(|e| FinanceError::Other(e.to_string()))
    }
}

impl Serialize for CategorySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for cat in &self.entries {
            map.serialize_entry(&cat.name, &cat.keywords)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CategorySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct SetVisitor;

        impl<'de> Visitor<'de> for SetVisitor {
            type Value = CategorySet;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of category names to keyword lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<CategorySet, A::Error> {
                let mut entries: Vec<Category> = Vec::new();
                while let Some((name, keywords)) = map.next_entry::<String, Vec<String>>()? {
                    // a repeated key overwrites in place, like a JSON object would
                    match entries.iter_mut().find(|c| c.name == name) {
                        Some(existing) => existing.keywords = keywords,
                        None => entries.push(Category { name, keywords }),
                    }
                }
                Ok(CategorySet { entries })
            }
        }

        deserializer.deserialize_map(SetVisitor)
    }
}

// ---------------------------------------------------------------------------
// Store: the set plus the file it lives in
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CategoryStore {
    path: PathBuf,
    set: CategorySet,
}

impl CategoryStore {
    /// Load from disk. A missing or malformed file yields an empty set, so
    /// everything categorizes as the sentinel instead of failing.
    pub fn load(path: &Path) -> CategoryStore {
        let set = match std::fs::read_to_string(path) {
            Ok(content) => match CategorySet::from_json(&content) {
                Ok(set) => {
                    info!("Loaded {} categories from {}", set.len(), path.display());
                    set
                }
                Err(e) => {
                    warn!("Categories file at {} is not valid JSON: {e}", path.display());
                    CategorySet::new()
                }
            },
            Err(e) => {
                warn!("Categories file not found at {}: {e}", path.display());
                CategorySet::new()
            }
        };
        CategoryStore {
            path: path.to_path_buf(),
            set,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> &CategorySet {
        &self.set
    }

    pub fn replace(&mut self, set: CategorySet) {
        self.set = set;
    }

    /// Write the whole mapping back, replacing the file.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = self.set.to_json()?;
        std::fs::write(&self.path, format!("{json}\n"))?;
        info!("Saved {} categories to {}", self.set.len(), self.path.display());
        Ok(())
    }
}
