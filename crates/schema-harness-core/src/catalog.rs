//! Validated, immutable schema catalog.
//!
//! A [`Catalog`] is built once at startup from the declared tables. Table
//! names are normalized to `schema.table` form, duplicates are rejected,
//! and the keyword lists are folded into a typed [`KeywordIndex`] so
//! lookups never walk loosely shaped maps.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::SchemaError;
use crate::models::{Column, FkEdge, Table};

/// Prefix `name` with `default_schema` when it carries no schema part.
///
/// Names that already contain a `.` are returned unchanged, as is every
/// name when no default schema is configured. Surrounding whitespace is
/// trimmed.
pub fn normalize_table_name(name: &str, default_schema: Option<&str>) -> String {
    let name = name.trim();
    match default_schema {
        Some(schema) if !name.is_empty() && !name.contains('.') => {
            format!("{}.{}", schema, name)
        }
        _ => name.to_string(),
    }
}

/// Keywords attached to one table and its columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableKeywords {
    pub table: Vec<String>,
    pub columns: BTreeMap<String, Vec<String>>,
}

/// Typed mapping `table → column → keywords`, plus table-level keywords.
///
/// Keywords are lowercased, trimmed and deduplicated (first occurrence
/// wins) at build time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordIndex {
    tables: BTreeMap<String, TableKeywords>,
}

/// One keyword entry yielded by [`KeywordIndex::iter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordEntry<'a> {
    pub table: &'a str,
    /// `None` for table-level keywords.
    pub column: Option<&'a str>,
    pub keyword: &'a str,
}

impl KeywordIndex {
    fn from_tables(tables: &[Table]) -> Self {
        let mut index = BTreeMap::new();
        for t in tables {
            let mut entry = TableKeywords {
                table: clean_keywords(&t.keywords),
                columns: BTreeMap::new(),
            };
            for c in &t.columns {
                let kws = clean_keywords(&c.keywords);
                if !kws.is_empty() {
                    entry.columns.insert(c.name.clone(), kws);
                }
            }
            if !entry.table.is_empty() || !entry.columns.is_empty() {
                index.insert(t.name.clone(), entry);
            }
        }
        Self { tables: index }
    }

    pub fn table_keywords(&self, table: &str) -> &[String] {
        self.tables
            .get(table)
            .map(|t| t.table.as_slice())
            .unwrap_or(&[])
    }

    pub fn column_keywords(&self, table: &str, column: &str) -> &[String] {
        self.tables
            .get(table)
            .and_then(|t| t.columns.get(column))
            .map(|k| k.as_slice())
            .unwrap_or(&[])
    }

    /// Iterate every keyword, table-level entries first within each table.
    pub fn iter(&self) -> impl Iterator<Item = KeywordEntry<'_>> {
        self.tables.iter().flat_map(|(table, kws)| {
            let table_level = kws.table.iter().map(move |k| KeywordEntry {
                table,
                column: None,
                keyword: k,
            });
            let column_level = kws.columns.iter().flat_map(move |(col, ks)| {
                ks.iter().map(move |k| KeywordEntry {
                    table,
                    column: Some(col.as_str()),
                    keyword: k,
                })
            });
            table_level.chain(column_level)
        })
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

fn clean_keywords(raw: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .filter(|k| seen.insert(k.clone()))
        .collect()
}

/// The validated table/column catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    default_schema: Option<String>,
    tables: Vec<Table>,
    by_name: HashMap<String, usize>,
    keywords: KeywordIndex,
}

impl Catalog {
    /// Validate and normalize the declared tables.
    ///
    /// Fails on empty table or column names, duplicate tables (after
    /// normalization) and duplicate columns within a table.
    pub fn new(tables: Vec<Table>, default_schema: Option<String>) -> Result<Self, SchemaError> {
        let default_schema = default_schema
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let mut normalized = Vec::with_capacity(tables.len());
        let mut by_name = HashMap::new();

        for mut table in tables {
            table.name = normalize_table_name(&table.name, default_schema.as_deref());
            if table.name.is_empty() {
                return Err(SchemaError::EmptyName("table"));
            }

            let mut seen_columns = HashSet::new();
            for col in &mut table.columns {
                col.name = col.name.trim().to_string();
                if col.name.is_empty() {
                    return Err(SchemaError::EmptyName("column"));
                }
                if !seen_columns.insert(col.name.clone()) {
                    return Err(SchemaError::DuplicateColumn {
                        table: table.name.clone(),
                        column: col.name.clone(),
                    });
                }
            }

            if by_name.insert(table.name.clone(), normalized.len()).is_some() {
                return Err(SchemaError::DuplicateTable(table.name));
            }
            normalized.push(table);
        }

        let keywords = KeywordIndex::from_tables(&normalized);

        Ok(Self {
            default_schema,
            tables: normalized,
            by_name,
            keywords,
        })
    }

    /// An empty catalog. Graphs built against it skip edge validation.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn default_schema(&self) -> Option<&str> {
        self.default_schema.as_deref()
    }

    /// Normalize a table name with this catalog's default schema.
    pub fn normalize(&self, name: &str) -> String {
        normalize_table_name(name, self.default_schema.as_deref())
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.by_name.get(name).map(|&i| &self.tables[i])
    }

    pub fn column(&self, table: &str, column: &str) -> Option<&Column> {
        self.table(table).and_then(|t| t.column(column))
    }

    pub fn contains(&self, table: &str) -> bool {
        self.by_name.contains_key(table)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.tables.iter().map(|t| t.columns.len()).sum()
    }

    pub fn keywords(&self) -> &KeywordIndex {
        &self.keywords
    }

    /// Check that both endpoints of an (already normalized) edge are
    /// declared. Always succeeds against an empty catalog.
    pub fn check_edge(&self, edge: &FkEdge) -> Result<(), SchemaError> {
        if self.is_empty() {
            return Ok(());
        }
        for (table, column) in [
            (&edge.table, &edge.column),
            (&edge.ref_table, &edge.ref_column),
        ] {
            let Some(t) = self.table(table) else {
                return Err(SchemaError::UnknownTable {
                    table: table.clone(),
                    edge: edge.to_string(),
                });
            };
            if t.column(column).is_none() {
                return Err(SchemaError::UnknownColumn {
                    table: table.clone(),
                    column: column.clone(),
                    edge: edge.to_string(),
                });
            }
        }
        Ok(())
    }
}
