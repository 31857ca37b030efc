//! Core data types for Schema Harness.
//!
//! These types describe the static schema catalog as it is read from
//! disk. They are plain data: validation and name normalization happen in
//! [`Catalog::new`](crate::catalog::Catalog::new) and
//! [`RelationshipGraph::build`](crate::graph::RelationshipGraph::build).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A fully qualified column reference, rendered as `table.column`.
///
/// The table part may itself be schema-qualified (`public.e_sayac`), so
/// parsing splits on the *last* dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Parse `table.column`. Returns `None` when there is no dot or either
    /// side is empty.
    pub fn parse(s: &str) -> Option<Self> {
        let (table, column) = s.rsplit_once('.')?;
        if table.is_empty() || column.is_empty() {
            return None;
        }
        Some(Self::new(table, column))
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

impl Serialize for ColumnRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ColumnRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ColumnRef::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("expected table.column, got '{}'", s)))
    }
}

/// A column declared in the schema catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// Declared SQL data type (free text, e.g. `bigint`, `timestamp`).
    #[serde(rename = "type", default)]
    pub data_type: String,
    /// Human-readable search keywords for this column.
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            keywords: Vec::new(),
            description: None,
        }
    }
}

/// A table and its ordered columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Table-level search keywords.
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
            keywords: Vec::new(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A directed foreign-key edge: `table.column` references
/// `ref_table.ref_column`.
///
/// Field aliases accept the `from` / `fk_column` / `to` shape of exported
/// `fk_graph.json` files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FkEdge {
    #[serde(alias = "from")]
    pub table: String,
    #[serde(alias = "fk_column")]
    pub column: String,
    #[serde(alias = "to")]
    pub ref_table: String,
    pub ref_column: String,
}

impl FkEdge {
    pub fn new(
        table: impl Into<String>,
        column: impl Into<String>,
        ref_table: impl Into<String>,
        ref_column: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            ref_table: ref_table.into(),
            ref_column: ref_column.into(),
        }
    }

    pub fn fk(&self) -> ColumnRef {
        ColumnRef::new(&self.table, &self.column)
    }

    pub fn pk(&self) -> ColumnRef {
        ColumnRef::new(&self.ref_table, &self.ref_column)
    }
}

impl fmt::Display for FkEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} -> {}.{}",
            self.table, self.column, self.ref_table, self.ref_column
        )
    }
}

/// The on-disk catalog document: tables plus foreign-key edges.
///
/// Either part may be empty. An edge list without tables is accepted and
/// skips edge validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub default_schema: Option<String>,
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub edges: Vec<FkEdge>,
}
