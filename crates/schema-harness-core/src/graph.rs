//! Foreign-key relationship graph.
//!
//! The graph is the symmetric closure of the declared FK edges: every
//! edge `a.x -> b.y` is traversable from `a` to `b` (forward) and from `b`
//! to `a` (reverse). It is built once at startup and never mutated
//! afterwards, so it can be shared freely between concurrent queries.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::error::SchemaError;
use crate::models::{ColumnRef, FkEdge};

/// What to do with an edge that does not match the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgePolicy {
    /// Abort graph construction with a [`SchemaError`].
    #[default]
    Error,
    /// Log a warning and drop the edge.
    Skip,
}

/// Orientation of a traversed edge relative to the declared FK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// From the FK-owning table to the referenced table.
    Forward,
    /// From the referenced table back to the FK owner.
    Reverse,
}

/// One adjacency entry: a table reachable in a single hop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjacent {
    pub table: String,
    /// Join column on the table being expanded.
    pub local: ColumnRef,
    /// Join column on the neighbor.
    pub remote: ColumnRef,
    pub direction: Direction,
}

/// Read-only FK adjacency map.
#[derive(Debug, Clone, Default)]
pub struct RelationshipGraph {
    adjacency: HashMap<String, Vec<Adjacent>>,
    edges: Vec<FkEdge>,
    foreign_keys: HashMap<ColumnRef, ColumnRef>,
}

impl RelationshipGraph {
    /// Build a graph from raw edges without catalog validation.
    ///
    /// Identical duplicate edges are collapsed. Adjacency order follows
    /// edge order, which is the BFS tie-break order.
    pub fn from_edges(edges: &[FkEdge]) -> Self {
        let mut graph = Self::default();
        let mut seen = HashSet::new();
        for edge in edges {
            if seen.insert(edge.clone()) {
                graph.insert(edge.clone());
            }
        }
        graph
    }

    /// Build a graph from edges, validating each against `catalog`.
    ///
    /// Edge table names are normalized with the catalog's default schema.
    /// An edge that references an undeclared table or column, or that
    /// gives a column a second, different FK target, is handled according
    /// to `policy`. Validation is skipped when the catalog is empty.
    pub fn build(
        edges: &[FkEdge],
        catalog: &Catalog,
        policy: EdgePolicy,
    ) -> Result<Self, SchemaError> {
        let mut graph = Self::default();
        let mut seen = HashSet::new();

        for raw in edges {
            let edge = FkEdge {
                table: catalog.normalize(&raw.table),
                column: raw.column.trim().to_string(),
                ref_table: catalog.normalize(&raw.ref_table),
                ref_column: raw.ref_column.trim().to_string(),
            };
            if !seen.insert(edge.clone()) {
                continue;
            }

            let checked = catalog.check_edge(&edge).and_then(|_| {
                match graph.foreign_keys.get(&edge.fk()) {
                    Some(existing) if *existing != edge.pk() => {
                        Err(SchemaError::ConflictingForeignKey {
                            column: edge.fk().to_string(),
                            existing: existing.to_string(),
                            conflicting: edge.pk().to_string(),
                        })
                    }
                    _ => Ok(()),
                }
            });

            match (checked, policy) {
                (Ok(()), _) => graph.insert(edge),
                (Err(e), EdgePolicy::Error) => return Err(e),
                (Err(e), EdgePolicy::Skip) => {
                    warn!(edge = %edge, error = %e, "skipping invalid foreign key edge");
                }
            }
        }

        debug!(
            tables = graph.table_count(),
            edges = graph.edge_count(),
            "relationship graph built"
        );
        Ok(graph)
    }

    fn insert(&mut self, edge: FkEdge) {
        let fk = edge.fk();
        let pk = edge.pk();
        self.adjacency
            .entry(edge.table.clone())
            .or_default()
            .push(Adjacent {
                table: edge.ref_table.clone(),
                local: fk.clone(),
                remote: pk.clone(),
                direction: Direction::Forward,
            });
        self.adjacency
            .entry(edge.ref_table.clone())
            .or_default()
            .push(Adjacent {
                table: edge.table.clone(),
                local: pk.clone(),
                remote: fk.clone(),
                direction: Direction::Reverse,
            });
        self.foreign_keys.entry(fk).or_insert(pk);
        self.edges.push(edge);
    }

    /// Raw adjacency entries for `table`, in insertion order. Empty for
    /// unknown tables.
    pub fn adjacent(&self, table: &str) -> &[Adjacent] {
        self.adjacency
            .get(table)
            .map(|a| a.as_slice())
            .unwrap_or(&[])
    }

    /// Tables one hop away from `table` in either direction, deduplicated
    /// in first-seen order. Empty for unknown tables.
    pub fn neighbors(&self, table: &str) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.adjacent(table)
            .iter()
            .map(|a| a.table.as_str())
            .filter(|t| seen.insert(*t))
            .collect()
    }

    /// The column referenced by `table.column`, if it is an FK.
    pub fn foreign_key(&self, table: &str, column: &str) -> Option<&ColumnRef> {
        self.foreign_keys.get(&ColumnRef::new(table, column))
    }

    pub fn contains(&self, table: &str) -> bool {
        self.adjacency.contains_key(table)
    }

    /// Accepted edges, after normalization and deduplication.
    pub fn edges(&self) -> &[FkEdge] {
        &self.edges
    }

    pub fn table_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
