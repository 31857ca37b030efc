//! End-to-end schema plan assembly.
//!
//! Wires the pieces together for one query:
//!
//! ```text
//! SourceHits ─▶ rank_sources ─▶ select_tables ─▶ rank_columns
//!                                    │
//!                                    ▼
//!                   all_pair_paths ─▶ minimize ─▶ schema pool
//! ```
//!
//! The resulting [`SchemaPlan`] is what the downstream prompt / SQL
//! generation stage consumes. Nothing here is cached between calls.

use std::collections::HashSet;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use tracing::debug;

use crate::catalog::Catalog;
use crate::graph::RelationshipGraph;
use crate::minimize::{minimize, path_tables};
use crate::models::ColumnRef;
use crate::path::{all_pair_paths, JoinPath, UnreachablePair};
use crate::rank::{rank_sources, Candidate, RankParams, RankedSource, SourceHits};
use crate::select::{rank_columns, select_tables};

/// Knobs recognized by the planner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanParams {
    /// Hop bound for path finding.
    pub max_hops: usize,
    /// Cap on the final ranked column list.
    pub top_n_columns: usize,
    pub rank: RankParams,
}

impl Default for PlanParams {
    fn default() -> Self {
        Self {
            max_hops: 2,
            top_n_columns: 7,
            rank: RankParams::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanOutcome {
    Ready,
    /// No source produced a qualifying table. Not an error; the caller
    /// decides how to tell the user.
    EmptyCandidateSet,
}

/// A column offered to the generator for one table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolColumn {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<ColumnRef>,
}

/// Compact per-table schema: key columns first, then relevant columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TablePool {
    pub table: String,
    /// Whether the table came from path finding only.
    pub intermediate: bool,
    /// Primary key columns, then the table's foreign key columns.
    pub key_columns: Vec<PoolColumn>,
    pub ranked_columns: Vec<PoolColumn>,
}

/// Everything the downstream generator needs for one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaPlan {
    pub outcome: PlanOutcome,
    /// Selected candidate tables.
    pub tables: Vec<String>,
    /// Tables that only appear as path intermediates.
    pub intermediate_tables: Vec<String>,
    /// Priority-ranked columns, capped at `top_n_columns`.
    pub columns: Vec<Candidate>,
    /// Minimized join paths, keyed `start→end`.
    #[serde(serialize_with = "serialize_paths")]
    pub join_paths: Vec<JoinPath>,
    pub unreachable: Vec<UnreachablePair>,
    pub schema_pool: Vec<TablePool>,
    /// The independent per-source rankings the selection came from.
    pub sources: Vec<RankedSource>,
}

fn serialize_paths<S: Serializer>(paths: &[JoinPath], serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(paths.len()))?;
    for p in paths {
        map.serialize_entry(&p.key(), &p.hops)?;
    }
    map.end()
}

impl SchemaPlan {
    fn empty(sources: Vec<RankedSource>) -> Self {
        Self {
            outcome: PlanOutcome::EmptyCandidateSet,
            tables: Vec::new(),
            intermediate_tables: Vec::new(),
            columns: Vec::new(),
            join_paths: Vec::new(),
            unreachable: Vec::new(),
            schema_pool: Vec::new(),
            sources,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.outcome == PlanOutcome::EmptyCandidateSet
    }
}

/// Build the plan for one query's hits.
///
/// Hit table names are normalized with the catalog's default schema
/// before ranking, so hits may use bare table names.
pub fn build_plan(
    catalog: &Catalog,
    graph: &RelationshipGraph,
    hits: &SourceHits,
    params: &PlanParams,
) -> SchemaPlan {
    let mut hits = hits.clone();
    hits.map_tables(|t| catalog.normalize(t));

    let ranked = rank_sources(&hits, &params.rank);
    let tables = select_tables(ranked.table_lists());
    if tables.is_empty() {
        debug!(hits = hits.len(), "no candidate tables selected");
        return SchemaPlan::empty(ranked.sources);
    }

    let selected: HashSet<&str> = tables.iter().map(|t| t.as_str()).collect();
    let in_scope: Vec<Candidate> = ranked
        .candidates
        .iter()
        .filter(|c| selected.contains(c.table.as_str()))
        .cloned()
        .collect();
    let columns = rank_columns(&in_scope, params.top_n_columns);

    let pairs = all_pair_paths(graph, &tables, params.max_hops);
    let join_paths = minimize(&pairs.paths);
    let intermediate_tables: Vec<String> = path_tables(&join_paths)
        .into_iter()
        .filter(|t| !selected.contains(t.as_str()))
        .collect();

    debug!(
        tables = tables.len(),
        columns = columns.len(),
        pair_paths = pairs.paths.len(),
        join_paths = join_paths.len(),
        unreachable = pairs.unreachable.len(),
        "schema plan built"
    );

    let schema_pool = tables
        .iter()
        .map(|t| (t, false))
        .chain(intermediate_tables.iter().map(|t| (t, true)))
        .map(|(t, intermediate)| {
            table_pool(catalog, graph, t, intermediate, &columns)
        })
        .collect();

    SchemaPlan {
        outcome: PlanOutcome::Ready,
        tables,
        intermediate_tables,
        columns,
        join_paths,
        unreachable: pairs.unreachable,
        schema_pool,
        sources: ranked.sources,
    }
}

fn pool_column(
    catalog: &Catalog,
    graph: &RelationshipGraph,
    table: &str,
    column: &str,
) -> PoolColumn {
    PoolColumn {
        name: column.to_string(),
        data_type: catalog
            .column(table, column)
            .map(|c| c.data_type.clone())
            .filter(|t| !t.is_empty()),
        references: graph.foreign_key(table, column).cloned(),
    }
}

/// Key columns of `table`, deduplicated.
///
/// Primary keys are the columns other tables reference; a table nobody
/// references falls back to a declared `id` column. Foreign key columns
/// follow in edge order.
fn key_column_names<'a>(
    catalog: &Catalog,
    graph: &'a RelationshipGraph,
    table: &str,
) -> Vec<&'a str> {
    let mut names: Vec<&str> = graph
        .edges()
        .iter()
        .filter(|e| e.ref_table == table)
        .map(|e| e.ref_column.as_str())
        .collect();
    if names.is_empty() && catalog.column(table, "id").is_some() {
        names.push("id");
    }
    names.extend(
        graph
            .edges()
            .iter()
            .filter(|e| e.table == table)
            .map(|e| e.column.as_str()),
    );

    let mut seen = HashSet::new();
    names.retain(|n| seen.insert(*n));
    names
}

fn table_pool(
    catalog: &Catalog,
    graph: &RelationshipGraph,
    table: &str,
    intermediate: bool,
    columns: &[Candidate],
) -> TablePool {
    let keys = key_column_names(catalog, graph, table);
    let mut seen: HashSet<&str> = keys.iter().copied().collect();

    let key_columns: Vec<PoolColumn> = keys
        .iter()
        .map(|c| pool_column(catalog, graph, table, c))
        .collect();

    let ranked_columns: Vec<PoolColumn> = columns
        .iter()
        .filter(|c| c.table == table)
        .filter_map(|c| c.column.as_deref())
        .filter(|c| seen.insert(*c))
        .map(|c| pool_column(catalog, graph, table, c))
        .collect();

    TablePool {
        table: table.to_string(),
        intermediate,
        key_columns,
        ranked_columns,
    }
}
