//! Catalog loading and the graph inspection commands.
//!
//! The catalog file is read once, validated into a [`Catalog`], and its
//! edges are built into a [`RelationshipGraph`]. Both are wrapped in an
//! `Arc` so one load can serve any number of queries.

use anyhow::{Context, Result};
use schema_harness_core::catalog::Catalog;
use schema_harness_core::graph::RelationshipGraph;
use schema_harness_core::minimize::minimize;
use schema_harness_core::models::CatalogDocument;
use schema_harness_core::path::{all_pair_paths, shortest_path, PathOutcome};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;

/// A loaded catalog and its relationship graph.
#[derive(Debug)]
pub struct Schema {
    pub catalog: Catalog,
    pub graph: RelationshipGraph,
}

impl Schema {
    /// Normalize a user-supplied table name and check that it is known.
    ///
    /// A name is known if the catalog declares it or, for edge-only
    /// catalogs, if the graph mentions it.
    pub fn resolve_table(&self, name: &str) -> Result<String> {
        let table = self.catalog.normalize(name);
        if self.catalog.contains(&table) || self.graph.contains(&table) {
            Ok(table)
        } else {
            anyhow::bail!("Unknown table: '{}'", table)
        }
    }
}

pub fn read_document(path: &Path) -> Result<CatalogDocument> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse catalog file: {}", path.display()))
}

/// Load, validate and index the configured catalog.
///
/// `catalog.default_schema` in the config takes precedence over the one
/// declared in the document.
pub fn load_schema(config: &Config) -> Result<Arc<Schema>> {
    let doc = read_document(&config.catalog.path)?;
    let default_schema = config
        .catalog
        .default_schema
        .clone()
        .or(doc.default_schema);

    let catalog =
        Catalog::new(doc.tables, default_schema).with_context(|| "Invalid catalog")?;
    let graph = RelationshipGraph::build(&doc.edges, &catalog, config.catalog.on_invalid_edge)
        .with_context(|| "Invalid foreign key edge")?;

    info!(
        tables = catalog.tables().len(),
        edges = graph.edge_count(),
        "catalog loaded"
    );
    Ok(Arc::new(Schema { catalog, graph }))
}

pub fn run_check(config: &Config) -> Result<()> {
    let schema = load_schema(config)?;
    let catalog = &schema.catalog;

    println!("Catalog:   {}", config.catalog.path.display());
    if let Some(s) = catalog.default_schema() {
        println!("Schema:    {}", s);
    }
    println!("Tables:    {}", catalog.tables().len());
    println!("Columns:   {}", catalog.column_count());
    println!("Keywords:  {}", catalog.keywords().len());
    println!("FK edges:  {}", schema.graph.edge_count());

    let isolated: Vec<&str> = catalog
        .tables()
        .iter()
        .map(|t| t.name.as_str())
        .filter(|t| !schema.graph.contains(t))
        .collect();
    if !isolated.is_empty() {
        println!("Isolated:  {}", isolated.join(", "));
    }
    println!("ok");
    Ok(())
}

pub fn run_neighbors(config: &Config, table: &str) -> Result<()> {
    let schema = load_schema(config)?;
    let table = schema.resolve_table(table)?;

    let adjacent = schema.graph.adjacent(&table);
    if adjacent.is_empty() {
        println!("{} has no foreign key neighbors.", table);
        return Ok(());
    }
    for a in adjacent {
        println!("{:<32} {} = {}", a.table, a.local, a.remote);
    }
    Ok(())
}

pub fn run_path(config: &Config, start: &str, end: &str, max_hops: Option<usize>) -> Result<()> {
    let schema = load_schema(config)?;
    let start = schema.resolve_table(start)?;
    let end = schema.resolve_table(end)?;
    let max_hops = max_hops.unwrap_or(config.paths.max_hops);

    match shortest_path(&schema.graph, &start, &end, max_hops) {
        PathOutcome::Found(hops) if hops.is_empty() => {
            println!("{} and {} are the same table.", start, end);
        }
        PathOutcome::Found(hops) => {
            for hop in hops {
                println!("{}", hop);
            }
        }
        PathOutcome::Unreachable => {
            println!("unreachable within {} hops", max_hops);
        }
    }
    Ok(())
}

pub fn run_paths(config: &Config, tables: &[String], max_hops: Option<usize>) -> Result<()> {
    let schema = load_schema(config)?;
    let tables = tables
        .iter()
        .map(|t| schema.resolve_table(t))
        .collect::<Result<Vec<_>>>()?;
    let max_hops = max_hops.unwrap_or(config.paths.max_hops);

    let pairs = all_pair_paths(&schema.graph, &tables, max_hops);
    let minimal = minimize(&pairs.paths);

    if minimal.is_empty() {
        println!("No join paths.");
    }
    for path in &minimal {
        println!("{}", path);
    }
    for pair in &pairs.unreachable {
        println!("{}→{}: unreachable", pair.start, pair.end);
    }
    Ok(())
}
