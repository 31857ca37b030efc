//! The `schx plan` command: query → sources → [`SchemaPlan`].

use anyhow::Result;
use schema_harness_core::plan::{build_plan, SchemaPlan, TablePool};
use schema_harness_core::search::collect_hits;
use std::path::Path;
use tracing::debug;

use crate::catalog::{load_schema, Schema};
use crate::config::Config;
use crate::sources::build_sources;

/// Run every configured source for `query` and assemble the plan.
pub async fn plan_query(
    config: &Config,
    schema: &Schema,
    query: &str,
    hits_override: Option<&Path>,
) -> Result<SchemaPlan> {
    let sources = build_sources(config, schema, hits_override)?;
    debug!(sources = sources.len(), "querying search sources");

    let hits = collect_hits(&sources, query, config.retrieval.search_limit).await;
    Ok(build_plan(
        &schema.catalog,
        &schema.graph,
        &hits,
        &config.plan_params(),
    ))
}

pub async fn run_plan(
    config: &Config,
    query: &str,
    hits_override: Option<&Path>,
    json: bool,
) -> Result<()> {
    if query.trim().is_empty() {
        anyhow::bail!("Query must not be empty");
    }
    let schema = load_schema(config)?;
    let plan = plan_query(config, &schema, query, hits_override).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print_plan(&plan);
    }
    Ok(())
}

fn print_pool(pool: &TablePool) {
    let marker = if pool.intermediate { " (join only)" } else { "" };
    println!("  {}{}", pool.table, marker);
    for col in pool.key_columns.iter().chain(&pool.ranked_columns) {
        let ty = col.data_type.as_deref().unwrap_or("?");
        match &col.references {
            Some(r) => println!("    {:<24} {:<12} -> {}", col.name, ty, r),
            None => println!("    {:<24} {}", col.name, ty),
        }
    }
}

fn print_plan(plan: &SchemaPlan) {
    if plan.is_empty() {
        println!("No candidate tables matched the query.");
        return;
    }

    println!("Tables: {}", plan.tables.join(", "));
    if !plan.intermediate_tables.is_empty() {
        println!("Via:    {}", plan.intermediate_tables.join(", "));
    }

    println!();
    println!("Columns:");
    for (i, c) in plan.columns.iter().enumerate() {
        let column = c.column.as_deref().unwrap_or("*");
        print!(
            "  {}. {}.{}  [{} {:.2}]",
            i + 1,
            c.table,
            column,
            c.source,
            c.score
        );
        match &c.matched {
            Some(m) => println!("  \"{}\"", m),
            None => println!(),
        }
    }

    println!();
    println!("Join paths:");
    if plan.join_paths.is_empty() {
        println!("  (none)");
    }
    for p in &plan.join_paths {
        println!("  {}", p);
    }
    for u in &plan.unreachable {
        println!("  {}→{}: unreachable", u.start, u.end);
    }

    println!();
    println!("Schema:");
    for pool in &plan.schema_pool {
        print_pool(pool);
    }
}
