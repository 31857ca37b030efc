//! # Schema Harness CLI (`schx`)
//!
//! ## Usage
//!
//! ```bash
//! schx --config ./config/schx.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `schx check` | Load and validate the catalog |
//! | `schx neighbors <table>` | List one-hop FK neighbors |
//! | `schx path <start> <end>` | Shortest join path between two tables |
//! | `schx paths <table>...` | Minimized join paths for a table set |
//! | `schx plan "<query>"` | Run retrieval, selection and path search |
//! | `schx sources` | List configured search sources |
//! | `schx completions <shell>` | Print shell completions |

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use schema_harness::{catalog, config, logging, plan, sources};

/// Schema Harness CLI: candidate table selection and FK join planning
/// for text-to-SQL.
#[derive(Parser)]
#[command(
    name = "schx",
    about = "Schema Harness: multi-source table retrieval and foreign-key join planning",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/schx.toml")]
    config: PathBuf,

    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate the catalog.
    ///
    /// Prints table, column, keyword and edge counts, and any table
    /// without foreign keys.
    Check,

    /// List the tables one FK hop away from a table.
    Neighbors {
        table: String,
    },

    /// Print the shortest join path between two tables.
    Path {
        start: String,
        end: String,

        /// Override `[paths].max_hops`.
        #[arg(long)]
        max_hops: Option<usize>,
    },

    /// Print the minimized join paths connecting a set of tables.
    Paths {
        #[arg(required = true, num_args = 2..)]
        tables: Vec<String>,

        /// Override `[paths].max_hops`.
        #[arg(long)]
        max_hops: Option<usize>,
    },

    /// Build the schema plan for a natural-language query.
    Plan {
        query: String,

        /// Pre-scored hits file; replaces `[sources].hits_file`.
        #[arg(long)]
        hits: Option<PathBuf>,

        /// Print the plan as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List configured search sources and their status.
    Sources,

    /// Print shell completions to stdout.
    Completions {
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    // Commands that don't require config
    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "schx", &mut std::io::stdout());
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Check => {
            catalog::run_check(&cfg)?;
        }
        Commands::Neighbors { table } => {
            catalog::run_neighbors(&cfg, &table)?;
        }
        Commands::Path {
            start,
            end,
            max_hops,
        } => {
            catalog::run_path(&cfg, &start, &end, max_hops)?;
        }
        Commands::Paths { tables, max_hops } => {
            catalog::run_paths(&cfg, &tables, max_hops)?;
        }
        Commands::Plan { query, hits, json } => {
            plan::run_plan(&cfg, &query, hits.as_deref(), json).await?;
        }
        Commands::Sources => {
            sources::list_sources(&cfg)?;
        }
        Commands::Completions { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
