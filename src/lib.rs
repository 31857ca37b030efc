//! # Schema Harness
//!
//! Schema intelligence for text-to-SQL pipelines. Given a natural-language
//! query and a schema catalog, Schema Harness picks the candidate tables
//! and columns from several independent retrieval sources and computes the
//! minimal set of foreign-key joins that connects them.
//!
//! The algorithms live in [`schema_harness_core`]; this crate adds file
//! loading, configuration, the built-in search sources and the `schx` CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ catalog.json │──▶│ Catalog +    │──▶│  path search │
//! │ (tables, FK) │   │ FK graph     │   │  + minimize  │
//! └──────────────┘   └──────────────┘   └──────┬───────┘
//!                                              │
//! ┌──────────────┐   ┌──────────────┐          ▼
//! │ keywords /   │──▶│ rank + select│──▶  SchemaPlan
//! │ hits file    │   │ per source   │
//! └──────────────┘   └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! schx check                          # validate the catalog
//! schx path m_load_profile il         # shortest join path
//! schx plan "ankara sayaç okumaları"   # full pipeline
//! schx plan "..." --hits hits.json --json
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`catalog`] | Catalog loading, graph inspection commands |
//! | [`sources`] | Keyword dictionary and hits-file search sources |
//! | [`plan`] | The `plan` command |
//! | [`logging`] | tracing subscriber setup |

pub mod catalog;
pub mod config;
pub mod logging;
pub mod plan;
pub mod sources;
