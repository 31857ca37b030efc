//! # Schema Harness Core
//!
//! Pure schema-intelligence logic for Schema Harness: catalog models,
//! the foreign-key relationship graph, bounded shortest-path search,
//! join path minimization, and multi-source candidate ranking and
//! selection.
//!
//! This crate performs no file, network, or database I/O. Search
//! collaborators (embedding search, lexical search, keyword and value
//! lookup) are injected through the [`search::SearchSource`] trait and
//! everything else is a pure function of its inputs.
//!
//! ## Pipeline
//!
//! ```text
//! query ─▶ SearchSource × 4 ─▶ rank (top-K per source, unfused)
//!                                  │
//!                                  ▼
//!                        select_tables / rank_columns
//!                                  │
//!                                  ▼
//!          RelationshipGraph ─▶ all_pair_paths ─▶ minimize ─▶ SchemaPlan
//! ```

pub mod catalog;
pub mod error;
pub mod graph;
pub mod minimize;
pub mod models;
pub mod path;
pub mod plan;
pub mod rank;
pub mod search;
pub mod select;
