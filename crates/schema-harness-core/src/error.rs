//! Load-time schema errors.
//!
//! Only structurally invalid catalogs are errors. "No path" and "no
//! candidates" are ordinary results and are modelled as values
//! ([`PathOutcome::Unreachable`](crate::path::PathOutcome) and
//! [`PlanOutcome::EmptyCandidateSet`](crate::plan::PlanOutcome)).

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("empty {0} name in schema catalog")]
    EmptyName(&'static str),

    #[error("table '{0}' is declared more than once")]
    DuplicateTable(String),

    #[error("column '{table}.{column}' is declared more than once")]
    DuplicateColumn { table: String, column: String },

    #[error("foreign key {edge} references undeclared table '{table}'")]
    UnknownTable { table: String, edge: String },

    #[error("foreign key {edge} references undeclared column '{table}.{column}'")]
    UnknownColumn {
        table: String,
        column: String,
        edge: String,
    },

    #[error("column '{column}' already references '{existing}', cannot also reference '{conflicting}'")]
    ConflictingForeignKey {
        column: String,
        existing: String,
        conflicting: String,
    },
}
