//! Redundant join path elimination.
//!
//! Given every pairwise path among the candidate tables, keep only the
//! paths needed to connect the same tables:
//!
//! 1. Visit paths by hop count ascending; equal lengths keep insertion
//!    order.
//! 2. A path is retained unless every one of its hops joins two tables
//!    that the already retained paths connect (tracked with union-find).
//!    `A→B` and `B→C` retained makes `A→B→C` redundant.
//! 3. A retained path whose edge sequence is a contiguous sub-sequence of
//!    another retained path (in either orientation) is dropped.
//!
//! Survivors are returned in insertion order. The result is idempotent
//! and connects exactly the tables the input connected.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::models::ColumnRef;
use crate::path::JoinPath;

/// Minimal union-find over table names.
#[derive(Debug, Default)]
struct Components {
    parent: HashMap<String, String>,
}

impl Components {
    fn find(&mut self, table: &str) -> String {
        let parent = match self.parent.get(table) {
            Some(p) if p != table => p.clone(),
            _ => return table.to_string(),
        };
        let root = self.find(&parent);
        self.parent.insert(table.to_string(), root.clone());
        root
    }

    fn connected(&mut self, a: &str, b: &str) -> bool {
        a == b || self.find(a) == self.find(b)
    }

    fn union(&mut self, a: &str, b: &str) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent.insert(ra, rb);
        }
    }
}

type EdgeKey<'a> = (&'a ColumnRef, &'a ColumnRef);

fn edge_keys(path: &JoinPath) -> Vec<EdgeKey<'_>> {
    path.hops.iter().map(|h| h.edge_key()).collect()
}

fn is_contiguous_in(needle: &[EdgeKey<'_>], haystack: &[EdgeKey<'_>]) -> bool {
    if needle.is_empty() || needle.len() > haystack.len() {
        return false;
    }
    let reversed: Vec<EdgeKey<'_>> = haystack.iter().rev().copied().collect();
    haystack.windows(needle.len()).any(|w| w == needle)
        || reversed.windows(needle.len()).any(|w| w == needle)
}

/// Remove paths implied by the other retained paths.
pub fn minimize(paths: &[JoinPath]) -> Vec<JoinPath> {
    if paths.is_empty() {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..paths.len()).collect();
    order.sort_by_key(|&i| paths[i].len());

    let mut components = Components::default();
    let mut retained = Vec::new();
    for i in order {
        let path = &paths[i];
        let implied = path
            .hops
            .iter()
            .all(|h| components.connected(&h.from.table, &h.to.table));
        if implied {
            debug!(path = %path.key(), "dropping path implied by retained paths");
            continue;
        }
        for h in &path.hops {
            components.union(&h.from.table, &h.to.table);
        }
        retained.push(i);
    }
    retained.sort_unstable();

    let keys: HashMap<usize, Vec<EdgeKey<'_>>> =
        retained.iter().map(|&i| (i, edge_keys(&paths[i]))).collect();

    let mut dropped = HashSet::new();
    for &i in &retained {
        let covered = retained.iter().any(|&j| {
            if i == j || dropped.contains(&j) {
                return false;
            }
            let (pi, pj) = (&keys[&i], &keys[&j]);
            let longer = pj.len() > pi.len() || (pj.len() == pi.len() && j < i);
            longer && is_contiguous_in(pi, pj)
        });
        if covered {
            debug!(path = %paths[i].key(), "dropping sub-path of a retained path");
            dropped.insert(i);
        }
    }

    retained
        .into_iter()
        .filter(|i| !dropped.contains(i))
        .map(|i| paths[i].clone())
        .collect()
}

/// Every table touched by `paths`, in first-seen order.
pub fn path_tables(paths: &[JoinPath]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for p in paths {
        let tables = std::iter::once(p.start.as_str())
            .chain(p.hops.iter().map(|h| h.to.table.as_str()))
            .chain(std::iter::once(p.end.as_str()));
        for t in tables {
            if seen.insert(t) {
                out.push(t.to_string());
            }
        }
    }
    out
}
