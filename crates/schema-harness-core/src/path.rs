//! Bounded shortest-path search over the [`RelationshipGraph`].
//!
//! # Algorithm
//!
//! Plain breadth-first search. Each queue entry carries the table, the
//! hops taken so far and the depth. A table is marked visited when it is
//! dequeued; a dequeued table that was already visited is skipped. The
//! first dequeue of `end` returns, which makes the result a shortest path
//! by hop count, with ties broken by adjacency insertion order. Entries
//! at `depth == max_hops` are not expanded.
//!
//! Not finding a path is a normal outcome: [`PathOutcome::Unreachable`].

use std::collections::{HashSet, VecDeque};
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::graph::{Direction, RelationshipGraph};
use crate::models::ColumnRef;

/// One traversal across a single FK edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Hop {
    pub from: ColumnRef,
    pub to: ColumnRef,
    pub direction: Direction,
}

impl Hop {
    /// The FK-owning side of the underlying edge.
    pub fn fk(&self) -> &ColumnRef {
        match self.direction {
            Direction::Forward => &self.from,
            Direction::Reverse => &self.to,
        }
    }

    /// The referenced side of the underlying edge.
    pub fn pk(&self) -> &ColumnRef {
        match self.direction {
            Direction::Forward => &self.to,
            Direction::Reverse => &self.from,
        }
    }

    /// Orientation-independent identity of the underlying edge.
    pub fn edge_key(&self) -> (&ColumnRef, &ColumnRef) {
        (self.fk(), self.pk())
    }
}

impl fmt::Display for Hop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Result of a single shortest-path query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathOutcome {
    /// A shortest path; empty when start and end are the same table.
    Found(Vec<Hop>),
    /// No path within the hop bound.
    Unreachable,
}

impl PathOutcome {
    pub fn is_reachable(&self) -> bool {
        matches!(self, PathOutcome::Found(_))
    }

    pub fn hops(&self) -> Option<&[Hop]> {
        match self {
            PathOutcome::Found(h) => Some(h),
            PathOutcome::Unreachable => None,
        }
    }

    pub fn into_hops(self) -> Option<Vec<Hop>> {
        match self {
            PathOutcome::Found(h) => Some(h),
            PathOutcome::Unreachable => None,
        }
    }
}

/// Find a shortest path from `start` to `end` using at most `max_hops`
/// edges.
pub fn shortest_path(
    graph: &RelationshipGraph,
    start: &str,
    end: &str,
    max_hops: usize,
) -> PathOutcome {
    if start == end {
        return PathOutcome::Found(Vec::new());
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<(&str, Vec<Hop>, usize)> = VecDeque::new();
    queue.push_back((start, Vec::new(), 0));

    while let Some((current, path, depth)) = queue.pop_front() {
        if current == end {
            return PathOutcome::Found(path);
        }
        if !visited.insert(current) {
            continue;
        }
        if depth >= max_hops {
            continue;
        }
        for adj in graph.adjacent(current) {
            if visited.contains(adj.table.as_str()) {
                continue;
            }
            let mut next = path.clone();
            next.push(Hop {
                from: adj.local.clone(),
                to: adj.remote.clone(),
                direction: adj.direction,
            });
            queue.push_back((adj.table.as_str(), next, depth + 1));
        }
    }

    PathOutcome::Unreachable
}

/// A connecting path between two candidate tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinPath {
    pub start: String,
    pub end: String,
    pub hops: Vec<Hop>,
}

impl JoinPath {
    /// Display key, `start→end`.
    pub fn key(&self) -> String {
        format!("{}→{}", self.start, self.end)
    }

    pub fn len(&self) -> usize {
        self.hops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }
}

impl fmt::Display for JoinPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.key())?;
        for (i, hop) in self.hops.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{}", hop)?;
        }
        Ok(())
    }
}

/// A candidate pair with no connection within the hop bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnreachablePair {
    pub start: String,
    pub end: String,
}

/// Every pairwise path among a table set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PairPaths {
    /// Reachable pairs, in enumeration order.
    pub paths: Vec<JoinPath>,
    pub unreachable: Vec<UnreachablePair>,
}

/// Compute shortest paths for every pair `(tᵢ, tⱼ)` with `i < j`.
///
/// `tables` is deduplicated first (first occurrence wins), so pair order
/// follows the candidate list order.
pub fn all_pair_paths<S: AsRef<str>>(
    graph: &RelationshipGraph,
    tables: &[S],
    max_hops: usize,
) -> PairPaths {
    let mut seen = HashSet::new();
    let tables: Vec<&str> = tables
        .iter()
        .map(|t| t.as_ref())
        .filter(|t| seen.insert(*t))
        .collect();

    let mut result = PairPaths::default();
    for (i, start) in tables.iter().enumerate() {
        for end in &tables[i + 1..] {
            match shortest_path(graph, start, end, max_hops) {
                PathOutcome::Found(hops) => result.paths.push(JoinPath {
                    start: start.to_string(),
                    end: end.to_string(),
                    hops,
                }),
                PathOutcome::Unreachable => {
                    debug!(start = %start, end = %end, max_hops, "no path within hop bound");
                    result.unreachable.push(UnreachablePair {
                        start: start.to_string(),
                        end: end.to_string(),
                    });
                }
            }
        }
    }
    result
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::FkEdge;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    pub(crate) fn random_edges(rng: &mut StdRng, nodes: usize, edges: usize) -> Vec<FkEdge> {
        (0..edges)
            .map(|i| {
                let a = rng.gen_range(0..nodes);
                let b = rng.gen_range(0..nodes);
                FkEdge::new(format!("t{}", a), format!("c{}", i), format!("t{}", b), "id")
            })
            .collect()
    }

    /// Floyd–Warshall hop distances over the undirected edge set.
    fn oracle(nodes: usize, edges: &[FkEdge]) -> Vec<Vec<Option<usize>>> {
        let idx = |t: &str| t[1..].parse::<usize>().unwrap();
        let mut d = vec![vec![None; nodes]; nodes];
        for (i, row) in d.iter_mut().enumerate() {
            row[i] = Some(0);
        }
        for e in edges {
            let (a, b) = (idx(&e.table), idx(&e.ref_table));
            if a != b {
                d[a][b] = Some(1);
                d[b][a] = Some(1);
            }
        }
        for k in 0..nodes {
            for i in 0..nodes {
                for j in 0..nodes {
                    if let (Some(ik), Some(kj)) = (d[i][k], d[k][j]) {
                        if d[i][j].map_or(true, |ij| ik + kj < ij) {
                            d[i][j] = Some(ik + kj);
                        }
                    }
                }
            }
        }
        d
    }

    fn assert_valid_chain(graph: &RelationshipGraph, start: &str, end: &str, hops: &[Hop]) {
        let mut at = start.to_string();
        for hop in hops {
            assert_eq!(hop.from.table, at, "hop does not continue the chain");
            assert!(
                graph
                    .adjacent(&at)
                    .iter()
                    .any(|a| a.local == hop.from && a.remote == hop.to),
                "hop {} is not an edge",
                hop
            );
            at = hop.to.table.clone();
        }
        assert_eq!(at, end);
    }

    fn chain() -> RelationshipGraph {
        RelationshipGraph::from_edges(&[
            FkEdge::new("m_load_profile", "meter_id", "e_sayac", "id"),
            FkEdge::new("e_sayac", "il_id", "il", "id"),
        ])
    }

    #[test]
    fn same_table_is_empty_path() {
        let g = chain();
        assert_eq!(
            shortest_path(&g, "il", "il", 2),
            PathOutcome::Found(Vec::new())
        );
        assert_eq!(
            shortest_path(&g, "il", "il", 0),
            PathOutcome::Found(Vec::new())
        );
    }

    #[test]
    fn traverses_forward_and_reverse() {
        let g = chain();
        let hops = shortest_path(&g, "il", "m_load_profile", 2)
            .into_hops()
            .unwrap();
        assert_eq!(hops.len(), 2);
        assert_eq!(hops[0].from, ColumnRef::new("il", "id"));
        assert_eq!(hops[0].to, ColumnRef::new("e_sayac", "il_id"));
        assert_eq!(hops[0].direction, Direction::Reverse);
        assert_eq!(hops[0].fk(), &ColumnRef::new("e_sayac", "il_id"));
        assert_eq!(hops[1].to, ColumnRef::new("m_load_profile", "meter_id"));
    }

    #[test]
    fn hop_bound_is_respected() {
        let g = chain();
        assert_eq!(
            shortest_path(&g, "m_load_profile", "il", 1),
            PathOutcome::Unreachable
        );
        assert!(shortest_path(&g, "m_load_profile", "il", 2).is_reachable());
    }

    #[test]
    fn unknown_tables_are_unreachable() {
        let g = chain();
        assert_eq!(shortest_path(&g, "x", "il", 5), PathOutcome::Unreachable);
        assert_eq!(shortest_path(&g, "il", "x", 5), PathOutcome::Unreachable);
    }

    #[test]
    fn ties_follow_adjacency_insertion_order() {
        let g = RelationshipGraph::from_edges(&[
            FkEdge::new("a", "b_id", "b", "id"),
            FkEdge::new("a", "c_id", "c", "id"),
            FkEdge::new("b", "d_id", "d", "id"),
            FkEdge::new("c", "d_id", "d", "id"),
        ]);
        let hops = shortest_path(&g, "a", "d", 2).into_hops().unwrap();
        assert_eq!(hops[0].to.table, "b");

        let g = RelationshipGraph::from_edges(&[
            FkEdge::new("a", "created_by", "u", "id"),
            FkEdge::new("a", "updated_by", "u", "id"),
        ]);
        let hops = shortest_path(&g, "a", "u", 1).into_hops().unwrap();
        assert_eq!(hops[0].from.column, "created_by");
    }

    #[test]
    fn self_referencing_edge_is_harmless() {
        let g = RelationshipGraph::from_edges(&[
            FkEdge::new("emp", "manager_id", "emp", "id"),
            FkEdge::new("emp", "dept_id", "dept", "id"),
        ]);
        let hops = shortest_path(&g, "emp", "dept", 2).into_hops().unwrap();
        assert_eq!(hops.len(), 1);
    }

    #[test]
    fn matches_bfs_oracle_on_random_graphs() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..40 {
            let nodes = rng.gen_range(2..11);
            let edge_count = rng.gen_range(0..nodes * 2);
            let edges = random_edges(&mut rng, nodes, edge_count);
            let graph = RelationshipGraph::from_edges(&edges);
            let dist = oracle(nodes, &edges);

            for max_hops in 0..4 {
                for a in 0..nodes {
                    for b in 0..nodes {
                        let (sa, sb) = (format!("t{}", a), format!("t{}", b));
                        let outcome = shortest_path(&graph, &sa, &sb, max_hops);
                        match dist[a][b] {
                            Some(d) if d <= max_hops => {
                                let hops = outcome.hops().expect("expected a path");
                                assert_eq!(hops.len(), d, "{} -> {}", sa, sb);
                                assert_valid_chain(&graph, &sa, &sb, hops);
                            }
                            _ => assert_eq!(outcome, PathOutcome::Unreachable),
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn all_pairs_follow_candidate_order() {
        let g = chain();
        let pairs = all_pair_paths(&g, &["m_load_profile", "e_sayac", "il", "e_sayac"], 2);
        let keys: Vec<String> = pairs.paths.iter().map(|p| p.key()).collect();
        assert_eq!(
            keys,
            vec![
                "m_load_profile→e_sayac",
                "m_load_profile→il",
                "e_sayac→il"
            ]
        );
        assert!(pairs.unreachable.is_empty());
    }

    #[test]
    fn all_pairs_reports_unreachable() {
        let g = chain();
        let pairs = all_pair_paths(&g, &["m_load_profile", "il", "orphan"], 1);
        assert!(pairs.paths.is_empty());
        assert_eq!(pairs.unreachable.len(), 3);
        assert_eq!(pairs.unreachable[0].start, "m_load_profile");
        assert_eq!(pairs.unreachable[0].end, "il");
    }

    #[test]
    fn hop_serializes_with_column_refs() {
        let g = chain();
        let hops = shortest_path(&g, "e_sayac", "il", 2).into_hops().unwrap();
        let json = serde_json::to_value(&hops).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{"from": "e_sayac.il_id", "to": "il.id", "direction": "forward"}])
        );
    }
}
