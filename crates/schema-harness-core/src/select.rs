//! Candidate table selection and priority-first column ranking.
//!
//! Tables: the plain union of every source's top-K list. Presence is
//! binary; no merged score is computed.
//!
//! Columns: a two-key sort, source priority first and similarity second.
//! A low-similarity data-value hit always outranks a high-similarity
//! semantic hit.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::rank::{Candidate, TableScore};

/// Deduplicated union of per-source table lists.
///
/// Output order is first appearance across `lists` in the order given;
/// the member set does not depend on that order.
pub fn select_tables<'a, I>(lists: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a [TableScore]>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for list in lists {
        for ts in list {
            if seen.insert(ts.table.as_str()) {
                out.push(ts.table.clone());
            }
        }
    }
    out
}

fn outranks(a: &Candidate, b: &Candidate) -> bool {
    a.priority() > b.priority() || (a.priority() == b.priority() && a.score > b.score)
}

/// Rank column candidates by source priority, then score, and keep the
/// first `top_n`.
///
/// Table-level candidates (no column) are ignored. A column reported by
/// several sources is kept once, from its highest-priority source (then
/// highest score). Equal keys keep input order.
pub fn rank_columns(candidates: &[Candidate], top_n: usize) -> Vec<Candidate> {
    let mut unique: Vec<Candidate> = Vec::new();
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();

    for c in candidates {
        let Some(column) = c.column.as_deref() else {
            continue;
        };
        if c.table.is_empty() || column.is_empty() || !c.score.is_finite() {
            continue;
        }
        match index.get(&(c.table.as_str(), column)) {
            Some(&i) => {
                if outranks(c, &unique[i]) {
                    unique[i] = c.clone();
                }
            }
            None => {
                index.insert((c.table.as_str(), column), unique.len());
                unique.push(c.clone());
            }
        }
    }

    unique.sort_by(|a, b| {
        b.priority()
            .cmp(&a.priority())
            .then(b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
    });
    unique.truncate(top_n);
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::{rank_sources, Hit, RankParams, SourceHits, SourceTag};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn cand(table: &str, column: &str, score: f64, source: SourceTag) -> Candidate {
        Candidate {
            table: table.into(),
            column: Some(column.into()),
            score,
            source,
            matched: None,
        }
    }

    fn ts(tables: &[&str]) -> Vec<TableScore> {
        tables
            .iter()
            .map(|t| TableScore {
                table: t.to_string(),
                score: 1.0,
            })
            .collect()
    }

    #[test]
    fn select_tables_dedups_union() {
        let lists = [
            ts(&["a", "b", "c"]),
            ts(&["b", "d", "e"]),
            ts(&["a", "f", "g"]),
            ts(&["h", "c", "e"]),
        ];
        let selected = select_tables(lists.iter().map(|l| l.as_slice()));
        assert_eq!(selected.len(), 8);
        assert_eq!(selected, vec!["a", "b", "c", "d", "e", "f", "g", "h"]);
    }

    #[test]
    fn select_tables_is_order_independent() {
        let lists = [
            ts(&["a", "b", "c"]),
            ts(&["b", "d", "e"]),
            ts(&["a", "f", "g"]),
            ts(&["h", "c", "e"]),
        ];
        let reference: HashSet<String> =
            select_tables(lists.iter().map(|l| l.as_slice())).into_iter().collect();

        let perms: [[usize; 4]; 6] = [
            [3, 2, 1, 0],
            [1, 0, 3, 2],
            [2, 3, 0, 1],
            [0, 2, 1, 3],
            [3, 0, 2, 1],
            [1, 3, 0, 2],
        ];
        for perm in perms {
            let selected = select_tables(perm.iter().map(|&i| lists[i].as_slice()));
            assert_eq!(selected.len(), 8, "duplicates for {:?}", perm);
            let set: HashSet<String> = selected.into_iter().collect();
            assert_eq!(set, reference);
        }
    }

    #[test]
    fn select_tables_empty_input() {
        let lists: Vec<Vec<TableScore>> = vec![Vec::new(); 4];
        assert!(select_tables(lists.iter().map(|l| l.as_slice())).is_empty());
    }

    #[test]
    fn select_from_ranked_sources() {
        let hits = SourceHits {
            data_values: vec![Hit::new("il", Some("ad"), 0.6)],
            semantic: vec![
                Hit::new("e_sayac", Some("seri_no"), 0.8),
                Hit::new("il", Some("ad"), 0.7),
            ],
            ..Default::default()
        };
        let ranked = rank_sources(&hits, &RankParams::default());
        assert_eq!(select_tables(ranked.table_lists()), vec!["il", "e_sayac"]);
    }

    #[test]
    fn priority_dominates_similarity() {
        let cands = vec![
            cand("s", "x", 0.99, SourceTag::Semantic),
            cand("v", "x", 0.01, SourceTag::DataValues),
            cand("l", "x", 0.98, SourceTag::Lexical),
            cand("k", "x", 0.02, SourceTag::Keyword),
        ];
        let ranked = rank_columns(&cands, 10);
        let order: Vec<SourceTag> = ranked.iter().map(|c| c.source).collect();
        assert_eq!(
            order,
            vec![
                SourceTag::DataValues,
                SourceTag::Keyword,
                SourceTag::Semantic,
                SourceTag::Lexical
            ]
        );
    }

    #[test]
    fn score_breaks_ties_within_priority() {
        let cands = vec![
            cand("a", "x", 0.2, SourceTag::Semantic),
            cand("b", "x", 0.7, SourceTag::Semantic),
            cand("c", "x", 0.5, SourceTag::Semantic),
        ];
        let ranked = rank_columns(&cands, 2);
        let tables: Vec<&str> = ranked.iter().map(|c| c.table.as_str()).collect();
        assert_eq!(tables, vec!["b", "c"]);
    }

    #[test]
    fn duplicate_columns_keep_highest_priority() {
        let cands = vec![
            cand("e_sayac", "seri_no", 0.9, SourceTag::Semantic),
            cand("e_sayac", "seri_no", 0.3, SourceTag::Keyword),
            cand("e_sayac", "seri_no", 0.5, SourceTag::Keyword),
        ];
        let ranked = rank_columns(&cands, 10);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].source, SourceTag::Keyword);
        assert_eq!(ranked[0].score, 0.5);
    }

    #[test]
    fn table_level_candidates_are_ignored() {
        let mut c = cand("e_sayac", "", 1.0, SourceTag::Keyword);
        c.column = None;
        assert!(rank_columns(&[c], 5).is_empty());
        assert!(rank_columns(&[], 5).is_empty());
    }

    #[test]
    fn data_value_always_beats_semantic() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let low: f64 = rng.gen_range(0.0..1.0);
            let high: f64 = rng.gen_range(low..=1.0);
            let cands = vec![
                cand("s", "x", high, SourceTag::Semantic),
                cand("v", "x", low, SourceTag::DataValues),
            ];
            let ranked = rank_columns(&cands, 2);
            assert_eq!(ranked[0].source, SourceTag::DataValues);
        }
    }
}
