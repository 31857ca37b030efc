//! Independent per-source candidate ranking.
//!
//! Every retrieval source (data values, keyword, semantic, lexical) is
//! ranked on its own scale and capped at its own top-K. Scores from
//! different sources are never normalized against each other or blended:
//! fusion happens later, by source priority, in
//! [`select`](crate::select).

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The retrieval strategy that produced a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    DataValues,
    Keyword,
    Semantic,
    Lexical,
}

impl SourceTag {
    /// All sources, highest priority first.
    pub const ALL: [SourceTag; 4] = [
        SourceTag::DataValues,
        SourceTag::Keyword,
        SourceTag::Semantic,
        SourceTag::Lexical,
    ];

    /// Fixed priority rank: data_values=5, keyword=4, semantic=3, lexical=2.
    pub fn priority(self) -> u8 {
        match self {
            SourceTag::DataValues => 5,
            SourceTag::Keyword => 4,
            SourceTag::Semantic => 3,
            SourceTag::Lexical => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceTag::DataValues => "data_values",
            SourceTag::Keyword => "keyword",
            SourceTag::Semantic => "semantic",
            SourceTag::Lexical => "lexical",
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceTag::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown source '{}'. Use data_values, keyword, semantic, or lexical.",
                    s
                )
            })
    }
}

/// A scored hit as reported by a search collaborator.
///
/// `column` is `None` for table-level hits (e.g. a table keyword match).
/// `matched` carries the keyword or literal value that matched, when the
/// source reports one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(alias = "similarity")]
    pub score: f64,
    #[serde(
        default,
        alias = "keyword",
        alias = "value_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub matched: Option<String>,
}

impl Hit {
    pub fn new(table: impl Into<String>, column: Option<&str>, score: f64) -> Self {
        Self {
            table: table.into(),
            column: column.map(str::to_string),
            score,
            matched: None,
        }
    }
}

/// A hit tagged with its source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub table: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    pub score: f64,
    pub source: SourceTag,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<String>,
}

impl Candidate {
    pub fn from_hit(hit: &Hit, source: SourceTag) -> Self {
        Self {
            table: hit.table.clone(),
            column: hit.column.clone(),
            score: hit.score,
            source,
            matched: hit.matched.clone(),
        }
    }

    pub fn priority(&self) -> u8 {
        self.source.priority()
    }
}

/// A table with its best score within one source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableScore {
    pub table: String,
    pub score: f64,
}

fn by_score_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// First `k` hits by descending score. Stable: ties keep the order the
/// source reported them in. Non-finite scores are discarded.
pub fn rank(hits: &[Hit], k: usize) -> Vec<Hit> {
    let mut ranked: Vec<Hit> = hits
        .iter()
        .filter(|h| h.score.is_finite())
        .cloned()
        .collect();
    ranked.sort_by(|a, b| by_score_desc(a.score, b.score));
    ranked.truncate(k);
    ranked
}

/// Top `k` distinct tables of one source. Each table keeps its best hit
/// score; ties keep first-seen order.
pub fn top_tables(hits: &[Hit], k: usize) -> Vec<TableScore> {
    let mut best: Vec<TableScore> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for h in hits.iter().filter(|h| h.score.is_finite() && !h.table.is_empty()) {
        match index.get(h.table.as_str()) {
            Some(&i) => {
                if h.score > best[i].score {
                    best[i].score = h.score;
                }
            }
            None => {
                index.insert(&h.table, best.len());
                best.push(TableScore {
                    table: h.table.clone(),
                    score: h.score,
                });
            }
        }
    }
    best.sort_by(|a, b| by_score_desc(a.score, b.score));
    best.truncate(k);
    best
}

/// Raw hits grouped by source. This is also the on-disk hits file shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceHits {
    #[serde(default)]
    pub data_values: Vec<Hit>,
    #[serde(default, alias = "keywords")]
    pub keyword: Vec<Hit>,
    #[serde(default)]
    pub semantic: Vec<Hit>,
    #[serde(default)]
    pub lexical: Vec<Hit>,
}

impl SourceHits {
    pub fn get(&self, tag: SourceTag) -> &[Hit] {
        match tag {
            SourceTag::DataValues => &self.data_values,
            SourceTag::Keyword => &self.keyword,
            SourceTag::Semantic => &self.semantic,
            SourceTag::Lexical => &self.lexical,
        }
    }

    pub fn get_mut(&mut self, tag: SourceTag) -> &mut Vec<Hit> {
        match tag {
            SourceTag::DataValues => &mut self.data_values,
            SourceTag::Keyword => &mut self.keyword,
            SourceTag::Semantic => &mut self.semantic,
            SourceTag::Lexical => &mut self.lexical,
        }
    }

    /// Append every hit of `other`, keeping per-source order.
    pub fn extend(&mut self, other: SourceHits) {
        self.data_values.extend(other.data_values);
        self.keyword.extend(other.keyword);
        self.semantic.extend(other.semantic);
        self.lexical.extend(other.lexical);
    }

    /// Rewrite every hit's table name, e.g. to add a default schema.
    pub fn map_tables(&mut self, f: impl Fn(&str) -> String) {
        for tag in SourceTag::ALL {
            for h in self.get_mut(tag) {
                h.table = f(&h.table);
            }
        }
    }

    pub fn len(&self) -> usize {
        SourceTag::ALL.iter().map(|t| self.get(*t).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Minimum score a hit needs to count towards its source's top-K tables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinScores {
    #[serde(default = "default_data_values_min")]
    pub data_values: f64,
    #[serde(default = "default_keyword_min")]
    pub keyword: f64,
    #[serde(default = "default_semantic_min")]
    pub semantic: f64,
    #[serde(default = "default_lexical_min")]
    pub lexical: f64,
}

fn default_data_values_min() -> f64 {
    0.5
}
fn default_keyword_min() -> f64 {
    0.4
}
fn default_semantic_min() -> f64 {
    0.5
}
fn default_lexical_min() -> f64 {
    0.4
}

impl Default for MinScores {
    fn default() -> Self {
        Self {
            data_values: default_data_values_min(),
            keyword: default_keyword_min(),
            semantic: default_semantic_min(),
            lexical: default_lexical_min(),
        }
    }
}

impl MinScores {
    /// No threshold on any source.
    pub fn none() -> Self {
        Self {
            data_values: f64::NEG_INFINITY,
            keyword: f64::NEG_INFINITY,
            semantic: f64::NEG_INFINITY,
            lexical: f64::NEG_INFINITY,
        }
    }

    pub fn get(&self, tag: SourceTag) -> f64 {
        match tag {
            SourceTag::DataValues => self.data_values,
            SourceTag::Keyword => self.keyword,
            SourceTag::Semantic => self.semantic,
            SourceTag::Lexical => self.lexical,
        }
    }
}

/// Ranking knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankParams {
    pub top_k_per_source: usize,
    pub min_score: MinScores,
}

impl Default for RankParams {
    fn default() -> Self {
        Self {
            top_k_per_source: 3,
            min_score: MinScores::default(),
        }
    }
}

/// One source's independent ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedSource {
    pub source: SourceTag,
    /// Top-K hits above the source threshold.
    pub hits: Vec<Hit>,
    /// Top-K distinct tables above the source threshold.
    pub tables: Vec<TableScore>,
}

/// Per-source rankings plus every tagged candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankedSources {
    /// One entry per source, highest priority first.
    pub sources: Vec<RankedSource>,
    /// Every reported hit, tagged with its source, unthresholded. Column
    /// ranking restricts these to the selected tables.
    #[serde(skip)]
    pub candidates: Vec<Candidate>,
}

impl RankedSources {
    pub fn source(&self, tag: SourceTag) -> Option<&RankedSource> {
        self.sources.iter().find(|s| s.source == tag)
    }

    /// Per-source top-K table lists, in priority order.
    pub fn table_lists(&self) -> Vec<&[TableScore]> {
        self.sources.iter().map(|s| s.tables.as_slice()).collect()
    }
}

/// Rank every source independently. Pure function of its inputs.
pub fn rank_sources(hits: &SourceHits, params: &RankParams) -> RankedSources {
    let mut ranked = RankedSources::default();
    for tag in SourceTag::ALL {
        let min = params.min_score.get(tag);
        let passing: Vec<Hit> = hits
            .get(tag)
            .iter()
            .filter(|h| h.score >= min)
            .cloned()
            .collect();

        ranked.sources.push(RankedSource {
            source: tag,
            hits: rank(&passing, params.top_k_per_source),
            tables: top_tables(&passing, params.top_k_per_source),
        });
        ranked.candidates.extend(
            hits.get(tag)
                .iter()
                .filter(|h| h.score.is_finite())
                .map(|h| Candidate::from_hit(h, tag)),
        );
    }
    ranked
}
