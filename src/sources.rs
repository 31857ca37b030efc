//! Built-in search sources.
//!
//! Two [`SearchSource`] implementations ship with the binary:
//!
//! - [`KeywordSource`]: matches the catalog's keyword dictionary against
//!   the query text.
//! - [`HitsFileSource`]: replays pre-scored hits from a JSON file, one
//!   instance per source tag. This is how output from external embedding,
//!   n-gram or value-lookup services reaches the CLI.

use anyhow::{Context, Result};
use async_trait::async_trait;
use schema_harness_core::catalog::KeywordIndex;
use schema_harness_core::rank::{rank, Hit, SourceHits, SourceTag};
use schema_harness_core::search::SearchSource;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::catalog::Schema;
use crate::config::Config;

fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
}

/// Score one keyword against the lowercased query tokens.
///
/// The keyword's token sequence appearing contiguously in the query
/// scores 1.0; otherwise the score is the share of the keyword's tokens
/// present in the query. Matching is on whole tokens only, so `meter`
/// does not match `parameter`.
pub fn keyword_score(keyword: &str, query_tokens: &[&str]) -> f64 {
    let kw: Vec<&str> = tokens(keyword).collect();
    if kw.is_empty() {
        return 0.0;
    }
    if query_tokens.windows(kw.len()).any(|w| w == kw.as_slice()) {
        return 1.0;
    }
    let found = kw.iter().filter(|t| query_tokens.contains(*t)).count();
    found as f64 / kw.len() as f64
}

/// Dictionary lookup over the catalog keywords.
pub struct KeywordSource {
    index: KeywordIndex,
}

impl KeywordSource {
    pub fn new(index: KeywordIndex) -> Self {
        Self { index }
    }
}

#[async_trait]
impl SearchSource for KeywordSource {
    fn name(&self) -> &str {
        "keyword_dictionary"
    }

    fn tag(&self) -> SourceTag {
        SourceTag::Keyword
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Hit>> {
        let query = query.to_lowercase();
        let query_tokens: Vec<&str> = tokens(&query).collect();

        // best hit per (table, column)
        let mut best: Vec<Hit> = Vec::new();
        let mut index: HashMap<(&str, Option<&str>), usize> = HashMap::new();
        for entry in self.index.iter() {
            let score = keyword_score(entry.keyword, &query_tokens);
            if score <= 0.0 {
                continue;
            }
            let mut hit = Hit::new(entry.table, entry.column, score);
            hit.matched = Some(entry.keyword.to_string());
            match index.get(&(entry.table, entry.column)) {
                Some(&i) if best[i].score >= score => {}
                Some(&i) => best[i] = hit,
                None => {
                    index.insert((entry.table, entry.column), best.len());
                    best.push(hit);
                }
            }
        }
        Ok(rank(&best, limit))
    }
}

/// Pre-scored hits for one source tag, read from a hits file.
pub struct HitsFileSource {
    name: String,
    tag: SourceTag,
    hits: Arc<SourceHits>,
}

impl HitsFileSource {
    /// One source per tag, all sharing the parsed file.
    pub fn from_file(path: &Path) -> Result<Vec<Self>> {
        let hits = Arc::new(read_hits(path)?);
        Ok(SourceTag::ALL
            .iter()
            .map(|&tag| Self {
                name: format!("hits_file:{}", tag),
                tag,
                hits: hits.clone(),
            })
            .collect())
    }
}

#[async_trait]
impl SearchSource for HitsFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn tag(&self) -> SourceTag {
        self.tag
    }

    async fn search(&self, _query: &str, limit: usize) -> Result<Vec<Hit>> {
        Ok(rank(self.hits.get(self.tag), limit))
    }
}

pub fn read_hits(path: &Path) -> Result<SourceHits> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read hits file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse hits file: {}", path.display()))
}

/// Build the configured sources. `hits_override` replaces the configured
/// hits file.
pub fn build_sources(
    config: &Config,
    schema: &Schema,
    hits_override: Option<&Path>,
) -> Result<Vec<Box<dyn SearchSource>>> {
    let mut sources: Vec<Box<dyn SearchSource>> = Vec::new();

    if config.sources.keyword_dictionary {
        sources.push(Box::new(KeywordSource::new(
            schema.catalog.keywords().clone(),
        )));
    }

    if let Some(path) = hits_override.or(config.sources.hits_file.as_deref()) {
        for source in HitsFileSource::from_file(path)? {
            sources.push(Box::new(source));
        }
    }

    Ok(sources)
}

pub fn list_sources(config: &Config) -> Result<()> {
    let keyword_status = if config.sources.keyword_dictionary {
        "OK"
    } else {
        "DISABLED"
    };
    let hits_status = match &config.sources.hits_file {
        Some(path) if path.exists() => "OK",
        Some(_) => "NOT FOUND",
        None => "NOT CONFIGURED",
    };

    println!("{:<20} {:<12} {:<16} SOURCE", "NAME", "TAG", "STATUS");
    println!(
        "{:<20} {:<12} {:<16} catalog keywords",
        "keyword_dictionary",
        SourceTag::Keyword,
        keyword_status
    );
    let hits_origin = config
        .sources
        .hits_file
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "-".to_string());
    for tag in SourceTag::ALL {
        println!(
            "{:<20} {:<12} {:<16} {}",
            "hits_file", tag, hits_status, hits_origin
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema_harness_core::catalog::Catalog;
    use schema_harness_core::models::{Column, Table};

    fn keyword_index() -> KeywordIndex {
        let mut sayac = Table::new(
            "e_sayac",
            vec![Column::new("id", "bigint"), Column::new("seri_no", "varchar")],
        );
        sayac.keywords = vec!["sayaç".into(), "meter".into()];
        sayac.columns[1].keywords = vec!["seri numarası".into(), "serial number".into()];

        let mut il = Table::new("il", vec![Column::new("ad", "varchar")]);
        il.columns[0].keywords = vec!["şehir".into(), "city name".into()];

        Catalog::new(vec![sayac, il], None)
            .unwrap()
            .keywords()
            .clone()
    }

    #[test]
    fn keyword_score_prefers_whole_phrase() {
        let toks: Vec<&str> = tokens("meter serial number per city").collect();
        assert_eq!(keyword_score("serial number", &toks), 1.0);
        assert_eq!(keyword_score("city name", &toks), 0.5);
        // out of order: every token present, but not as a phrase
        assert_eq!(keyword_score("number serial", &toks), 1.0);
        assert_eq!(keyword_score("district", &toks), 0.0);
        assert_eq!(keyword_score("", &toks), 0.0);
    }

    #[test]
    fn keyword_score_matches_whole_tokens_only() {
        let toks: Vec<&str> = tokens("list every parameter that was updated").collect();
        assert_eq!(keyword_score("meter", &toks), 0.0);
        assert_eq!(keyword_score("date", &toks), 0.0);
        assert_eq!(keyword_score("param", &toks), 0.0);
        assert_eq!(keyword_score("parameter", &toks), 1.0);
    }

    #[tokio::test]
    async fn keyword_source_ignores_keywords_inside_other_words() {
        let mut profile = Table::new(
            "m_load_profile",
            vec![Column::new("load_profile_date", "timestamp")],
        );
        profile.columns[0].keywords = vec!["date".into()];
        let mut sayac = Table::new("e_sayac", vec![Column::new("id", "bigint")]);
        sayac.keywords = vec!["meter".into()];
        let index = Catalog::new(vec![profile, sayac], None)
            .unwrap()
            .keywords()
            .clone();

        let source = KeywordSource::new(index);
        let hits = source
            .search("List every parameter that was updated", 10)
            .await
            .unwrap();
        assert!(hits.is_empty(), "unexpected hits: {:?}", hits);

        let hits = source.search("meter readings by date", 10).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn keyword_source_finds_table_and_column_hits() {
        let source = KeywordSource::new(keyword_index());
        let hits = source
            .search("Ankara şehir için sayaç seri numarası", 10)
            .await
            .unwrap();

        let found: Vec<(&str, Option<&str>, f64)> = hits
            .iter()
            .map(|h| (h.table.as_str(), h.column.as_deref(), h.score))
            .collect();
        assert!(found.contains(&("e_sayac", None, 1.0)));
        assert!(found.contains(&("e_sayac", Some("seri_no"), 1.0)));
        assert!(found.contains(&("il", Some("ad"), 1.0)));
        assert!(hits.iter().all(|h| h.matched.is_some()));
    }

    #[tokio::test]
    async fn keyword_source_keeps_best_per_column_and_respects_limit() {
        let source = KeywordSource::new(keyword_index());
        let hits = source.search("serial number of meter", 10).await.unwrap();
        let seri: Vec<&Hit> = hits
            .iter()
            .filter(|h| h.column.as_deref() == Some("seri_no"))
            .collect();
        assert_eq!(seri.len(), 1);
        assert_eq!(seri[0].matched.as_deref(), Some("serial number"));

        assert_eq!(source.search("serial number of meter", 1).await.unwrap().len(), 1);
        assert!(source.search("nothing relevant", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn hits_file_sources_split_by_tag() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("hits.json");
        std::fs::write(
            &path,
            r#"{
                "semantic": [
                    {"table": "a", "column": "x", "score": 0.2},
                    {"table": "b", "column": "y", "similarity": 0.9}
                ],
                "data_values": [{"table": "il", "column": "ad", "score": 0.6, "value_text": "Ankara"}]
            }"#,
        )
        .unwrap();

        let sources = HitsFileSource::from_file(&path).unwrap();
        assert_eq!(sources.len(), 4);

        let semantic = sources.iter().find(|s| s.tag() == SourceTag::Semantic).unwrap();
        let hits = semantic.search("ignored", 10).await.unwrap();
        assert_eq!(hits[0].table, "b");
        assert_eq!(hits.len(), 2);

        let values = sources.iter().find(|s| s.tag() == SourceTag::DataValues).unwrap();
        let hits = values.search("ignored", 10).await.unwrap();
        assert_eq!(hits[0].matched.as_deref(), Some("Ankara"));

        let lexical = sources.iter().find(|s| s.tag() == SourceTag::Lexical).unwrap();
        assert!(lexical.search("ignored", 10).await.unwrap().is_empty());
    }

    #[test]
    fn unreadable_hits_file_is_an_error() {
        let err = read_hits(Path::new("/nonexistent/hits.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read hits file"));
    }
}
