//! TOML configuration.
//!
//! Every section except `[catalog]` is optional; missing keys fall back to
//! the defaults below. [`load_config`] parses and validates in one step.

use anyhow::{Context, Result};
use schema_harness_core::graph::EdgePolicy;
use schema_harness_core::plan::PlanParams;
use schema_harness_core::rank::{MinScores, RankParams, SourceTag};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// Catalog JSON file. Relative paths resolve against the config file.
    pub path: PathBuf,
    /// Schema prefixed to bare table names.
    #[serde(default)]
    pub default_schema: Option<String>,
    #[serde(default)]
    pub on_invalid_edge: EdgePolicy,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k_per_source")]
    pub top_k_per_source: usize,
    #[serde(default = "default_top_n_columns")]
    pub top_n_columns: usize,
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
    #[serde(default)]
    pub min_score: MinScores,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k_per_source: default_top_k_per_source(),
            top_n_columns: default_top_n_columns(),
            search_limit: default_search_limit(),
            min_score: MinScores::default(),
        }
    }
}

fn default_top_k_per_source() -> usize {
    3
}
fn default_top_n_columns() -> usize {
    7
}
fn default_search_limit() -> usize {
    20
}

#[derive(Debug, Deserialize, Clone)]
pub struct PathsConfig {
    #[serde(default = "default_max_hops")]
    pub max_hops: usize,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            max_hops: default_max_hops(),
        }
    }
}

fn default_max_hops() -> usize {
    2
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourcesConfig {
    /// Match catalog keywords against the query.
    #[serde(default = "default_keyword_dictionary")]
    pub keyword_dictionary: bool,
    /// Pre-scored hits from external collaborators.
    #[serde(default)]
    pub hits_file: Option<PathBuf>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            keyword_dictionary: default_keyword_dictionary(),
            hits_file: None,
        }
    }
}

fn default_keyword_dictionary() -> bool {
    true
}

impl Config {
    pub fn plan_params(&self) -> PlanParams {
        PlanParams {
            max_hops: self.paths.max_hops,
            top_n_columns: self.retrieval.top_n_columns,
            rank: RankParams {
                top_k_per_source: self.retrieval.top_k_per_source,
                min_score: self.retrieval.min_score,
            },
        }
    }
}

fn resolve(base: Option<&Path>, path: &mut PathBuf) {
    if let Some(base) = base {
        if path.is_relative() {
            *path = base.join(&*path);
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    let base = path.parent().filter(|p| !p.as_os_str().is_empty());
    resolve(base, &mut config.catalog.path);
    if let Some(hits) = config.sources.hits_file.as_mut() {
        resolve(base, hits);
    }

    if config.paths.max_hops < 1 {
        anyhow::bail!("paths.max_hops must be >= 1");
    }
    if config.retrieval.top_k_per_source < 1 {
        anyhow::bail!("retrieval.top_k_per_source must be >= 1");
    }
    if config.retrieval.top_n_columns < 1 {
        anyhow::bail!("retrieval.top_n_columns must be >= 1");
    }
    if config.retrieval.search_limit < 1 {
        anyhow::bail!("retrieval.search_limit must be >= 1");
    }

    for tag in SourceTag::ALL {
        let min = config.retrieval.min_score.get(tag);
        if !(0.0..=1.0).contains(&min) {
            anyhow::bail!("retrieval.min_score.{} must be in [0.0, 1.0]", tag);
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("schx.toml");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "[catalog]\npath = \"catalog.json\"\n");
        let cfg = load_config(&path).unwrap();

        assert_eq!(cfg.catalog.path, tmp.path().join("catalog.json"));
        assert_eq!(cfg.catalog.on_invalid_edge, EdgePolicy::Error);
        assert_eq!(cfg.paths.max_hops, 2);
        assert_eq!(cfg.retrieval.top_k_per_source, 3);
        assert_eq!(cfg.retrieval.top_n_columns, 7);
        assert_eq!(cfg.retrieval.min_score, MinScores::default());
        assert!(cfg.sources.keyword_dictionary);
        assert!(cfg.sources.hits_file.is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            &tmp,
            r#"
[catalog]
path = "/abs/catalog.json"
default_schema = "public"
on_invalid_edge = "skip"

[retrieval]
top_k_per_source = 5

[retrieval.min_score]
semantic = 0.7

[paths]
max_hops = 3

[sources]
keyword_dictionary = false
hits_file = "hits.json"
"#,
        );
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.catalog.path, PathBuf::from("/abs/catalog.json"));
        assert_eq!(cfg.catalog.default_schema.as_deref(), Some("public"));
        assert_eq!(cfg.catalog.on_invalid_edge, EdgePolicy::Skip);
        assert_eq!(cfg.retrieval.min_score.semantic, 0.7);
        assert_eq!(cfg.retrieval.min_score.lexical, 0.4);
        assert_eq!(cfg.sources.hits_file, Some(tmp.path().join("hits.json")));

        let params = cfg.plan_params();
        assert_eq!(params.max_hops, 3);
        assert_eq!(params.rank.top_k_per_source, 5);
    }

    #[test]
    fn rejects_invalid_values() {
        let tmp = TempDir::new().unwrap();
        for (body, msg) in [
            ("[paths]\nmax_hops = 0", "max_hops"),
            ("[retrieval]\ntop_k_per_source = 0", "top_k_per_source"),
            ("[retrieval]\ntop_n_columns = 0", "top_n_columns"),
            ("[retrieval.min_score]\nkeyword = 1.5", "min_score.keyword"),
        ] {
            let path = write(&tmp, &format!("[catalog]\npath = \"c.json\"\n{}\n", body));
            let err = load_config(&path).unwrap_err().to_string();
            assert!(err.contains(msg), "{} not in {}", msg, err);
        }
    }

    #[test]
    fn missing_catalog_section_fails() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "[paths]\nmax_hops = 2\n");
        assert!(load_config(&path).is_err());
    }
}
