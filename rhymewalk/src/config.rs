// Data-driven generator configuration.
//
// Every tunable of the generator lives in `GeneratorConfig`, loaded from
// JSON at startup. Fields are `#[serde(default)]` so a config file only
// needs the values it changes. Defaults reproduce the reference behavior:
// 20 embedding neighbors per content word, the 3 best-rhyming kept, and a
// baseball theme word.
//
// `DataPaths` points at the JSON resources the binary loads once before
// serving requests. The library never reads these paths itself; callers
// construct the collaborators and hand them to `VerseGenerator`.

use crate::error::{LoadError, read_json};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A first-person / second-person pronoun pair swapped during expansion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PronounSwap {
    pub first: String,
    pub second: String,
}

/// Baseline scores subtracted by the similarity scorer before rescaling.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Baseline {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl Default for Baseline {
    fn default() -> Self {
        Baseline {
            precision: 0.3,
            recall: 0.3,
            f1: 0.3,
        }
    }
}

/// Locations of the startup data files.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    pub chain_table: PathBuf,
    pub anchor_phrases: PathBuf,
    pub lexicon: PathBuf,
    pub vectors: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        DataPaths {
            chain_table: PathBuf::from("data/chain_table.json"),
            anchor_phrases: PathBuf::from("data/anchor_phrases.json"),
            lexicon: PathBuf::from("data/lexicon.json"),
            vectors: PathBuf::from("data/vectors.json"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Thematic anchor word. Expansion neighbors lean toward it and the
    /// distance meter rewards nouns that resonate with it.
    pub theme_word: String,
    /// Nearest neighbors fetched per content word during expansion.
    pub expansion_pool: usize,
    /// Best-rhyming neighbors kept per content word.
    pub expansion_keep: usize,
    /// Neighbors tried per content word when choosing a forward opening.
    pub opening_neighbors: usize,
    /// Upper bound on steps in any single walk.
    pub max_walk_steps: usize,
    /// Tokens dropped from the content word list.
    pub filler_tokens: Vec<String>,
    pub pronoun_swaps: Vec<PronounSwap>,
    /// Run per-seed reverse walks on the rayon pool.
    pub parallel: bool,
    /// Per-request deadline. `None` disables the check.
    pub request_timeout_ms: Option<u64>,
    pub baseline: Baseline,
    pub data: DataPaths,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            theme_word: "野球".to_string(),
            expansion_pool: 20,
            expansion_keep: 3,
            opening_neighbors: 20,
            max_walk_steps: 256,
            filler_tokens: vec!["ん".to_string()],
            pronoun_swaps: vec![PronounSwap {
                first: "俺".to_string(),
                second: "おまえ".to_string(),
            }],
            parallel: false,
            request_timeout_ms: None,
            baseline: Baseline::default(),
            data: DataPaths::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let config: GeneratorConfig = read_json(path)?;
        config.validate().map_err(|reason| LoadError::Invalid {
            path: path.to_path_buf(),
            reason,
        })?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if self.theme_word.is_empty() {
            return Err("theme_word must not be empty".to_string());
        }
        if self.max_walk_steps == 0 {
            return Err("max_walk_steps must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: GeneratorConfig =
            serde_json::from_str(r#"{"theme_word": "海", "parallel": true}"#).unwrap();
        assert_eq!(config.theme_word, "海");
        assert!(config.parallel);
        assert_eq!(config.expansion_pool, 20);
        assert_eq!(config.expansion_keep, 3);
        assert_eq!(config.filler_tokens, vec!["ん".to_string()]);
        assert_eq!(config.data, DataPaths::default());
    }

    #[test]
    fn test_nested_partial_baseline() {
        let config: GeneratorConfig =
            serde_json::from_str(r#"{"baseline": {"f1": 0.5}}"#).unwrap();
        assert_eq!(config.baseline.f1, 0.5);
        assert_eq!(config.baseline.precision, 0.3);
    }

    #[test]
    fn test_validation() {
        let mut config = GeneratorConfig::default();
        assert!(config.validate().is_ok());
        config.max_walk_steps = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_request_timeout() {
        let mut config = GeneratorConfig::default();
        assert_eq!(config.request_timeout(), None);
        config.request_timeout_ms = Some(250);
        assert_eq!(config.request_timeout(), Some(Duration::from_millis(250)));
    }
}
