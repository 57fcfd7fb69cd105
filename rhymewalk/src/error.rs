// Error types for generation, input validation, and data loading.
//
// `GenerateError` splits into two tiers that the orchestrator treats very
// differently:
// - candidate-local (`EmptyChainResult`, `GenerationStalled`): one seed's
//   walk failed; the seed is skipped and the request continues.
// - request-fatal (everything else): surfaced to the caller immediately.
//   `DeadlineExceeded` is the one fatal error worth retrying.
//
// `LoadError` covers the JSON data files read at startup (chain table,
// anchor phrases, lexicon, word vectors, config).

use crate::chain::ChainQuery;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("chain store {path} is unavailable: {reason}")]
    MissingChainStore { path: PathBuf, reason: String },

    #[error("no chain entries for {0}")]
    EmptyChainResult(ChainQuery),

    #[error("walk from {seed:?} did not reach a line boundary within {max_steps} steps")]
    GenerationStalled { seed: String, max_steps: usize },

    #[error("all {attempted} candidate seeds failed")]
    AllCandidatesFailed { attempted: usize },

    #[error("request exceeded its {0:?} deadline")]
    DeadlineExceeded(Duration),

    #[error("anchor phrase corpus is empty")]
    NoAnchorPhrases,

    #[error("similarity scorer failed: {0}")]
    Scorer(String),

    #[error(transparent)]
    Input(#[from] InputError),
}

impl GenerateError {
    /// Errors that abandon one candidate but not the request.
    pub fn is_candidate_local(&self) -> bool {
        matches!(
            self,
            GenerateError::EmptyChainResult(_) | GenerateError::GenerationStalled { .. }
        )
    }

    /// Errors a caller may reasonably retry unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GenerateError::DeadlineExceeded(_))
    }
}

/// Malformed caller input. Never defaulted or silently ignored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("request has no verse field")]
    MissingVerse,

    #[error("verse is empty")]
    EmptyVerse,

    #[error("expected exactly {expected} non-empty lines, found {found}")]
    SegmentCount { expected: usize, found: usize },

    #[error("{references} references but {hypotheses} hypotheses")]
    LengthMismatch { references: usize, hypotheses: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid data in {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

/// Read and deserialize a JSON file.
pub(crate) fn read_json<T: serde::de::DeserializeOwned>(
    path: &std::path::Path,
) -> Result<T, LoadError> {
    let data = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}
