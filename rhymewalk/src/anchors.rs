// The anchor phrase corpus: the closing lines a generated verse answers.
//
// Loaded once at startup from a JSON array of strings. Blank entries are
// dropped; a corpus with nothing left is rejected at load time so the
// per-request draw never has to handle an empty list.

use crate::error::{GenerateError, LoadError, read_json};
use rhymewalk_prng::WalkRng;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct AnchorPhrases {
    phrases: Vec<String>,
}

impl AnchorPhrases {
    pub fn new(phrases: Vec<String>) -> Result<Self, GenerateError> {
        let phrases: Vec<String> = phrases
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        if phrases.is_empty() {
            return Err(GenerateError::NoAnchorPhrases);
        }
        Ok(AnchorPhrases { phrases })
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let phrases: Vec<String> = read_json(path)?;
        AnchorPhrases::new(phrases).map_err(|err| LoadError::Invalid {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }

    /// Draw one phrase uniformly at random.
    pub fn choose(&self, rng: &mut WalkRng) -> &str {
        // Never empty after `new`.
        rng.choose(&self.phrases).map_or("", String::as_str)
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}
