// Request and response types at the generation boundary.

use crate::error::InputError;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Walk backward from many seeds and keep the best rhyme with an anchor.
    #[default]
    Reverse,
    /// Walk one line forward from an opening chosen by content words.
    Forward,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Absent when a caller omitted the field; rejected by `validate`.
    #[serde(default)]
    pub verse: Option<String>,
    #[serde(default)]
    pub mode: Mode,
}

impl GenerateRequest {
    pub fn new(verse: impl Into<String>, mode: Mode) -> Self {
        GenerateRequest {
            verse: Some(verse.into()),
            mode,
        }
    }

    /// The verse text, if present and not blank.
    pub fn validate(&self) -> Result<&str, InputError> {
        let verse = self.verse.as_deref().ok_or(InputError::MissingVerse)?;
        if verse.trim().is_empty() {
            return Err(InputError::EmptyVerse);
        }
        Ok(verse)
    }
}

/// One walked line and its distance to the anchor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GeneratedCandidate {
    pub seed: String,
    pub text: String,
    pub distance: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GeneratedVerse {
    /// Reverse mode: the winning line, a line break, then the anchor phrase.
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    /// Every line that was walked and scored, in seed order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<GeneratedCandidate>,
}

/// Split a two-line text into its two non-empty lines. Anything other than
/// exactly two is an error; blank lines do not count.
pub fn split_pair(text: &str) -> Result<(&str, &str), InputError> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    match lines.as_slice() {
        [first, second] => Ok((*first, *second)),
        _ => Err(InputError::SegmentCount {
            expected: 2,
            found: lines.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_and_blank_verse() {
        let missing: GenerateRequest = serde_json::from_str(r#"{"mode": "reverse"}"#).unwrap();
        assert_eq!(missing.validate(), Err(InputError::MissingVerse));
        let blank = GenerateRequest::new("  \n", Mode::Reverse);
        assert_eq!(blank.validate(), Err(InputError::EmptyVerse));
    }

    #[test]
    fn test_request_defaults_to_reverse() {
        let req: GenerateRequest = serde_json::from_str(r#"{"verse": "夢"}"#).unwrap();
        assert_eq!(req.mode, Mode::Reverse);
        assert_eq!(req.validate(), Ok("夢"));
        let fwd: GenerateRequest =
            serde_json::from_str(r#"{"verse": "夢", "mode": "forward"}"#).unwrap();
        assert_eq!(fwd.mode, Mode::Forward);
    }

    #[test]
    fn test_split_pair() {
        assert_eq!(split_pair("夏の空\n空の花"), Ok(("夏の空", "空の花")));
        assert_eq!(split_pair("\n 夏の空 \r\n\n空の花\n"), Ok(("夏の空", "空の花")));
        assert_eq!(
            split_pair("一行だけ"),
            Err(InputError::SegmentCount {
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            split_pair("一\n二\n三"),
            Err(InputError::SegmentCount {
                expected: 2,
                found: 3
            })
        );
    }

    #[test]
    fn test_forward_verse_serializes_text_only() {
        let verse = GeneratedVerse {
            text: "ab".to_string(),
            distance: None,
            anchor: None,
            candidates: Vec::new(),
        };
        assert_eq!(serde_json::to_string(&verse).unwrap(), r#"{"text":"ab"}"#);
    }
}
