// Core morphological types: parts of speech, raw morphemes, and parsed tokens.
//
// A `Tagger` (see `tagger.rs`) segments text into `Morpheme`s, each carrying
// its surface and a comma-separated feature string in IPADIC layout:
//
//   pos,sub1,sub2,sub3,conj_type,conj_form,base_form,reading,pronunciation
//
// `Token::from_morpheme` turns that loosely-typed record into a `Token`
// with a typed part of speech, base form, and optional reading. A feature
// string too short to carry a base form is a `RecoverableTokenError`; callers
// skip the token and keep going.

use serde::{Deserialize, Serialize};

/// Index of the base (dictionary) form within an IPADIC feature string.
pub const BASE_FORM_FIELD: usize = 6;
/// Index of the katakana reading within an IPADIC feature string.
pub const READING_FIELD: usize = 7;
/// Placeholder IPADIC uses for "no value".
pub const UNSET_FIELD: &str = "*";

/// Coarse part of speech, decoded from the first feature field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Particle,
    Symbol,
    Other,
}

impl PartOfSpeech {
    /// Decode an IPADIC top-level tag.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "名詞" => PartOfSpeech::Noun,
            "動詞" => PartOfSpeech::Verb,
            "形容詞" => PartOfSpeech::Adjective,
            "助詞" | "助動詞" => PartOfSpeech::Particle,
            "記号" => PartOfSpeech::Symbol,
            _ => PartOfSpeech::Other,
        }
    }

    /// Content words seed generation: nouns and adjectives.
    pub fn is_content(self) -> bool {
        matches!(self, PartOfSpeech::Noun | PartOfSpeech::Adjective)
    }
}

/// One segment as produced by a tagger, before feature parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Morpheme {
    pub surface: String,
    pub feature: String,
}

/// A parsed morpheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub surface: String,
    pub pos: PartOfSpeech,
    /// Dictionary form. Falls back to the surface when the tagger leaves it unset.
    pub base_form: String,
    /// Katakana reading, if the tagger knows one.
    pub reading: Option<String>,
}

/// A morpheme whose features could not be parsed. The token is skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecoverableTokenError {
    #[error("morpheme has an empty surface (feature {feature:?})")]
    EmptySurface { feature: String },
    #[error("morpheme {surface:?} has {found} feature fields, need at least {needed}")]
    MissingFields {
        surface: String,
        found: usize,
        needed: usize,
    },
}

impl Token {
    /// Parse a morpheme's IPADIC feature string.
    pub fn from_morpheme(morpheme: &Morpheme) -> Result<Token, RecoverableTokenError> {
        if morpheme.surface.is_empty() {
            return Err(RecoverableTokenError::EmptySurface {
                feature: morpheme.feature.clone(),
            });
        }

        let fields: Vec<&str> = morpheme.feature.split(',').collect();
        if fields.len() <= BASE_FORM_FIELD {
            return Err(RecoverableTokenError::MissingFields {
                surface: morpheme.surface.clone(),
                found: fields.len(),
                needed: BASE_FORM_FIELD + 1,
            });
        }

        let base_form = match fields[BASE_FORM_FIELD] {
            UNSET_FIELD | "" => morpheme.surface.clone(),
            base => base.to_string(),
        };
        let reading = fields
            .get(READING_FIELD)
            .filter(|r| **r != UNSET_FIELD && !r.is_empty())
            .map(|r| r.to_string());

        Ok(Token {
            surface: morpheme.surface.clone(),
            pos: PartOfSpeech::from_tag(fields[0]),
            base_form,
            reading,
        })
    }

    /// The text to romanize: the reading when known, else the surface.
    pub fn spoken(&self) -> &str {
        self.reading.as_deref().unwrap_or(&self.surface)
    }
}
