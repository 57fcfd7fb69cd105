// Morphological tagging: the `Tagger` seam and a lexicon-backed implementation.
//
// The generator only needs three things from a tagger: segmentation with
// IPADIC-style features (`analyze`), parsed tokens with malformed morphemes
// skipped (`tokenize`), and the spoken form of a line for romanization
// (`reading`). Any analyzer that can emit `Morpheme`s plugs in here; the
// bundled `LexiconTagger` does greedy longest-match against a JSON lexicon.
//
// Taggers are built once at startup and shared read-only across requests
// (and across threads when reverse walks run in parallel), hence the
// `Send + Sync` bound.

use crate::types::{Morpheme, Token};
use std::collections::BTreeMap;

/// Feature string assigned to an alphanumeric run missing from the lexicon.
/// Mirrors how IPADIC analyzers treat unknown words: nouns with no base form.
pub const UNKNOWN_WORD_FEATURE: &str = "名詞,一般,*,*,*,*,*";

/// Segments text into morphemes.
pub trait Tagger: Send + Sync {
    fn analyze(&self, text: &str) -> Vec<Morpheme>;

    /// Parse every morpheme, skipping ones with unusable features.
    fn tokenize(&self, text: &str) -> Vec<Token> {
        self.analyze(text)
            .iter()
            .filter_map(|m| match Token::from_morpheme(m) {
                Ok(token) => Some(token),
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unparseable morpheme");
                    None
                }
            })
            .collect()
    }

    /// The line as spoken: readings where known, surfaces elsewhere.
    fn reading(&self, text: &str) -> String {
        self.tokenize(text).iter().map(Token::spoken).collect()
    }
}

/// The top-level JSON structure for a lexicon file.
#[derive(Debug, serde::Deserialize)]
struct LexiconFile {
    entries: Vec<Morpheme>,
}

/// Greedy longest-match tagger over a fixed lexicon.
#[derive(Debug, Clone, Default)]
pub struct LexiconTagger {
    entries: BTreeMap<String, String>,
    max_surface_chars: usize,
}

impl LexiconTagger {
    /// Parse a lexicon from a JSON string of `{"entries": [{surface, feature}]}`.
    ///
    /// When a surface appears more than once the first entry wins.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let file: LexiconFile = serde_json::from_str(json)?;
        Ok(Self::from_morphemes(file.entries))
    }

    pub fn from_morphemes<I: IntoIterator<Item = Morpheme>>(morphemes: I) -> Self {
        let mut tagger = LexiconTagger::default();
        for m in morphemes {
            let len = m.surface.chars().count();
            if len == 0 {
                continue;
            }
            tagger.max_surface_chars = tagger.max_surface_chars.max(len);
            tagger.entries.entry(m.surface).or_insert(m.feature);
        }
        tagger
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Tagger for LexiconTagger {
    fn analyze(&self, text: &str) -> Vec<Morpheme> {
        let chars: Vec<char> = fold_width(text).chars().collect();
        let mut out = Vec::new();
        let mut unknown = String::new();
        let mut i = 0;

        while i < chars.len() {
            let longest = self.max_surface_chars.min(chars.len() - i);
            let matched = (1..=longest).rev().find_map(|len| {
                let key: String = chars[i..i + len].iter().collect();
                self.entries.get(&key).map(|feature| (len, key, feature))
            });

            if let Some((len, surface, feature)) = matched {
                flush_unknown(&mut unknown, &mut out);
                out.push(Morpheme {
                    surface,
                    feature: feature.clone(),
                });
                i += len;
                continue;
            }

            let c = chars[i];
            i += 1;
            if c.is_alphanumeric() {
                unknown.push(c);
                continue;
            }
            flush_unknown(&mut unknown, &mut out);
            if !c.is_whitespace() {
                out.push(Morpheme {
                    surface: c.to_string(),
                    feature: format!("記号,一般,*,*,*,*,{c}"),
                });
            }
        }
        flush_unknown(&mut unknown, &mut out);
        out
    }
}

fn flush_unknown(unknown: &mut String, out: &mut Vec<Morpheme>) {
    if unknown.is_empty() {
        return;
    }
    out.push(Morpheme {
        surface: std::mem::take(unknown),
        feature: UNKNOWN_WORD_FEATURE.to_string(),
    });
}

/// Fold full-width ASCII variants to ASCII and the ideographic space to a
/// plain space, the part of compatibility normalization the lexicon needs.
pub fn fold_width(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{3000}' => ' ',
            '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
            _ => c,
        })
        .collect()
}
