// Candidate expansion: from an input verse to the seed tokens walked in
// reverse.
//
// Content words are the dictionary forms of the verse's nouns and
// adjectives. First- and second-person pronouns trade places so generated
// lines answer the speaker instead of echoing them, filler tokens are
// dropped, and the list is shuffled with the request's generator.
//
// Each content word then pulls in neighbors from the embedding space,
// nudged toward the theme word and re-ranked by how well they rhyme with
// the request's anchor phrase. The seed list is each word followed by its
// kept neighbors, in order, duplicates and all.
//
// The same content words drive the forward opening rule: the first line
// opening whose tokens contain a content word (or, failing that, one of the
// word's nearest neighbors) starts the forward walk.

use crate::chain::{ChainEntry, Transitions};
use crate::config::{GeneratorConfig, PronounSwap};
use crate::embedding::Embeddings;
use crate::error::GenerateError;
use crate::meter::RhymeDistanceMeter;
use rhymewalk_lang::Tagger;
use rhymewalk_prng::WalkRng;
use std::fmt;
use std::sync::Arc;

/// Where a seed came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOrigin {
    /// A content word of the input verse.
    Input,
    /// An embedding neighbor of the given content word.
    Neighbor { of: String },
}

impl fmt::Display for SeedOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedOrigin::Input => write!(f, "input"),
            SeedOrigin::Neighbor { of } => write!(f, "neighbor of {of}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSeed {
    pub token: String,
    pub origin: SeedOrigin,
}

pub struct CandidateExpander {
    tagger: Arc<dyn Tagger>,
    embeddings: Arc<dyn Embeddings>,
    theme_word: String,
    pool: usize,
    keep: usize,
    opening_neighbors: usize,
    filler_tokens: Vec<String>,
    pronoun_swaps: Vec<PronounSwap>,
}

impl CandidateExpander {
    pub fn new(
        tagger: Arc<dyn Tagger>,
        embeddings: Arc<dyn Embeddings>,
        config: &GeneratorConfig,
    ) -> Self {
        CandidateExpander {
            tagger,
            embeddings,
            theme_word: config.theme_word.clone(),
            pool: config.expansion_pool,
            keep: config.expansion_keep,
            opening_neighbors: config.opening_neighbors,
            filler_tokens: config.filler_tokens.clone(),
            pronoun_swaps: config.pronoun_swaps.clone(),
        }
    }

    /// Nouns and adjectives of `text` by dictionary form, pronouns swapped,
    /// fillers removed, in shuffled order.
    pub fn content_words(&self, text: &str, rng: &mut WalkRng) -> Vec<String> {
        let mut words: Vec<String> = self
            .tagger
            .tokenize(text)
            .into_iter()
            .filter(|t| t.pos.is_content())
            .map(|t| self.swap_pronouns(&t.base_form))
            .filter(|w| !w.is_empty() && !self.filler_tokens.contains(w))
            .collect();
        rng.shuffle(&mut words);
        tracing::debug!(?words, "content words");
        words
    }

    /// Replace the first pronoun found with its counterpart. Only one swap
    /// applies, so a word holding both forms is not swapped back.
    fn swap_pronouns(&self, word: &str) -> String {
        for swap in &self.pronoun_swaps {
            if word.contains(swap.first.as_str()) {
                return word.replace(swap.first.as_str(), &swap.second);
            }
            if word.contains(swap.second.as_str()) {
                return word.replace(swap.second.as_str(), &swap.first);
            }
        }
        word.to_string()
    }

    /// The ordered seed list for a reverse generation against `anchor`.
    pub fn expand(
        &self,
        text: &str,
        anchor: &str,
        meter: &RhymeDistanceMeter,
        rng: &mut WalkRng,
    ) -> Vec<CandidateSeed> {
        let mut seeds = Vec::new();
        for word in self.content_words(text, rng) {
            let neighbors = if self.embeddings.contains(&word) {
                let pool: Vec<String> = self
                    .embeddings
                    .most_similar(&[word.as_str(), self.theme_word.as_str()], self.pool)
                    .into_iter()
                    .map(|n| n.token)
                    .collect();
                meter
                    .most_rhyming(anchor, &pool, self.keep)
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            } else {
                Vec::new()
            };

            seeds.push(CandidateSeed {
                token: word.clone(),
                origin: SeedOrigin::Input,
            });
            seeds.extend(neighbors.into_iter().map(|token| CandidateSeed {
                token,
                origin: SeedOrigin::Neighbor { of: word.clone() },
            }));
        }
        tracing::debug!(
            seeds = ?seeds.iter().map(|s| s.token.as_str()).collect::<Vec<_>>(),
            "expanded candidate seeds"
        );
        seeds
    }

    /// Choose the opening entry of a forward walk among `openings` (the
    /// entries whose context1 is `BEGIN`).
    ///
    /// Tries each content word in order against every opening's context2 and
    /// next token, then each word's nearest neighbors, then falls back to a
    /// frequency-weighted pick.
    pub fn choose_opening(
        &self,
        words: &[String],
        openings: &Transitions,
        rng: &mut WalkRng,
    ) -> Result<ChainEntry, GenerateError> {
        for word in words {
            if let Some(entry) = find_containing(&openings.entries, word) {
                tracing::debug!(word = word.as_str(), "opening matched content word");
                return Ok(entry.clone());
            }
        }
        for word in words {
            for neighbor in self.embeddings.most_similar(&[word.as_str()], self.opening_neighbors) {
                if let Some(entry) = find_containing(&openings.entries, &neighbor.token) {
                    tracing::debug!(
                        word = word.as_str(),
                        neighbor = neighbor.token.as_str(),
                        "opening matched neighbor"
                    );
                    return Ok(entry.clone());
                }
            }
        }
        tracing::debug!("no opening matched, sampling by frequency");
        openings.sample(rng).cloned()
    }
}

fn find_containing<'e>(entries: &'e [ChainEntry], word: &str) -> Option<&'e ChainEntry> {
    entries
        .iter()
        .find(|e| e.context2.contains(word) || e.next.contains(word))
}
