// The rhyme distance meter: one number for "how good a rhyme is this".
//
// `throw(s1, s2)` combines four measurements of a line pair:
// - rhyme count: tail vowel matches, falling back to head matches
// - self similarity: semantic F1 between the two lines
// - anchor similarity: the best F1 between any noun of either line and the
//   theme word (the theme word itself does not count as a noun here)
// - length ratio: shorter length over longer length
//
// and folds them into
//
//   distance = floor(count ^ ((1 - self) * (anchor * 10) * (1 + ratio)))
//
// High rhyme counts win exponentially; the exponent grows when the lines
// say different things and when they touch the theme. A count of zero is
// always distance zero. Overflowing exponents saturate at `u64::MAX`.
//
// Pronunciation comes from the tagger's readings, so kanji lines are
// compared by how they sound.

use crate::error::GenerateError;
use crate::similarity::SimilarityScorer;
use rhymewalk_lang::{PartOfSpeech, PhoneticTable, Tagger, rhyme};
use std::sync::Arc;

/// Every input of a distance, kept for logging and the `measure` command.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Measurement {
    pub rhyme_count: usize,
    pub self_similarity: f64,
    pub anchor_similarity: f64,
    pub length_ratio: f64,
    pub distance: u64,
}

pub struct RhymeDistanceMeter {
    table: PhoneticTable,
    tagger: Arc<dyn Tagger>,
    scorer: Arc<dyn SimilarityScorer>,
    theme_word: String,
}

impl RhymeDistanceMeter {
    pub fn new(
        table: PhoneticTable,
        tagger: Arc<dyn Tagger>,
        scorer: Arc<dyn SimilarityScorer>,
        theme_word: impl Into<String>,
    ) -> Self {
        RhymeDistanceMeter {
            table,
            tagger,
            scorer,
            theme_word: theme_word.into(),
        }
    }

    /// Vowel sequence of a line as spoken.
    pub fn vowels(&self, text: &str) -> Vec<char> {
        self.table.vowels(&self.tagger.reading(text))
    }

    pub fn count_rhyme(&self, s1: &str, s2: &str) -> usize {
        rhyme::count_rhyme(&self.vowels(s1), &self.vowels(s2))
    }

    /// Candidates ranked by rhyme count against `anchor`, stable on ties.
    pub fn most_rhyming<'c>(
        &self,
        anchor: &str,
        candidates: &'c [String],
        top_n: usize,
    ) -> Vec<&'c str> {
        let anchor = self.vowels(anchor);
        let ranked = rhyme::most_rhyming(&anchor, candidates, top_n, |c| self.vowels(c));
        tracing::trace!(?ranked, "rhyme ranking");
        ranked
    }

    pub fn length_ratio(&self, s1: &str, s2: &str) -> f64 {
        rhyme::length_ratio(s1, s2)
    }

    /// `(self_similarity, anchor_similarity)` in one scorer batch. Anchor
    /// similarity is 0.0 when neither line has a noun besides the theme word.
    pub fn score_similarity(&self, s1: &str, s2: &str) -> Result<(f64, f64), GenerateError> {
        let nouns: Vec<String> = [s1, s2]
            .iter()
            .flat_map(|line| self.tagger.tokenize(line))
            .filter(|t| t.pos == PartOfSpeech::Noun && t.surface != self.theme_word)
            .map(|t| t.surface)
            .collect();

        let mut references = vec![s1.to_string()];
        let mut hypotheses = vec![s2.to_string()];
        for noun in &nouns {
            references.push(self.theme_word.clone());
            hypotheses.push(noun.clone());
        }

        let scores = self.scorer.score(&references, &hypotheses)?;
        let Some((self_similarity, noun_scores)) = scores.f1.split_first() else {
            return Err(GenerateError::Scorer(format!(
                "expected {} scores, got none",
                references.len()
            )));
        };
        let anchor_similarity = noun_scores.iter().copied().reduce(f64::max).unwrap_or(0.0);
        tracing::trace!(?nouns, self_similarity, anchor_similarity, "similarity");
        Ok((*self_similarity, anchor_similarity))
    }

    /// All four measurements and the resulting distance.
    pub fn measure(&self, s1: &str, s2: &str) -> Result<Measurement, GenerateError> {
        let rhyme_count = self.count_rhyme(s1, s2);
        let (self_similarity, anchor_similarity) = self.score_similarity(s1, s2)?;
        let length_ratio = self.length_ratio(s1, s2);
        Ok(Measurement {
            rhyme_count,
            self_similarity,
            anchor_similarity,
            length_ratio,
            distance: distance(rhyme_count, self_similarity, anchor_similarity, length_ratio),
        })
    }

    pub fn throw(&self, s1: &str, s2: &str) -> Result<u64, GenerateError> {
        let m = self.measure(s1, s2)?;
        tracing::debug!(
            rhyme_count = m.rhyme_count,
            self_similarity = m.self_similarity,
            anchor_similarity = m.anchor_similarity,
            length_ratio = m.length_ratio,
            distance = m.distance,
            "measured rhyme distance"
        );
        Ok(m.distance)
    }
}

/// `floor(count ^ ((1 - self_sim) * (anchor_sim * 10) * (1 + len_ratio)))`,
/// with `count == 0` mapping to 0.
pub fn distance(count: usize, self_sim: f64, anchor_sim: f64, len_ratio: f64) -> u64 {
    if count == 0 {
        return 0;
    }
    let exponent = (1.0 - self_sim) * (anchor_sim * 10.0) * (1.0 + len_ratio);
    let value = (count as f64).powf(exponent).floor();
    if value.is_nan() {
        return 0;
    }
    // `as` saturates out-of-range floats.
    value as u64
}
