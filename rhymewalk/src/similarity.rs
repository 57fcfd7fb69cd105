// Pairwise semantic similarity.
//
// `SimilarityScorer` is the batch interface the distance meter needs:
// given aligned reference and hypothesis texts, return precision, recall
// and F1 per pair. `EmbeddingScorer` implements it with greedy token
// matching over word vectors:
//
//   precision = mean over hypothesis tokens of the best cosine to any reference token
//   recall    = mean over reference tokens of the best cosine to any hypothesis token
//   f1        = 2PR / (P + R)
//
// Each score is then rescaled against a baseline, `(x - b) / (1 - b)`, so
// that unrelated text lands near zero instead of at the raw cosine floor
// of the vector space. Rescaled scores can go negative.

use crate::config::Baseline;
use crate::embedding::{Embeddings, cosine_similarity};
use crate::error::{GenerateError, InputError};
use rhymewalk_lang::Tagger;
use std::sync::Arc;

/// Per-pair scores, index-aligned with the inputs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimilarityScores {
    pub precision: Vec<f64>,
    pub recall: Vec<f64>,
    pub f1: Vec<f64>,
}

pub trait SimilarityScorer: Send + Sync {
    /// Score each `(references[i], hypotheses[i])` pair. The slices must
    /// have equal length.
    fn score(
        &self,
        references: &[String],
        hypotheses: &[String],
    ) -> Result<SimilarityScores, GenerateError>;
}

pub struct EmbeddingScorer {
    embeddings: Arc<dyn Embeddings>,
    tagger: Arc<dyn Tagger>,
    baseline: Baseline,
}

impl EmbeddingScorer {
    pub fn new(
        embeddings: Arc<dyn Embeddings>,
        tagger: Arc<dyn Tagger>,
        baseline: Baseline,
    ) -> Self {
        EmbeddingScorer {
            embeddings,
            tagger,
            baseline,
        }
    }

    /// Vectors of the in-vocabulary tokens of `text`, by dictionary form.
    fn token_vectors(&self, text: &str) -> Vec<&[f32]> {
        self.tagger
            .tokenize(text)
            .iter()
            .filter_map(|t| {
                self.embeddings
                    .vector(&t.base_form)
                    .or_else(|| self.embeddings.vector(&t.surface))
            })
            .collect()
    }

    /// Raw (precision, recall, f1) for one pair, before rescaling.
    fn raw_pair(&self, reference: &str, hypothesis: &str) -> (f64, f64, f64) {
        let refs = self.token_vectors(reference);
        let hyps = self.token_vectors(hypothesis);
        if refs.is_empty() || hyps.is_empty() {
            return (0.0, 0.0, 0.0);
        }
        let precision = greedy_match(&hyps, &refs);
        let recall = greedy_match(&refs, &hyps);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        (precision, recall, f1)
    }
}

/// Mean over `from` of the best cosine similarity to any vector in `to`.
fn greedy_match(from: &[&[f32]], to: &[&[f32]]) -> f64 {
    let total: f64 = from
        .iter()
        .map(|a| {
            to.iter()
                .map(|b| f64::from(cosine_similarity(a, b)))
                .fold(f64::NEG_INFINITY, f64::max)
        })
        .sum();
    total / from.len() as f64
}

fn rescale(x: f64, baseline: f64) -> f64 {
    if baseline >= 1.0 {
        return x;
    }
    (x - baseline) / (1.0 - baseline)
}

impl SimilarityScorer for EmbeddingScorer {
    fn score(
        &self,
        references: &[String],
        hypotheses: &[String],
    ) -> Result<SimilarityScores, GenerateError> {
        if references.len() != hypotheses.len() {
            return Err(InputError::LengthMismatch {
                references: references.len(),
                hypotheses: hypotheses.len(),
            }
            .into());
        }
        let mut scores = SimilarityScores::default();
        for (reference, hypothesis) in references.iter().zip(hypotheses) {
            let (p, r, f) = self.raw_pair(reference, hypothesis);
            scores.precision.push(rescale(p, self.baseline.precision));
            scores.recall.push(rescale(r, self.baseline.recall));
            scores.f1.push(rescale(f, self.baseline.f1));
        }
        Ok(scores)
    }
}
