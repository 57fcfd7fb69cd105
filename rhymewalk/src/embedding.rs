// Word embeddings: the nearest-neighbor collaborator.
//
// The generator asks two questions of an embedding model: "is this token in
// the vocabulary" and "which tokens sit closest to this one (optionally
// pulled toward the theme word)". `Embeddings::most_similar` answers the
// second the way word2vec tooling does: unit-normalize each positive
// token's vector, sum them, and rank the vocabulary by cosine similarity to
// the sum, excluding the positives themselves.
//
// `VectorTable` is a brute-force in-memory implementation loaded from JSON.
// It is fine for vocabularies of tens of thousands of words; anything
// bigger would put an ANN index behind the same trait.

use crate::error::{LoadError, read_json};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// A vocabulary token and its cosine similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub token: String,
    pub similarity: f32,
}

pub trait Embeddings: Send + Sync {
    fn vector(&self, token: &str) -> Option<&[f32]>;

    /// Up to `top_n` tokens ranked by cosine similarity to `query`,
    /// descending, ties in vocabulary order. Tokens in `exclude` are skipped.
    fn nearest(&self, query: &[f32], top_n: usize, exclude: &[&str]) -> Vec<Neighbor>;

    fn contains(&self, token: &str) -> bool {
        self.vector(token).is_some()
    }

    /// Neighbors of the normalized sum of the in-vocabulary `positive`
    /// tokens. Empty when none of them are in the vocabulary.
    fn most_similar(&self, positive: &[&str], top_n: usize) -> Vec<Neighbor> {
        let present: Vec<&[f32]> = positive.iter().filter_map(|t| self.vector(t)).collect();
        let Some(first) = present.first() else {
            return Vec::new();
        };
        let mut query = vec![0.0f32; first.len()];
        for v in &present {
            let norm = l2_norm(v);
            if norm == 0.0 {
                continue;
            }
            for (q, x) in query.iter_mut().zip(v.iter()) {
                *q += x / norm;
            }
        }
        self.nearest(&query, top_n, positive)
    }
}

#[derive(Debug, Deserialize)]
struct VectorFile {
    dimension: usize,
    vectors: Vec<VectorRow>,
}

#[derive(Debug, Deserialize)]
struct VectorRow {
    token: String,
    vector: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("vector for {token:?} has dimension {found}, expected {expected}")]
pub struct DimensionMismatch {
    pub token: String,
    pub expected: usize,
    pub found: usize,
}

/// In-memory word vectors with brute-force cosine search.
#[derive(Debug, Clone, Default)]
pub struct VectorTable {
    dimension: usize,
    tokens: Vec<String>,
    vectors: Vec<Vec<f32>>,
    index: BTreeMap<String, usize>,
}

impl VectorTable {
    pub fn new(dimension: usize) -> Self {
        VectorTable {
            dimension,
            ..Default::default()
        }
    }

    /// Add or replace a token's vector.
    pub fn insert(&mut self, token: &str, vector: Vec<f32>) -> Result<(), DimensionMismatch> {
        if vector.len() != self.dimension {
            return Err(DimensionMismatch {
                token: token.to_string(),
                expected: self.dimension,
                found: vector.len(),
            });
        }
        match self.index.get(token) {
            Some(&i) => self.vectors[i] = vector,
            None => {
                self.index.insert(token.to_string(), self.tokens.len());
                self.tokens.push(token.to_string());
                self.vectors.push(vector);
            }
        }
        Ok(())
    }

    /// Load from a JSON file of `{"dimension": N, "vectors": [{token, vector}]}`.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let file: VectorFile = read_json(path)?;
        let mut table = VectorTable::new(file.dimension);
        for row in file.vectors {
            table.insert(&row.token, row.vector).map_err(|err| LoadError::Invalid {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;
        }
        Ok(table)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Embeddings for VectorTable {
    fn vector(&self, token: &str) -> Option<&[f32]> {
        self.index.get(token).map(|&i| self.vectors[i].as_slice())
    }

    fn nearest(&self, query: &[f32], top_n: usize, exclude: &[&str]) -> Vec<Neighbor> {
        if query.len() != self.dimension {
            return Vec::new();
        }
        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .filter(|(i, _)| !exclude.contains(&self.tokens[*i].as_str()))
            .map(|(i, v)| (i, cosine_similarity(query, v)))
            .collect();

        // Stable sort, so equal similarities keep vocabulary order.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored
            .into_iter()
            .take(top_n)
            .map(|(i, similarity)| Neighbor {
                token: self.tokens[i].clone(),
                similarity,
            })
            .collect()
    }
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine similarity, 0.0 when either vector has zero length.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm = l2_norm(a) * l2_norm(b);
    if norm == 0.0 { 0.0 } else { dot / norm }
}
