// Rhymewalk: answer a verse with a line that rhymes.
//
// A verse comes in; a line comes out that ends on a word drawn from the
// verse's own content words (or their rhyming neighbors in embedding
// space), walked backward through a trigram transition table built from a
// lyric corpus, and chosen among several candidates for the strongest
// rhyme with a randomly drawn anchor phrase. The anchor closes the answer.
//
// Architecture:
// - chain.rs: Transition table entries, weighted sampling, the `ChainStore`
//   lookup trait, and the JSON-backed `ChainTable` / per-request `ChainFile`
// - walk.rs: The directional walk shared by forward and reverse generation
// - embedding.rs: `Embeddings` nearest-neighbor trait + brute-force `VectorTable`
// - similarity.rs: `SimilarityScorer` trait + baseline-rescaled `EmbeddingScorer`
// - meter.rs: `RhymeDistanceMeter`, rhyme count + similarity + length ratio
//   folded into one distance
// - expand.rs: Content word extraction, neighbor expansion, forward opening rule
// - anchors.rs: The anchor phrase corpus
// - request.rs: Request/response types and two-line input splitting
// - select.rs: `VerseGenerator`, the per-request orchestration
// - config.rs: `GeneratorConfig`, loaded from JSON
// - error.rs: Generation, input, and load errors
//
// Generation is deterministic given the request's `WalkRng` seed.

pub mod anchors;
pub mod chain;
pub mod config;
pub mod embedding;
pub mod error;
pub mod expand;
pub mod meter;
pub mod request;
pub mod select;
pub mod similarity;
pub mod walk;

pub use anchors::AnchorPhrases;
pub use chain::{ChainEntry, ChainFile, ChainSource, ChainStore, ChainTable};
pub use config::GeneratorConfig;
pub use embedding::{Embeddings, VectorTable};
pub use error::{GenerateError, InputError, LoadError};
pub use expand::{CandidateExpander, CandidateSeed};
pub use meter::RhymeDistanceMeter;
pub use request::{GenerateRequest, GeneratedVerse, Mode, split_pair};
pub use select::VerseGenerator;
pub use similarity::{EmbeddingScorer, SimilarityScorer};
