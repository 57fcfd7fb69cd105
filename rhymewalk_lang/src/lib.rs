// Language resources for rhymewalk.
//
// Everything here is independent of the transition table: it answers "what
// are the words in this line, how is it pronounced, and how well do two
// pronunciations rhyme".
//
// Architecture:
// - `types.rs`: `PartOfSpeech`, raw `Morpheme`s, parsed `Token`s, and the
//   `RecoverableTokenError` that makes a malformed morpheme skippable
// - `tagger.rs`: the `Tagger` trait plus `LexiconTagger`, a longest-match
//   tagger over a JSON lexicon in IPADIC feature layout
// - `kana.rs`: `PhoneticTable`, romanization into syllable units, vowelize
// - `rhyme.rs`: tail/head rhyme counting, length ratio, rhyme ranking
//
// The lexicon is parsed from a JSON string via `LexiconTagger::from_json()`;
// file IO stays with the caller.

pub mod kana;
pub mod rhyme;
pub mod tagger;
pub mod types;

// Re-export key types at crate root for convenience.
pub use kana::{PhoneticTable, SyllableUnit, vowelize};
pub use tagger::{LexiconTagger, Tagger};
pub use types::{Morpheme, PartOfSpeech, RecoverableTokenError, Token};
