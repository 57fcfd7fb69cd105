// Transition table of (context1, context2, next, frequency) triplets.
//
// Every corpus line contributes one entry per token position, padded with
// the `BEGIN`/`END` sentinels, so a line "a b c" yields
// (BEGIN, a, b), (a, b, c), (b, c, END). The table is read-only here; it is
// built offline and loaded from JSON in file order. Lookup results keep that
// order, which the forward opening rule relies on.
//
// Two indices serve the two walk directions:
// - forward:  keyed by context1, optionally filtered by context2
// - backward: keyed by next, optionally filtered by context2
//
// `ChainSource` is the connection seam: the orchestrator opens a store at
// the start of each request and drops it on every exit path. `ChainTable`
// is its own (already open) source; `ChainFile` loads the table per request.

use crate::error::{GenerateError, LoadError, read_json};
use rhymewalk_prng::WalkRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Line-start sentinel. Never emitted as content.
pub const BEGIN: &str = "__BEGIN_SENTENCE__";
/// Line-end sentinel. Never emitted as content.
pub const END: &str = "__END_SENTENCE__";

/// One observed transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEntry {
    pub context1: String,
    pub context2: String,
    pub next: String,
    /// Always >= 1 once loaded into a `ChainTable`.
    pub frequency: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => f.write_str("forward"),
            Direction::Backward => f.write_str("backward"),
        }
    }
}

/// A lookup as issued, kept for error reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainQuery {
    pub direction: Direction,
    /// context1 for forward lookups, next for backward lookups.
    pub key: String,
    pub context2: Option<String>,
}

impl fmt::Display for ChainQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key_name = match self.direction {
            Direction::Forward => "context1",
            Direction::Backward => "next",
        };
        write!(f, "{} lookup {key_name}={:?}", self.direction, self.key)?;
        if let Some(c2) = &self.context2 {
            write!(f, " context2={c2:?}")?;
        }
        Ok(())
    }
}

/// Entries matching one query, in table order.
#[derive(Debug, Clone)]
pub struct Transitions {
    pub query: ChainQuery,
    pub entries: Vec<ChainEntry>,
}

impl Transitions {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Frequency-weighted pick. Fails with `EmptyChainResult` when nothing matched.
    pub fn sample(&self, rng: &mut WalkRng) -> Result<&ChainEntry, GenerateError> {
        sample_weighted(&self.entries, rng)
            .map(|idx| &self.entries[idx])
            .ok_or_else(|| GenerateError::EmptyChainResult(self.query.clone()))
    }
}

/// Pick an index with probability proportional to its entry's frequency.
///
/// Builds the cumulative weight array, draws uniformly below the total, and
/// binary-searches for the bucket. `None` when there is nothing to pick.
pub fn sample_weighted(entries: &[ChainEntry], rng: &mut WalkRng) -> Option<usize> {
    let mut cumulative = Vec::with_capacity(entries.len());
    let mut total: u64 = 0;
    for entry in entries {
        total += u64::from(entry.frequency);
        cumulative.push(total);
    }
    if total == 0 {
        return None;
    }
    let target = rng.range_u64(0, total);
    Some(cumulative.partition_point(|&c| c <= target))
}

/// Read access to a transition table.
pub trait ChainStore: Sync {
    /// Entries whose context1 matches, and context2 too when given.
    fn lookup_forward(&self, context1: &str, context2: Option<&str>) -> Transitions;

    /// Entries whose next token matches, and context2 too when given.
    fn lookup_backward(&self, next: &str, context2: Option<&str>) -> Transitions;

    fn lookup(&self, direction: Direction, key: &str, context2: Option<&str>) -> Transitions {
        match direction {
            Direction::Forward => self.lookup_forward(key, context2),
            Direction::Backward => self.lookup_backward(key, context2),
        }
    }
}

impl<T: ChainStore + ?Sized> ChainStore for &T {
    fn lookup_forward(&self, context1: &str, context2: Option<&str>) -> Transitions {
        (**self).lookup_forward(context1, context2)
    }

    fn lookup_backward(&self, next: &str, context2: Option<&str>) -> Transitions {
        (**self).lookup_backward(next, context2)
    }
}

/// Hands out a store scoped to one request.
pub trait ChainSource: Send + Sync {
    type Store<'a>: ChainStore
    where
        Self: 'a;

    fn open(&self) -> Result<Self::Store<'_>, GenerateError>;
}

/// An entry that violates the frequency >= 1 invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("entry {index} ({context1:?}, {context2:?} -> {next:?}) has frequency 0")]
pub struct ZeroFrequency {
    pub index: usize,
    pub context1: String,
    pub context2: String,
    pub next: String,
}

#[derive(Debug, Deserialize)]
struct ChainTableFile {
    entries: Vec<ChainEntry>,
}

/// In-memory transition table with forward and backward indices.
#[derive(Debug, Clone, Default)]
pub struct ChainTable {
    entries: Vec<ChainEntry>,
    forward: BTreeMap<String, Vec<usize>>,
    backward: BTreeMap<String, Vec<usize>>,
}

impl ChainTable {
    pub fn from_entries(entries: Vec<ChainEntry>) -> Result<Self, ZeroFrequency> {
        let mut table = ChainTable::default();
        for (index, entry) in entries.into_iter().enumerate() {
            if entry.frequency == 0 {
                return Err(ZeroFrequency {
                    index,
                    context1: entry.context1,
                    context2: entry.context2,
                    next: entry.next,
                });
            }
            table
                .forward
                .entry(entry.context1.clone())
                .or_default()
                .push(index);
            table.backward.entry(entry.next.clone()).or_default().push(index);
            table.entries.push(entry);
        }
        Ok(table)
    }

    /// Load from a JSON file of `{"entries": [...]}`.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let file: ChainTableFile = read_json(path)?;
        ChainTable::from_entries(file.entries).map_err(|err| LoadError::Invalid {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn collect(
        &self,
        index: &BTreeMap<String, Vec<usize>>,
        query: ChainQuery,
    ) -> Transitions {
        let entries = index
            .get(&query.key)
            .map(|ids| {
                ids.iter()
                    .map(|&i| &self.entries[i])
                    .filter(|e| query.context2.as_deref().is_none_or(|c2| e.context2 == c2))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Transitions { query, entries }
    }
}

impl ChainStore for ChainTable {
    fn lookup_forward(&self, context1: &str, context2: Option<&str>) -> Transitions {
        let query = ChainQuery {
            direction: Direction::Forward,
            key: context1.to_string(),
            context2: context2.map(str::to_string),
        };
        self.collect(&self.forward, query)
    }

    fn lookup_backward(&self, next: &str, context2: Option<&str>) -> Transitions {
        let query = ChainQuery {
            direction: Direction::Backward,
            key: next.to_string(),
            context2: context2.map(str::to_string),
        };
        self.collect(&self.backward, query)
    }
}

impl ChainSource for ChainTable {
    type Store<'a> = &'a ChainTable;

    fn open(&self) -> Result<Self::Store<'_>, GenerateError> {
        Ok(self)
    }
}

/// A chain table on disk, loaded fresh for every request.
#[derive(Debug, Clone)]
pub struct ChainFile {
    path: PathBuf,
}

impl ChainFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ChainFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ChainSource for ChainFile {
    type Store<'a> = ChainTable;

    fn open(&self) -> Result<Self::Store<'_>, GenerateError> {
        ChainTable::load(self.path()).map_err(|err| GenerateError::MissingChainStore {
            path: self.path().to_path_buf(),
            reason: match err {
                LoadError::Io { source, .. } => source.to_string(),
                LoadError::Json { source, .. } => source.to_string(),
                LoadError::Invalid { reason, .. } => reason,
            },
        })
    }
}
