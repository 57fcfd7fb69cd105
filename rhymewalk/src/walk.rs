// Directional walks over the transition table.
//
// Forward and reverse generation are the same loop pointed in opposite
// directions. A line is held in a deque; each step looks up the entries
// continuing the two tokens at the growing edge, samples one by frequency,
// and pushes the new token onto that edge:
//
//   Forward:  edge = back,  lookup_forward(line[-2], line[-1]),  push next
//   Backward: edge = front, lookup_backward(line[1], line[0]),   push context1
//
// The backward pair keeps the walk chain-valid: the prepended context1 is a
// token that was actually observed before line[0] when line[0..2] followed.
//
// A walk ends when its edge reaches the opposite sentinel (`END` going
// forward, `BEGIN` going backward). Every walk is bounded by `max_steps`;
// exceeding it is a corpus-integrity failure reported as
// `GenerationStalled`. A lookup that comes back empty mid-walk is a corpus
// gap reported as `EmptyChainResult`. Both abandon only the current line.

use crate::chain::{BEGIN, ChainEntry, ChainStore, Direction, END};
use crate::error::GenerateError;
use rhymewalk_prng::WalkRng;
use std::collections::VecDeque;

/// Walks lines through one opened chain store.
pub struct Walker<'s> {
    store: &'s dyn ChainStore,
    max_steps: usize,
}

impl<'s> Walker<'s> {
    pub fn new(store: &'s dyn ChainStore, max_steps: usize) -> Self {
        Walker { store, max_steps }
    }

    /// Generate a line forward from an opening entry (context1 = `BEGIN`).
    pub fn forward_from(
        &self,
        opening: &ChainEntry,
        rng: &mut WalkRng,
    ) -> Result<String, GenerateError> {
        let mut line = VecDeque::from([opening.context2.clone(), opening.next.clone()]);
        self.walk(Direction::Forward, &mut line, &opening.context2, rng)?;
        Ok(render(line))
    }

    /// Generate a line backward so that it ends on `seed`.
    ///
    /// A seed never observed as a next-token starts instead from a random
    /// line ending.
    pub fn reverse_from_seed(
        &self,
        seed: &str,
        rng: &mut WalkRng,
    ) -> Result<String, GenerateError> {
        let mut first = self.store.lookup_backward(seed, None);
        if first.is_empty() {
            tracing::debug!(seed, "seed never precedes anything, starting from a line end");
            first = self.store.lookup_backward(END, None);
        }
        let entry = first.sample(rng)?;

        let mut line = VecDeque::with_capacity(8);
        if entry.next != END {
            line.push_front(entry.next.clone());
        }
        line.push_front(entry.context2.clone());
        line.push_front(entry.context1.clone());

        self.walk(Direction::Backward, &mut line, seed, rng)?;
        Ok(render(line))
    }

    fn walk(
        &self,
        direction: Direction,
        line: &mut VecDeque<String>,
        seed: &str,
        rng: &mut WalkRng,
    ) -> Result<(), GenerateError> {
        let mut steps = 0;
        while !reached_boundary(direction, line) {
            if steps >= self.max_steps {
                return Err(GenerateError::GenerationStalled {
                    seed: seed.to_string(),
                    max_steps: self.max_steps,
                });
            }
            steps += 1;

            let (key, context2) = search_pair(direction, line);
            let transitions = self.store.lookup(direction, key, Some(context2));
            let entry = transitions.sample(rng)?;
            match direction {
                Direction::Forward => line.push_back(entry.next.clone()),
                Direction::Backward => line.push_front(entry.context1.clone()),
            }
        }
        tracing::trace!(%direction, steps, "walk reached line boundary");
        Ok(())
    }
}

fn reached_boundary(direction: Direction, line: &VecDeque<String>) -> bool {
    match direction {
        Direction::Forward => line.back().is_some_and(|t| t == END),
        Direction::Backward => line.front().is_some_and(|t| t == BEGIN),
    }
}

/// The (lookup key, context2) pair at the growing edge. Lines always hold
/// at least two tokens while walking.
fn search_pair(direction: Direction, line: &VecDeque<String>) -> (&str, &str) {
    match direction {
        Direction::Forward => {
            let n = line.len();
            (line[n - 2].as_str(), line[n - 1].as_str())
        }
        Direction::Backward => (line[1].as_str(), line[0].as_str()),
    }
}

/// Concatenate the content tokens, dropping the sentinels.
fn render(line: VecDeque<String>) -> String {
    line.into_iter().filter(|t| t != BEGIN && t != END).collect()
}
