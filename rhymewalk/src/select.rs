// Request orchestration: verse in, best-rhyming line out.
//
// Reverse mode:
//   1. Draw an anchor phrase.
//   2. Expand the verse into candidate seeds (content words + rhyming
//      neighbors).
//   3. Walk each seed backward to a line start. A seed whose walk hits a
//      corpus gap or stalls is skipped; any other error ends the request.
//   4. Measure every walked line against the anchor and keep the first
//      line with the highest distance.
//   5. Answer with the winning line, a line break, and the anchor.
//
// Forward mode walks one line from an opening picked by content words and
// does no scoring.
//
// The chain store is opened at the top of `generate` and dropped when it
// returns, whatever the outcome. Every seed gets its own generator forked
// from the request's, in seed order and before any walking, so a request
// produces the same verse whether its walks run sequentially or on the
// rayon pool.

use crate::anchors::AnchorPhrases;
use crate::chain::{BEGIN, ChainSource, ChainStore};
use crate::config::GeneratorConfig;
use crate::error::GenerateError;
use crate::expand::{CandidateExpander, CandidateSeed};
use crate::meter::RhymeDistanceMeter;
use crate::request::{GenerateRequest, GeneratedCandidate, GeneratedVerse, Mode};
use crate::walk::Walker;
use rayon::prelude::*;
use rhymewalk_prng::WalkRng;
use std::time::{Duration, Instant};

pub struct VerseGenerator<S: ChainSource> {
    source: S,
    expander: CandidateExpander,
    meter: RhymeDistanceMeter,
    anchors: AnchorPhrases,
    max_walk_steps: usize,
    parallel: bool,
    timeout: Option<Duration>,
}

/// A request deadline, checked before each seed.
#[derive(Clone, Copy)]
struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    fn check(deadline: Option<Deadline>) -> Result<(), GenerateError> {
        match deadline {
            Some(d) if Instant::now() >= d.at => Err(GenerateError::DeadlineExceeded(d.budget)),
            _ => Ok(()),
        }
    }
}

impl<S: ChainSource> VerseGenerator<S> {
    pub fn new(
        source: S,
        expander: CandidateExpander,
        meter: RhymeDistanceMeter,
        anchors: AnchorPhrases,
        config: &GeneratorConfig,
    ) -> Self {
        VerseGenerator {
            source,
            expander,
            meter,
            anchors,
            max_walk_steps: config.max_walk_steps,
            parallel: config.parallel,
            timeout: config.request_timeout(),
        }
    }

    pub fn meter(&self) -> &RhymeDistanceMeter {
        &self.meter
    }

    pub fn generate(
        &self,
        request: &GenerateRequest,
        rng: &mut WalkRng,
    ) -> Result<GeneratedVerse, GenerateError> {
        let verse = request.validate()?;
        let deadline = self.timeout.map(|budget| Deadline {
            at: Instant::now() + budget,
            budget,
        });

        let store = self.source.open()?;
        let walker = Walker::new(&store, self.max_walk_steps);
        match request.mode {
            Mode::Forward => self.generate_forward(verse, &store, &walker, rng),
            Mode::Reverse => self.generate_reverse(verse, &walker, deadline, rng),
        }
    }

    fn generate_forward(
        &self,
        verse: &str,
        store: &dyn ChainStore,
        walker: &Walker<'_>,
        rng: &mut WalkRng,
    ) -> Result<GeneratedVerse, GenerateError> {
        let words = self.expander.content_words(verse, rng);
        let openings = store.lookup_forward(BEGIN, None);
        let opening = self.expander.choose_opening(&words, &openings, rng)?;
        let text = walker.forward_from(&opening, rng)?;
        tracing::info!(text = text.as_str(), "generated forward line");
        Ok(GeneratedVerse {
            text,
            distance: None,
            anchor: None,
            candidates: Vec::new(),
        })
    }

    fn generate_reverse(
        &self,
        verse: &str,
        walker: &Walker<'_>,
        deadline: Option<Deadline>,
        rng: &mut WalkRng,
    ) -> Result<GeneratedVerse, GenerateError> {
        let anchor = self.anchors.choose(rng).to_string();
        let seeds = self.expander.expand(verse, &anchor, &self.meter, rng);
        let rngs: Vec<WalkRng> = seeds.iter().map(|_| rng.fork()).collect();
        tracing::debug!(anchor = anchor.as_str(), seeds = seeds.len(), "reverse generation");

        let attempt = |(seed, mut seed_rng): (&CandidateSeed, WalkRng)| -> Result<
            Option<GeneratedCandidate>,
            GenerateError,
        > {
            Deadline::check(deadline)?;
            self.attempt(walker, seed, &anchor, &mut seed_rng)
        };
        let attempts: Vec<Option<GeneratedCandidate>> = if self.parallel {
            seeds
                .par_iter()
                .zip(rngs.into_par_iter())
                .map(attempt)
                .collect::<Result<_, _>>()?
        } else {
            seeds
                .iter()
                .zip(rngs)
                .map(attempt)
                .collect::<Result<_, _>>()?
        };
        let candidates: Vec<GeneratedCandidate> = attempts.into_iter().flatten().collect();

        let Some(best) = best_candidate(&candidates) else {
            return Err(GenerateError::AllCandidatesFailed {
                attempted: seeds.len(),
            });
        };
        tracing::info!(
            seed = best.seed.as_str(),
            distance = best.distance,
            succeeded = candidates.len(),
            attempted = seeds.len(),
            "selected reverse line"
        );
        Ok(GeneratedVerse {
            text: format!("{}\n{}", best.text, anchor),
            distance: Some(best.distance),
            anchor: Some(anchor),
            candidates,
        })
    }

    /// Walk and measure one seed. `Ok(None)` when the walk failed in a way
    /// that only abandons this seed.
    fn attempt(
        &self,
        walker: &Walker<'_>,
        seed: &CandidateSeed,
        anchor: &str,
        rng: &mut WalkRng,
    ) -> Result<Option<GeneratedCandidate>, GenerateError> {
        let text = match walker.reverse_from_seed(&seed.token, rng) {
            Ok(text) => text,
            Err(err) if err.is_candidate_local() => {
                tracing::debug!(
                    seed = seed.token.as_str(),
                    origin = %seed.origin,
                    error = %err,
                    "skipping seed"
                );
                return Ok(None);
            }
            Err(err) => return Err(err),
        };
        let distance = self.meter.throw(&text, anchor)?;
        tracing::debug!(
            seed = seed.token.as_str(),
            origin = %seed.origin,
            text = text.as_str(),
            distance,
            "candidate"
        );
        Ok(Some(GeneratedCandidate {
            seed: seed.token.clone(),
            text,
            distance,
        }))
    }
}

/// The first candidate with the greatest distance.
pub fn best_candidate(candidates: &[GeneratedCandidate]) -> Option<&GeneratedCandidate> {
    let mut best: Option<&GeneratedCandidate> = None;
    for candidate in candidates {
        if best.is_none_or(|b| candidate.distance > b.distance) {
            best = Some(candidate);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(seed: &str, distance: u64) -> GeneratedCandidate {
        GeneratedCandidate {
            seed: seed.to_string(),
            text: seed.to_string(),
            distance,
        }
    }

    #[test]
    fn test_best_candidate_keeps_first_of_ties() {
        let candidates = vec![candidate("a", 3), candidate("b", 7), candidate("c", 7)];
        assert_eq!(best_candidate(&candidates).unwrap().seed, "b");
    }

    #[test]
    fn test_best_candidate_accepts_zero_distance() {
        let candidates = vec![candidate("a", 0), candidate("b", 0)];
        assert_eq!(best_candidate(&candidates).unwrap().seed, "a");
        assert!(best_candidate(&[]).is_none());
    }

    #[test]
    fn test_deadline() {
        assert!(Deadline::check(None).is_ok());
        let expired = Deadline {
            at: Instant::now(),
            budget: Duration::from_millis(1),
        };
        std::thread::sleep(Duration::from_millis(2));
        let err = Deadline::check(Some(expired)).unwrap_err();
        assert!(err.is_retryable());
        let open = Deadline {
            at: Instant::now() + Duration::from_secs(60),
            budget: Duration::from_secs(60),
        };
        assert!(Deadline::check(Some(open)).is_ok());
    }
}
