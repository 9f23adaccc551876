use std::collections::BTreeMap;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::population::{ParticipantId, Population};

/// Who gives to whom, keyed by receiver name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    givers: BTreeMap<String, String>,
}

impl Assignment {
    fn record(&mut self, receiver: &str, giver: &str) {
        self.givers.insert(receiver.to_string(), giver.to_string());
    }

    pub fn giver_for(&self, receiver: &str) -> Option<&str> {
        self.givers.get(receiver).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.givers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.givers.is_empty()
    }

    /// `(giver, receiver)` pairs, ordered by receiver.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.givers
            .iter()
            .map(|(receiver, giver)| (giver.as_str(), receiver.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Everyone gives to exactly one person and receives from exactly one.
    Complete,
    /// `participant` was left with nobody to give to.
    Stuck { participant: String },
}

/// Result of a single draw.
#[derive(Debug, Clone)]
pub struct Matching {
    pub assignment: Assignment,
    pub outcome: Outcome,
}

impl Matching {
    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Complete
    }

    /// Name of the participant the draw got stuck on.
    pub fn stuck(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Complete => None,
            Outcome::Stuck { participant } => Some(participant),
        }
    }
}

/// Position in `remaining` and id of the participant with the fewest
/// eligible receivers. Ties go to whoever comes first in population order.
fn most_constrained(
    population: &Population,
    remaining: &[ParticipantId],
) -> Option<(usize, ParticipantId)> {
    remaining
        .iter()
        .copied()
        .enumerate()
        .min_by_key(|&(_, id)| population[id].eligible().len())
}

/// Draw a giver for every participant.
///
/// Repeatedly takes the most constrained participant still waiting to give,
/// hands them a receiver chosen uniformly from their eligibility set and
/// withdraws that receiver from everyone else still waiting. There is no
/// backtracking: if a participant runs out of receivers the draw stops and
/// the partial assignment is returned with [`Outcome::Stuck`].
pub fn assign<R: Rng>(mut population: Population, rng: &mut R) -> Matching {
    let mut assignment = Assignment::default();
    // Kept in population order so ties resolve the same way for a given seed.
    let mut remaining: Vec<ParticipantId> = population.ids().collect();

    while let Some((slot, giver)) = most_constrained(&population, &remaining) {
        let candidates = population[giver].eligible();
        if candidates.is_empty() {
            let participant = population[giver].name().to_string();
            warn!(
                "No eligible receivers left for {participant} after {} pairing(s)",
                assignment.len()
            );
            return Matching {
                assignment,
                outcome: Outcome::Stuck { participant },
            };
        }

        let receiver = candidates[rng.gen_range(0..candidates.len())];
        debug!(
            "{} gives to {} ({} option(s))",
            population[giver].name(),
            population[receiver].name(),
            candidates.len()
        );

        for &id in &remaining {
            population[id].remove_eligible(receiver);
        }
        assignment.record(population[receiver].name(), population[giver].name());
        remaining.remove(slot);
    }

    info!("Paired all {} participant(s)", assignment.len());
    Matching {
        assignment,
        outcome: Outcome::Complete,
    }
}

/// [`assign`] with a random source seeded from the operating system.
pub fn assign_from_entropy(population: Population) -> Matching {
    let mut rng = StdRng::from_entropy();
    assign(population, &mut rng)
}

/// [`assign`] with a reproducible random source.
pub fn assign_seeded(population: Population, seed: u64) -> Matching {
    let mut rng = StdRng::seed_from_u64(seed);
    assign(population, &mut rng)
}
