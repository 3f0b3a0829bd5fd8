//! Acceptance of evaluated candidates into the harmony memory.

use crate::schema::Direction;

use super::memory::HarmonyMemory;

/// Replace-the-worst acceptance rule.
#[derive(Debug, Clone, Copy)]
pub struct AcceptancePolicy {
    direction: Direction,
}

impl AcceptancePolicy {
    pub fn new(direction: Direction) -> Self {
        Self { direction }
    }

    /// Whether `candidate` is strictly better than `reference`.
    #[inline]
    pub fn is_better(&self, candidate: f64, reference: f64) -> bool {
        self.direction.is_better(candidate, reference)
    }

    /// Offer a scored candidate to the memory.
    ///
    /// A candidate better than the worst entry replaces it and the memory is
    /// re-sorted. A point already stored with the same fitness is rejected, so
    /// repeated offers change the memory at most once.
    pub fn accept(&self, memory: &mut HarmonyMemory, point: &[f64], fitness: f64) -> bool {
        if !self.is_better(fitness, memory.worst().fitness) || memory.contains(point, fitness) {
            return false;
        }

        memory.replace_worst(point.to_vec(), fitness);
        memory.sort_worst_to_best();
        true
    }
}
