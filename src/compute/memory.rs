//! Harmony memory: the fixed-size population of scored candidates.

use crate::error::{Result, SearchError};
use crate::schema::{Direction, VariableDomain};

use super::rng::HarmonyRng;

/// A candidate point and its fitness.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryEntry {
    pub point: Vec<f64>,
    pub fitness: f64,
}

/// Population of harmonies, sorted worst-to-best.
///
/// Index 0 holds the worst entry and the last index the best one, where
/// "worst" follows the optimization direction. The size never changes after
/// initialization.
#[derive(Debug, Clone)]
pub struct HarmonyMemory {
    entries: Vec<MemoryEntry>,
    dimensions: usize,
    direction: Direction,
}

impl HarmonyMemory {
    /// Fill a memory with `size` uniform random points from `domain`.
    ///
    /// Every entry starts with the unscored fitness of `direction`.
    pub fn initialize(
        domain: &VariableDomain,
        size: usize,
        dimensions: usize,
        direction: Direction,
        rng: &mut HarmonyRng,
    ) -> Result<Self> {
        if size == 0 || dimensions == 0 {
            return Err(SearchError::InvalidConfig(format!(
                "Memory of {size} entries with {dimensions} dimensions is empty"
            )));
        }

        let bounds = (0..dimensions)
            .map(|j| domain.bounds(j))
            .collect::<Result<Vec<_>>>()?;

        let entries = (0..size)
            .map(|_| MemoryEntry {
                point: bounds.iter().map(|&b| rng.uniform(b)).collect(),
                fitness: direction.unscored(),
            })
            .collect();

        Ok(Self {
            entries,
            dimensions,
            direction,
        })
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: an initialized memory holds at least one entry.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// All entries, worst first.
    pub fn entries(&self) -> &[MemoryEntry] {
        &self.entries
    }

    /// Assign the fitness of entry `index`.
    pub fn set_fitness(&mut self, index: usize, fitness: f64) -> Result<()> {
        let len = self.entries.len();
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(SearchError::OutOfRange { index, len })?;
        entry.fitness = fitness;
        Ok(())
    }

    /// Stable sort so index 0 is the worst entry.
    pub fn sort_worst_to_best(&mut self) {
        let direction = self.direction;
        self.entries
            .sort_by(|a, b| direction.worst_first(a.fitness, b.fitness));
    }

    /// Check the worst-to-best ordering.
    pub fn is_sorted(&self) -> bool {
        self.entries
            .windows(2)
            .all(|w| !self.direction.is_better(w[0].fitness, w[1].fitness))
    }

    /// Worst entry.
    #[inline]
    pub fn worst(&self) -> &MemoryEntry {
        &self.entries[0]
    }

    /// Best entry.
    #[inline]
    pub fn best(&self) -> &MemoryEntry {
        &self.entries[self.entries.len() - 1]
    }

    /// Overwrite the worst entry. The caller re-sorts afterwards.
    pub fn replace_worst(&mut self, point: Vec<f64>, fitness: f64) {
        self.entries[0] = MemoryEntry { point, fitness };
    }

    /// Copy of the point stored at `index`.
    pub fn row(&self, index: usize) -> Result<Vec<f64>> {
        self.entries
            .get(index)
            .map(|e| e.point.clone())
            .ok_or(SearchError::OutOfRange {
                index,
                len: self.entries.len(),
            })
    }

    /// Value of `dimension` in the point stored at `index`.
    pub fn recall(&self, index: usize, dimension: usize) -> Result<f64> {
        let entry = self.entries.get(index).ok_or(SearchError::OutOfRange {
            index,
            len: self.entries.len(),
        })?;
        entry
            .point
            .get(dimension)
            .copied()
            .ok_or(SearchError::OutOfRange {
                index: dimension,
                len: self.dimensions,
            })
    }

    /// Whether an identical scored point is already stored.
    pub fn contains(&self, point: &[f64], fitness: f64) -> bool {
        self.entries
            .iter()
            .any(|e| e.fitness == fitness && e.point == point)
    }
}
