// LanePattern - the set of lanes carrying an active note for one beat

use rand::seq::index;
use rand::Rng;

/// Active lanes for a single beat
///
/// Indices are unique, sorted ascending and always `< num_lanes`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LanePattern {
    num_lanes: usize,
    active: Vec<usize>,
}

impl LanePattern {
    /// Pattern with no active lanes
    pub fn empty(num_lanes: usize) -> Self {
        Self {
            num_lanes,
            active: Vec::new(),
        }
    }

    /// Pattern with every lane active
    pub fn full(num_lanes: usize) -> Self {
        Self {
            num_lanes,
            active: (0..num_lanes).collect(),
        }
    }

    /// Build a pattern from arbitrary indices
    ///
    /// Out-of-range indices are dropped and duplicates collapsed.
    pub fn from_indices(num_lanes: usize, indices: &[usize]) -> Self {
        let mut active: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&lane| lane < num_lanes)
            .collect();
        active.sort_unstable();
        active.dedup();
        Self { num_lanes, active }
    }

    /// Uniformly random subset of `0..num_lanes` with exactly `size` lanes
    ///
    /// `size` is clamped to `num_lanes`.
    pub fn random_subset<R: Rng + ?Sized>(num_lanes: usize, size: usize, rng: &mut R) -> Self {
        let amount = size.min(num_lanes);
        let mut active = index::sample(rng, num_lanes, amount).into_vec();
        active.sort_unstable();
        Self { num_lanes, active }
    }

    pub fn num_lanes(&self) -> usize {
        self.num_lanes
    }

    /// Active lane indices, ascending
    pub fn active_lanes(&self) -> &[usize] {
        &self.active
    }

    /// Number of active lanes
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn is_active(&self, lane: usize) -> bool {
        self.active.binary_search(&lane).is_ok()
    }

    /// Lane-activation vector of length `num_lanes`
    pub fn to_inputs(&self) -> Vec<bool> {
        let mut inputs = vec![false; self.num_lanes];
        for &lane in &self.active {
            if let Some(slot) = inputs.get_mut(lane) {
                *slot = true;
            }
        }
        inputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_from_indices_filters_and_dedups() {
        let pattern = LanePattern::from_indices(4, &[3, 1, 1, 7, 0]);
        assert_eq!(pattern.active_lanes(), &[0, 1, 3]);
        assert_eq!(pattern.len(), 3);
        assert!(pattern.is_active(3));
        assert!(!pattern.is_active(2));
    }

    #[test]
    fn test_to_inputs() {
        let pattern = LanePattern::from_indices(5, &[1, 4]);
        assert_eq!(pattern.to_inputs(), vec![false, true, false, false, true]);
        assert_eq!(LanePattern::full(3).to_inputs(), vec![true, true, true]);
        assert!(LanePattern::empty(3).to_inputs().iter().all(|&b| !b));
    }

    #[test]
    fn test_random_subset_size_and_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for size in 0..=6 {
            let pattern = LanePattern::random_subset(6, size, &mut rng);
            assert_eq!(pattern.len(), size);
            assert!(pattern.active_lanes().windows(2).all(|w| w[0] < w[1]));
            assert!(pattern.active_lanes().iter().all(|&lane| lane < 6));
        }
    }

    #[test]
    fn test_random_subset_clamps_size() {
        let mut rng = StdRng::seed_from_u64(1);
        let pattern = LanePattern::random_subset(3, 10, &mut rng);
        assert_eq!(pattern, LanePattern::full(3));
    }
}
