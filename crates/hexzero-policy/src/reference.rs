//! Reference policies: trivial baselines used as seed models, regression
//! opponents, and test fixtures.

use hexzero_engine::BoardEncoding;

use crate::{MoveDistribution, Policy, PolicyError};

/// Uniform mass over every unowned cell.
///
/// The customary seed model for the first self-improvement iteration: with a
/// positive sampling temperature it plays uniformly random legal moves.
#[derive(Debug, Default, Clone, Copy)]
pub struct UniformRandomPolicy;

impl Policy for UniformRandomPolicy {
    fn evaluate(&self, batch: &[BoardEncoding]) -> Result<Vec<MoveDistribution>, PolicyError> {
        Ok(batch
            .iter()
            .map(|encoding| {
                let legal: Vec<usize> = encoding.unowned_indices().collect();
                let mut probabilities = vec![0.0; encoding.cell_count()];
                if !legal.is_empty() {
                    #[expect(clippy::cast_precision_loss)]
                    let mass = 1.0 / legal.len() as f32;
                    for index in legal {
                        probabilities[index] = mass;
                    }
                }
                MoveDistribution::new(probabilities)
            })
            .collect())
    }
}

/// Puts all mass on the unowned cell with the lowest row-major index.
///
/// Deterministic at any temperature, which makes its games exactly
/// reproducible; used by the fixed-outcome regression tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct LowestCellPolicy;

impl Policy for LowestCellPolicy {
    fn evaluate(&self, batch: &[BoardEncoding]) -> Result<Vec<MoveDistribution>, PolicyError> {
        Ok(batch
            .iter()
            .map(|encoding| one_hot_or_empty(encoding, encoding.unowned_indices().next()))
            .collect())
    }
}

/// Mirror of [`LowestCellPolicy`]: all mass on the highest-index unowned cell.
#[derive(Debug, Default, Clone, Copy)]
pub struct HighestCellPolicy;

impl Policy for HighestCellPolicy {
    fn evaluate(&self, batch: &[BoardEncoding]) -> Result<Vec<MoveDistribution>, PolicyError> {
        Ok(batch
            .iter()
            .map(|encoding| one_hot_or_empty(encoding, encoding.unowned_indices().last()))
            .collect())
    }
}

fn one_hot_or_empty(encoding: &BoardEncoding, index: Option<usize>) -> MoveDistribution {
    match index {
        Some(index) => MoveDistribution::one_hot(encoding.cell_count(), index),
        None => MoveDistribution::new(vec![0.0; encoding.cell_count()]),
    }
}

#[cfg(test)]
mod tests {
    use hexzero_engine::{Board, Cell};

    use super::*;

    #[test]
    fn uniform_mass_covers_exactly_the_legal_cells() {
        let mut board = Board::new(3);
        board.apply(Cell::new(0, 0)).unwrap();
        board.apply(Cell::new(1, 1)).unwrap();

        let outputs = UniformRandomPolicy.evaluate(&[board.encode()]).unwrap();
        let distribution = &outputs[0];
        assert_eq!(distribution.probability(Cell::new(0, 0).index(3)), 0.0);
        assert_eq!(distribution.probability(Cell::new(1, 1).index(3)), 0.0);
        let total: f32 = distribution.probabilities().iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
        assert!((distribution.probability(2) - 1.0 / 7.0).abs() < 1e-6);
    }

    #[test]
    fn lowest_and_highest_pick_opposite_corners() {
        let board = Board::new(3);
        let encoding = board.encode();

        let lowest = LowestCellPolicy.evaluate(&[encoding.clone()]).unwrap();
        assert_eq!(lowest[0].probability(0), 1.0);

        let highest = HighestCellPolicy.evaluate(&[encoding]).unwrap();
        assert_eq!(highest[0].probability(8), 1.0);
    }

    #[test]
    fn lowest_skips_owned_cells() {
        let mut board = Board::new(3);
        board.apply(Cell::new(0, 0)).unwrap();
        let outputs = LowestCellPolicy.evaluate(&[board.encode()]).unwrap();
        assert_eq!(outputs[0].probability(0), 0.0);
        assert_eq!(outputs[0].probability(1), 1.0);
    }

    #[test]
    fn value_estimate_is_carried_through() {
        let distribution = MoveDistribution::with_value(vec![1.0], 0.25);
        assert_eq!(distribution.value(), Some(0.25));
        assert_eq!(MoveDistribution::one_hot(4, 2).value(), None);
    }
}
