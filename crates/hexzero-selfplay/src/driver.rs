//! Lockstep advancement of many games with batched policy invocation.
//!
//! Each round, every still-active board is grouped by the policy seated to
//! move, and each distinct policy instance is invoked exactly once with the
//! full sub-batch of board encodings. Encodings carry the to-move plane, so
//! one call can serve boards where the policy sits on different sides.
//!
//! Control flow is single threaded with data-parallel batching: the policy
//! invocations are the only points where the driver waits, and a round's
//! results are fully in hand before any board advances. No board is touched
//! by more than one round at a time and boards share no mutable state, so no
//! locking is involved anywhere.

use std::{iter, sync::Arc};

use hexzero_engine::BoardEncoding;
use rand::{
    Rng as _, SeedableRng as _,
    distr::{Distribution as _, weighted::WeightedIndex},
};
use rand_distr::Gamma;
use rand_pcg::Pcg32;

use hexzero_policy::{MoveDistribution, PolicyError, SharedPolicy};

use crate::{DriverError, GameBatch, GameSeed, GameTrace, MoveRecord};

/// Exploration noise mixed into the policy distribution before sampling.
///
/// A Dirichlet(`alpha`)-distributed vector over the legal cells replaces
/// `weight` of the policy's probability mass. `alpha` must be positive;
/// a `weight` of zero disables mixing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseSpec {
    /// Dirichlet concentration; small values produce spiky noise.
    pub alpha: f32,
    /// Fraction of the final distribution taken from noise, clamped to [0, 1].
    pub weight: f32,
}

/// Driver settings.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Hard bound on rounds; board size squared is the natural choice, since
    /// no game can last longer than one move per cell.
    pub round_cap: usize,
    pub noise: Option<NoiseSpec>,
    /// Record a [`GameTrace`] per board while playing.
    pub record_traces: bool,
}

impl DriverConfig {
    /// Plain configuration: no noise, no traces.
    #[must_use]
    pub fn new(round_cap: usize) -> Self {
        Self {
            round_cap,
            noise: None,
            record_traces: false,
        }
    }

    #[must_use]
    pub fn with_noise(mut self, noise: NoiseSpec) -> Self {
        self.noise = Some(noise);
        self
    }

    #[must_use]
    pub fn with_traces(mut self) -> Self {
        self.record_traces = true;
        self
    }
}

/// Advances a [`GameBatch`] to completion, one lockstep round at a time.
#[derive(Debug)]
pub struct BatchedGameDriver {
    config: DriverConfig,
    rng: Pcg32,
}

impl BatchedGameDriver {
    /// Creates a driver with a sampling seed from the OS.
    #[must_use]
    pub fn new(config: DriverConfig) -> Self {
        Self::with_seed(config, rand::rng().random())
    }

    /// Like [`Self::new`], but reproducible.
    #[must_use]
    pub fn with_seed(config: DriverConfig, seed: GameSeed) -> Self {
        Self {
            config,
            rng: Pcg32::from_seed(seed.to_bytes()),
        }
    }

    /// Plays every board in the batch to termination.
    ///
    /// Slot order is preserved, and a finished board's terminal state is
    /// never revisited in later rounds. Fails when any board is still active
    /// after `round_cap` rounds.
    pub fn play_to_completion(&mut self, batch: &mut GameBatch) -> Result<(), DriverError> {
        if self.config.record_traces {
            for slot in batch.slots_mut() {
                slot.trace.get_or_insert_with(GameTrace::default);
            }
        }
        for _ in 0..self.config.round_cap {
            let active = batch.active_indices();
            if active.is_empty() {
                return Ok(());
            }
            self.play_round(batch, &active)?;
        }
        if batch.active_indices().is_empty() {
            Ok(())
        } else {
            Err(DriverError::RoundCapExceeded {
                round_cap: self.config.round_cap,
            })
        }
    }

    fn play_round(&mut self, batch: &mut GameBatch, active: &[usize]) -> Result<(), DriverError> {
        for (policy, indices) in group_by_seated_policy(batch, active) {
            let encodings: Vec<BoardEncoding> = indices
                .iter()
                .map(|&index| batch.slots()[index].board.encode())
                .collect();
            let outputs = policy.evaluate(&encodings).map_err(DriverError::Policy)?;
            if outputs.len() != encodings.len() {
                return Err(DriverError::Policy(PolicyError::BatchSizeMismatch {
                    expected: encodings.len(),
                    actual: outputs.len(),
                }));
            }
            for ((&index, encoding), output) in
                iter::zip(iter::zip(&indices, &encodings), outputs)
            {
                self.advance_board(batch, index, encoding, &output)?;
            }
        }

        // A board that just finished keeps its final temperature; the rest
        // cool off once per round.
        for &index in active {
            let slot = &mut batch.slots_mut()[index];
            if slot.board.is_terminal() {
                if let Some(trace) = &mut slot.trace {
                    trace.set_winner(slot.board.winner());
                }
            } else {
                slot.temperature.decay_once();
            }
        }
        Ok(())
    }

    fn advance_board(
        &mut self,
        batch: &mut GameBatch,
        index: usize,
        encoding: &BoardEncoding,
        output: &MoveDistribution,
    ) -> Result<(), DriverError> {
        let noise = self.config.noise;
        let record_traces = self.config.record_traces;
        let slot = &mut batch.slots_mut()[index];
        let size = slot.board.size();

        if output.probabilities().len() != size * size {
            return Err(DriverError::Policy(PolicyError::DistributionSizeMismatch {
                expected: size * size,
                actual: output.probabilities().len(),
            }));
        }

        let legal = slot.board.legal_moves();
        let mut weights: Vec<f32> = legal
            .iter()
            .map(|cell| output.probability(cell.index(size)))
            .collect();
        renormalize(&mut weights)?;
        if let Some(noise) = noise {
            mix_noise(&mut weights, noise, &mut self.rng);
        }

        let choice = select_index(&weights, slot.temperature.current(), &mut self.rng)?;
        let cell = legal[choice];

        if record_traces {
            let mut distribution = vec![0.0; size * size];
            for (legal_cell, weight) in iter::zip(&legal, &weights) {
                distribution[legal_cell.index(size)] = *weight;
            }
            if let Some(trace) = &mut slot.trace {
                trace.push(MoveRecord {
                    encoding: encoding.clone(),
                    distribution,
                    mover: slot.board.to_move(),
                    chosen: cell,
                });
            }
        }

        slot.board.apply(cell).map_err(DriverError::IllegalMove)?;
        Ok(())
    }
}

/// Groups active boards by the identity of the policy seated to move, in
/// first-seen order.
fn group_by_seated_policy(
    batch: &GameBatch,
    active: &[usize],
) -> Vec<(SharedPolicy, Vec<usize>)> {
    let mut groups: Vec<(SharedPolicy, Vec<usize>)> = Vec::new();
    for &index in active {
        let slot = &batch.slots()[index];
        let policy = slot.seats.seated(slot.board.to_move());
        match groups
            .iter_mut()
            .find(|(grouped, _)| Arc::ptr_eq(grouped, policy))
        {
            Some((_, indices)) => indices.push(index),
            None => groups.push((Arc::clone(policy), vec![index])),
        }
    }
    groups
}

/// Scales the legal-cell mass back up to a probability distribution.
fn renormalize(weights: &mut [f32]) -> Result<(), DriverError> {
    let total: f32 = weights.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return Err(DriverError::DegenerateDistribution);
    }
    for weight in weights.iter_mut() {
        *weight /= total;
    }
    Ok(())
}

/// Replaces `noise.weight` of the distribution with a Dirichlet draw,
/// sampled as normalized Gamma variates so the dimension can follow the
/// legal-move count.
fn mix_noise(weights: &mut [f32], noise: NoiseSpec, rng: &mut Pcg32) {
    let mix = noise.weight.clamp(0.0, 1.0);
    if mix <= 0.0 {
        return;
    }
    let gamma = Gamma::new(noise.alpha, 1.0).expect("noise alpha must be positive and finite");
    let draws: Vec<f32> = weights.iter().map(|_| gamma.sample(rng)).collect();
    let total: f32 = draws.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return;
    }
    for (weight, draw) in iter::zip(weights.iter_mut(), draws) {
        *weight = (1.0 - mix) * *weight + mix * (draw / total);
    }
}

/// Picks a legal-cell index: arg-max at temperature zero, otherwise a sample
/// from the distribution sharpened by `1 / temperature`.
fn select_index(weights: &[f32], temperature: f32, rng: &mut Pcg32) -> Result<usize, DriverError> {
    if temperature <= 0.0 {
        return weights
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(index, _)| index)
            .ok_or(DriverError::DegenerateDistribution);
    }
    let sharpened: Vec<f32> = weights
        .iter()
        .map(|weight| weight.powf(1.0 / temperature))
        .collect();
    let distribution =
        WeightedIndex::new(&sharpened).map_err(|_| DriverError::DegenerateDistribution)?;
    Ok(distribution.sample(rng))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use hexzero_engine::{Board, Player};
    use hexzero_policy::{
        HighestCellPolicy, LowestCellPolicy, Policy, UniformRandomPolicy,
    };

    use crate::{GameSlot, PolicySeat, TemperatureState};

    use super::*;

    fn fixed_seed(tag: u8) -> GameSeed {
        GameSeed::from_bytes([tag; 16])
    }

    fn greedy_slot(size: usize, seats: PolicySeat) -> GameSlot {
        GameSlot::new(Board::new(size), seats, TemperatureState::greedy())
    }

    #[test]
    fn lowest_versus_highest_is_deterministic_on_3x3() {
        let seats = PolicySeat::new(Arc::new(LowestCellPolicy), Arc::new(HighestCellPolicy));
        let mut batch = GameBatch::new(vec![greedy_slot(3, seats)]);
        let mut driver = BatchedGameDriver::with_seed(DriverConfig::new(9), fixed_seed(1));
        driver.play_to_completion(&mut batch).unwrap();

        let board = batch.slots()[0].board();
        assert_eq!(board.winner(), Some(Player::Second));
        assert_eq!(board.move_count(), 6);
    }

    #[test]
    fn batch_order_is_preserved_across_staggered_finishes() {
        let sizes = [5, 2, 4, 3];
        let slots = sizes
            .iter()
            .map(|&size| {
                greedy_slot(size, PolicySeat::self_play(Arc::new(LowestCellPolicy)))
            })
            .collect();
        let mut batch = GameBatch::new(slots);
        let mut driver = BatchedGameDriver::with_seed(DriverConfig::new(25), fixed_seed(2));
        driver.play_to_completion(&mut batch).unwrap();

        for (slot, &size) in iter::zip(batch.slots(), &sizes) {
            assert_eq!(slot.board().size(), size);
            assert!(slot.board().is_terminal());
        }
    }

    #[test]
    fn round_cap_exhaustion_is_fatal() {
        let seats = PolicySeat::self_play(Arc::new(UniformRandomPolicy));
        let slot = GameSlot::new(Board::new(5), seats, TemperatureState::new(1.0, 1.0));
        let mut batch = GameBatch::new(vec![slot]);
        let mut driver = BatchedGameDriver::with_seed(DriverConfig::new(3), fixed_seed(3));

        let result = driver.play_to_completion(&mut batch);
        assert!(matches!(
            result,
            Err(DriverError::RoundCapExceeded { round_cap: 3 })
        ));
    }

    #[test]
    fn temperature_decays_once_per_active_round() {
        let seats = PolicySeat::self_play(Arc::new(LowestCellPolicy));
        let slot = GameSlot::new(Board::new(2), seats, TemperatureState::new(1.0, 0.5));
        let mut batch = GameBatch::new(vec![slot]);
        let mut driver = BatchedGameDriver::with_seed(DriverConfig::new(4), fixed_seed(4));
        driver.play_to_completion(&mut batch).unwrap();

        // The game lasts three rounds; decay applies after the first two,
        // not after the terminal one.
        assert_eq!(batch.slots()[0].board().move_count(), 3);
        let current = batch.slots()[0].temperature().current();
        assert!((current - 0.25).abs() < 1e-6);
    }

    #[derive(Debug)]
    struct CountingPolicy {
        calls: AtomicUsize,
    }

    impl Policy for CountingPolicy {
        fn evaluate(
            &self,
            batch: &[BoardEncoding],
        ) -> Result<Vec<MoveDistribution>, PolicyError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            LowestCellPolicy.evaluate(batch)
        }
    }

    #[test]
    fn one_inference_call_per_policy_per_round() {
        let policy: Arc<CountingPolicy> = Arc::new(CountingPolicy {
            calls: AtomicUsize::new(0),
        });
        let shared: SharedPolicy = policy.clone();
        let slots = vec![
            greedy_slot(3, PolicySeat::self_play(Arc::clone(&shared))),
            greedy_slot(2, PolicySeat::self_play(Arc::clone(&shared))),
        ];
        let mut batch = GameBatch::new(slots);
        let mut driver = BatchedGameDriver::with_seed(DriverConfig::new(9), fixed_seed(5));
        driver.play_to_completion(&mut batch).unwrap();

        let rounds = batch
            .slots()
            .iter()
            .map(|slot| slot.board().move_count())
            .max()
            .unwrap();
        assert_eq!(policy.calls.load(Ordering::Relaxed), rounds);
    }

    #[test]
    fn traces_record_every_decision_and_the_outcome() {
        let seats = PolicySeat::self_play(Arc::new(LowestCellPolicy));
        let mut batch = GameBatch::new(vec![greedy_slot(3, seats)]);
        let config = DriverConfig::new(9).with_traces();
        let mut driver = BatchedGameDriver::with_seed(config, fixed_seed(6));
        driver.play_to_completion(&mut batch).unwrap();

        let slot = &batch.slots()[0];
        let trace = slot.trace().unwrap();
        assert_eq!(trace.moves().len(), slot.board().move_count());
        assert_eq!(trace.winner(), slot.board().winner());
        for (ply, record) in trace.moves().iter().enumerate() {
            let stones = record
                .encoding
                .plane(Player::First)
                .iter()
                .chain(record.encoding.plane(Player::Second))
                .filter(|&&owned| owned)
                .count();
            assert_eq!(stones, ply);
            let mass: f32 = record.distribution.iter().sum();
            assert!((mass - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn noise_mixing_still_finishes_games() {
        let seats = PolicySeat::self_play(Arc::new(UniformRandomPolicy));
        let slot = GameSlot::new(Board::new(5), seats, TemperatureState::new(1.0, 0.95));
        let mut batch = GameBatch::new(vec![slot]);
        let config = DriverConfig::new(25).with_noise(NoiseSpec {
            alpha: 0.5,
            weight: 1.0,
        });
        let mut driver = BatchedGameDriver::with_seed(config, fixed_seed(7));
        driver.play_to_completion(&mut batch).unwrap();
        assert!(batch.slots()[0].board().winner().is_some());
    }

    #[test]
    fn degenerate_distribution_is_reported() {
        #[derive(Debug)]
        struct ZeroMassPolicy;
        impl Policy for ZeroMassPolicy {
            fn evaluate(
                &self,
                batch: &[BoardEncoding],
            ) -> Result<Vec<MoveDistribution>, PolicyError> {
                Ok(batch
                    .iter()
                    .map(|encoding| MoveDistribution::new(vec![0.0; encoding.cell_count()]))
                    .collect())
            }
        }

        let seats = PolicySeat::self_play(Arc::new(ZeroMassPolicy));
        let mut batch = GameBatch::new(vec![greedy_slot(3, seats)]);
        let mut driver = BatchedGameDriver::with_seed(DriverConfig::new(9), fixed_seed(8));
        let result = driver.play_to_completion(&mut batch);
        assert!(matches!(result, Err(DriverError::DegenerateDistribution)));
    }

    #[test]
    fn identical_seeds_replay_identically() {
        for _ in 0..2 {
            let play = |tag: u8| {
                let seats = PolicySeat::self_play(Arc::new(UniformRandomPolicy));
                let slot =
                    GameSlot::new(Board::new(4), seats, TemperatureState::new(1.0, 1.0));
                let mut batch = GameBatch::new(vec![slot]);
                let mut driver =
                    BatchedGameDriver::with_seed(DriverConfig::new(16), fixed_seed(tag));
                driver.play_to_completion(&mut batch).unwrap();
                let board = batch.slots()[0].board().clone();
                (board.move_count(), board.winner())
            };
            assert_eq!(play(9), play(9));
        }
    }
}
