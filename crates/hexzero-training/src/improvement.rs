//! The champion–challenger self-improvement state machine.
//!
//! One iteration: self-play data generation with the reigning champion in
//! both seats, an external training call, a color-swapped paired evaluation
//! of the result, and an accept/reject decision against a win-rate bar.
//! There is no built-in terminal condition; the loop's job is to keep the
//! champion chain moving forward, and callers bound a run with an iteration
//! count.

use std::{path::PathBuf, sync::Arc};

use hexzero_engine::Board;
use hexzero_evaluator::{
    EvaluationReport, EvaluatorConfig, OpeningStrategy, PairedEvaluator,
};
use hexzero_policy::SharedPolicy;
use hexzero_selfplay::{
    BatchedGameDriver, DriverConfig, GameBatch, GameSeed, GameSlot, GameTrace, NoiseSpec,
    PolicySeat, TemperatureState,
};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{
    ChampionChain, CheckpointId, IterationError, LoopState, PolicyStore, Trainer,
};

/// Immutable configuration shared by every loop iteration.
///
/// Per-iteration variation happens on local copies; nothing here is mutated
/// in place while the loop runs.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub board_size: usize,
    /// Self-play games generated per iteration.
    pub selfplay_games: usize,
    /// Games per evaluation pass.
    pub evaluation_games: usize,
    pub batch_size: usize,
    pub selfplay_temperature: f32,
    pub temperature_decay: f32,
    pub evaluation_temperature: f32,
    /// Exploration noise for self-play generation only.
    pub noise: Option<NoiseSpec>,
    /// Challenger win rate that must be exceeded for promotion.
    pub promotion_threshold: f64,
    pub openings: OpeningStrategy,
    pub round_cap: usize,
    pub seed_model: CheckpointId,
}

impl LoopConfig {
    /// Conventional defaults for a board size and seed model.
    #[must_use]
    pub fn new(board_size: usize, seed_model: CheckpointId) -> Self {
        Self {
            board_size,
            selfplay_games: 128,
            evaluation_games: 32,
            batch_size: 32,
            selfplay_temperature: 1.0,
            temperature_decay: 1.0,
            evaluation_temperature: 0.1,
            noise: None,
            promotion_threshold: 0.55,
            openings: OpeningStrategy::None,
            round_cap: board_size * board_size,
            seed_model,
        }
    }
}

/// What one iteration decided.
#[derive(Debug, Clone)]
pub struct IterationReport {
    pub iteration: u64,
    pub challenger: CheckpointId,
    pub evaluation: EvaluationReport,
    pub win_rate: f64,
    pub promoted: bool,
}

/// The self-improvement loop.
///
/// State transitions commit atomically: a failed iteration (training,
/// checkpoint loading, evaluation, or persistence) leaves the loop state and
/// the champion chain exactly as they were, so the same iteration index can
/// be retried.
#[derive(Debug)]
pub struct SelfImprovementLoop<S, T> {
    config: LoopConfig,
    store: S,
    trainer: T,
    state: LoopState,
    chain: ChampionChain,
    state_path: Option<PathBuf>,
    rng: Pcg32,
}

impl<S: PolicyStore, T: Trainer> SelfImprovementLoop<S, T> {
    /// Starts a fresh loop at the configured seed model.
    #[must_use]
    pub fn new(config: LoopConfig, store: S, trainer: T) -> Self {
        let state = LoopState::seeded(config.seed_model.clone());
        Self::with_state(config, store, trainer, state)
    }

    /// Resumes from previously persisted state.
    #[must_use]
    pub fn with_state(config: LoopConfig, store: S, trainer: T, state: LoopState) -> Self {
        let chain = ChampionChain::new(state.champion.clone());
        Self {
            config,
            store,
            trainer,
            state,
            chain,
            state_path: None,
            rng: Pcg32::from_seed(rand::rng().random::<GameSeed>().to_bytes()),
        }
    }

    /// Persists loop state to `path` at the end of every iteration.
    #[must_use]
    pub fn persist_to(mut self, path: PathBuf) -> Self {
        self.state_path = Some(path);
        self
    }

    /// Fixes the simulation seed for reproducible runs.
    #[must_use]
    pub fn with_seed(mut self, seed: GameSeed) -> Self {
        self.rng = Pcg32::from_seed(seed.to_bytes());
        self
    }

    #[must_use]
    pub fn state(&self) -> &LoopState {
        &self.state
    }

    #[must_use]
    pub fn chain(&self) -> &ChampionChain {
        &self.chain
    }

    #[must_use]
    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Runs `iterations` more iterations, stopping at the first failure.
    pub fn run(&mut self, iterations: u64) -> Result<Vec<IterationReport>, IterationError> {
        let mut reports = Vec::new();
        for _ in 0..iterations {
            reports.push(self.run_iteration()?);
        }
        Ok(reports)
    }

    /// Executes one full iteration and commits the resulting state.
    pub fn run_iteration(&mut self) -> Result<IterationReport, IterationError> {
        let iteration = self.state.iteration;
        let champion = self.store.load(&self.state.champion)?;

        let dataset = self.generate_self_play(&champion)?;

        let base = self
            .state
            .last_challenger
            .clone()
            .unwrap_or_else(|| self.config.seed_model.clone());
        let challenger_id = self.trainer.train(&dataset, &base)?;
        let challenger = self.store.load(&challenger_id)?;

        let evaluator = PairedEvaluator::with_seed(self.evaluator_config(), self.rng.random());
        let evaluation = evaluator.run(&challenger, &champion)?;
        let win_rate = evaluation.challenger_win_rate();
        let promoted = win_rate > self.config.promotion_threshold;

        // Commit: build the next state, persist it, and only then mutate the
        // in-memory state and chain.
        let mut next = self.state.clone();
        next.iteration = iteration + 1;
        next.last_challenger = Some(challenger_id.clone());
        if promoted {
            next.champion = challenger_id.clone();
            next.rejection_streak = 0;
        } else {
            next.rejection_streak += 1;
        }
        if let Some(path) = &self.state_path {
            next.save(path)?;
        }
        if promoted {
            self.chain.promote(challenger_id.clone(), iteration);
        }
        self.state = next;

        Ok(IterationReport {
            iteration,
            challenger: challenger_id,
            win_rate,
            promoted,
            evaluation,
        })
    }

    /// Plays the configured number of self-play games with the champion in
    /// both seats, recording a trace per game.
    fn generate_self_play(
        &mut self,
        champion: &SharedPolicy,
    ) -> Result<Vec<GameTrace>, IterationError> {
        let mut traces = Vec::with_capacity(self.config.selfplay_games);
        let mut remaining = self.config.selfplay_games;
        while remaining > 0 {
            let chunk = self.config.batch_size.clamp(1, remaining);
            let slots = (0..chunk)
                .map(|_| {
                    GameSlot::new(
                        Board::new(self.config.board_size),
                        PolicySeat::self_play(Arc::clone(champion)),
                        TemperatureState::new(
                            self.config.selfplay_temperature,
                            self.config.temperature_decay,
                        ),
                    )
                })
                .collect();
            let mut batch = GameBatch::new(slots);
            let mut driver_config = DriverConfig::new(self.config.round_cap).with_traces();
            if let Some(noise) = self.config.noise {
                driver_config = driver_config.with_noise(noise);
            }
            let mut driver = BatchedGameDriver::with_seed(driver_config, self.rng.random());
            driver.play_to_completion(&mut batch)?;
            traces.extend(batch.into_slots().into_iter().filter_map(GameSlot::into_trace));
            remaining -= chunk;
        }
        Ok(traces)
    }

    fn evaluator_config(&self) -> EvaluatorConfig {
        EvaluatorConfig {
            board_size: self.config.board_size,
            games: self.config.evaluation_games,
            batch_size: self.config.batch_size,
            temperature: self.config.evaluation_temperature,
            temperature_decay: self.config.temperature_decay,
            openings: self.config.openings,
            round_cap: self.config.round_cap,
        }
    }
}
