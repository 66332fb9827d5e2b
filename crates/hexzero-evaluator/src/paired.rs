//! Color-swapped paired evaluation of two policies.
//!
//! A run plays the requested number of games twice, once per seating, so
//! first-move advantage cancels when the two passes are aggregated. Games
//! can start from an exhaustively enumerated set of fixed openings to bound
//! variance further; with openings of odd length the physical seats flip so
//! that the pass label still names the policy that moves next.

use std::sync::Arc;

use hexzero_engine::{Board, Opening, Player, opening};
use hexzero_policy::SharedPolicy;
use hexzero_selfplay::{
    BatchedGameDriver, DriverConfig, DriverError, GameBatch, GameSeed, GameSlot, PolicySeat,
    TemperatureState,
};
use rand::{Rng as _, SeedableRng as _, seq::SliceRandom as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{EvalPass, WinTable};

/// How starting positions are chosen for an evaluation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpeningStrategy {
    /// Every game starts from an empty board.
    None,
    /// Exhaustively enumerate all openings of `plies` moves, shuffle them
    /// once per run, and cap the game count to the number of openings.
    FirstKMoves { plies: usize },
}

/// Paired-evaluation settings. `games` is the per-pass game count.
#[derive(Debug, Clone)]
pub struct EvaluatorConfig {
    pub board_size: usize,
    pub games: usize,
    pub batch_size: usize,
    pub temperature: f32,
    pub temperature_decay: f32,
    pub openings: OpeningStrategy,
    pub round_cap: usize,
}

impl EvaluatorConfig {
    /// Conventional settings for a board size and per-pass game count.
    #[must_use]
    pub fn new(board_size: usize, games: usize) -> Self {
        Self {
            board_size,
            games,
            batch_size: 32,
            temperature: 0.1,
            temperature_decay: 1.0,
            openings: OpeningStrategy::None,
            round_cap: board_size * board_size,
        }
    }
}

/// Outcome of one paired evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Games actually played per pass (the requested count, capped to the
    /// number of available openings).
    pub games_per_pass: usize,
    pub table: WinTable,
}

impl EvaluationReport {
    #[must_use]
    pub fn challenger_win_rate(&self) -> f64 {
        self.table.challenger_win_rate()
    }

    #[must_use]
    pub fn signed_chi_squared(&self) -> f64 {
        self.table.signed_chi_squared()
    }
}

/// Measures relative strength of a challenger against an incumbent with
/// positional bias cancelled.
#[derive(Debug)]
pub struct PairedEvaluator {
    config: EvaluatorConfig,
    seed: GameSeed,
}

impl PairedEvaluator {
    /// Creates an evaluator seeded from the OS.
    #[must_use]
    pub fn new(config: EvaluatorConfig) -> Self {
        Self::with_seed(config, rand::rng().random())
    }

    /// Like [`Self::new`], but reproducible.
    #[must_use]
    pub const fn with_seed(config: EvaluatorConfig, seed: GameSeed) -> Self {
        Self { config, seed }
    }

    /// Runs both seating passes and aggregates the win table.
    pub fn run(
        &self,
        challenger: &SharedPolicy,
        incumbent: &SharedPolicy,
    ) -> Result<EvaluationReport, DriverError> {
        let mut rng = Pcg32::from_seed(self.seed.to_bytes());
        let openings = self.prepare_openings(&mut rng);
        let games = match &openings {
            Some(list) => self.config.games.min(list.len()),
            None => self.config.games,
        };

        let mut table = WinTable::new();
        for pass in [EvalPass::ChallengerOpens, EvalPass::IncumbentOpens] {
            self.play_pass(
                pass,
                games,
                openings.as_deref(),
                challenger,
                incumbent,
                &mut rng,
                &mut table,
            )?;
        }
        Ok(EvaluationReport {
            games_per_pass: games,
            table,
        })
    }

    fn prepare_openings(&self, rng: &mut Pcg32) -> Option<Vec<Opening>> {
        match self.config.openings {
            OpeningStrategy::None => None,
            OpeningStrategy::FirstKMoves { plies } => {
                let mut openings = opening::first_k_moves(self.config.board_size, plies);
                openings.shuffle(rng);
                Some(openings)
            }
        }
    }

    #[expect(clippy::too_many_arguments)]
    fn play_pass(
        &self,
        pass: EvalPass,
        games: usize,
        openings: Option<&[Opening]>,
        challenger: &SharedPolicy,
        incumbent: &SharedPolicy,
        rng: &mut Pcg32,
        table: &mut WinTable,
    ) -> Result<(), DriverError> {
        let opened_plies = openings
            .and_then(<[Opening]>::first)
            .map_or(0, Opening::len);
        let challenger_player = if challenger_opens_as_first(pass, opened_plies) {
            Player::First
        } else {
            Player::Second
        };
        let seats = match challenger_player {
            Player::First => PolicySeat::new(Arc::clone(challenger), Arc::clone(incumbent)),
            Player::Second => PolicySeat::new(Arc::clone(incumbent), Arc::clone(challenger)),
        };

        let mut played = 0;
        while played < games {
            let chunk = self.config.batch_size.clamp(1, games - played);
            let slots = (played..played + chunk)
                .map(|game_number| -> Result<GameSlot, DriverError> {
                    let board = match openings {
                        Some(list) => {
                            Board::with_opening(self.config.board_size, &list[game_number])
                                .map_err(DriverError::IllegalMove)?
                        }
                        None => Board::new(self.config.board_size),
                    };
                    Ok(GameSlot::new(
                        board,
                        seats.clone(),
                        TemperatureState::new(
                            self.config.temperature,
                            self.config.temperature_decay,
                        ),
                    ))
                })
                .collect::<Result<Vec<_>, _>>()?;

            let mut batch = GameBatch::new(slots);
            let mut driver =
                BatchedGameDriver::with_seed(DriverConfig::new(self.config.round_cap), rng.random());
            driver.play_to_completion(&mut batch)?;

            for slot in batch.slots() {
                let challenger_won = slot.board().winner() == Some(challenger_player);
                table.record(pass, challenger_won);
            }
            played += chunk;
        }
        Ok(())
    }
}

/// Seat assignment for a pass: the pass label names the policy that moves
/// next once the opening is on the board, so odd-length openings flip the
/// physical seats.
fn challenger_opens_as_first(pass: EvalPass, opened_plies: usize) -> bool {
    let odd_opening = opened_plies % 2 == 1;
    match pass {
        EvalPass::ChallengerOpens => !odd_opening,
        EvalPass::IncumbentOpens => odd_opening,
    }
}

#[cfg(test)]
mod tests {
    use hexzero_policy::{HighestCellPolicy, LowestCellPolicy, UniformRandomPolicy};

    use super::*;

    fn fixed_seed(tag: u8) -> GameSeed {
        GameSeed::from_bytes([tag; 16])
    }

    fn greedy_config(board_size: usize, games: usize) -> EvaluatorConfig {
        let mut config = EvaluatorConfig::new(board_size, games);
        config.temperature = 0.0;
        config
    }

    #[test]
    fn lowest_versus_highest_regression_table_on_3x3() {
        // With these two deterministic policies on 3x3, the side moving
        // second always completes its edge connection one ply earlier, in
        // both passes. The whole table is forced.
        let evaluator = PairedEvaluator::with_seed(greedy_config(3, 10), fixed_seed(1));
        let challenger: SharedPolicy = Arc::new(LowestCellPolicy);
        let incumbent: SharedPolicy = Arc::new(HighestCellPolicy);
        let report = evaluator.run(&challenger, &incumbent).unwrap();

        assert_eq!(report.games_per_pass, 10);
        assert_eq!(report.table.counts(), [[0, 10], [0, 10]]);
        assert_eq!(report.challenger_win_rate(), 0.5);
        assert_eq!(report.signed_chi_squared(), 0.0);
    }

    #[test]
    fn identical_policies_sit_exactly_at_one_half() {
        let evaluator = PairedEvaluator::with_seed(greedy_config(3, 4), fixed_seed(2));
        let challenger: SharedPolicy = Arc::new(LowestCellPolicy);
        let incumbent: SharedPolicy = Arc::new(LowestCellPolicy);
        let report = evaluator.run(&challenger, &incumbent).unwrap();

        assert_eq!(report.challenger_win_rate(), 0.5);
        assert_eq!(report.signed_chi_squared(), 0.0);
        assert_eq!(report.table.total_games(), 8);
    }

    #[test]
    fn opening_enumeration_caps_the_game_count() {
        let mut config = greedy_config(3, 100);
        config.openings = OpeningStrategy::FirstKMoves { plies: 1 };
        let evaluator = PairedEvaluator::with_seed(config, fixed_seed(3));
        let challenger: SharedPolicy = Arc::new(UniformRandomPolicy);
        let incumbent: SharedPolicy = Arc::new(UniformRandomPolicy);
        let report = evaluator.run(&challenger, &incumbent).unwrap();

        // Nine one-ply openings exist on 3x3.
        assert_eq!(report.games_per_pass, 9);
        assert_eq!(report.table.total_games(), 18);
    }

    #[test]
    fn two_ply_openings_keep_the_requested_count() {
        let mut config = greedy_config(3, 12);
        config.openings = OpeningStrategy::FirstKMoves { plies: 2 };
        config.batch_size = 5;
        let evaluator = PairedEvaluator::with_seed(config, fixed_seed(4));
        let challenger: SharedPolicy = Arc::new(UniformRandomPolicy);
        let incumbent: SharedPolicy = Arc::new(UniformRandomPolicy);
        let report = evaluator.run(&challenger, &incumbent).unwrap();

        assert_eq!(report.games_per_pass, 12);
        assert_eq!(report.table.total_games(), 24);
    }

    #[test]
    fn same_seed_reproduces_the_same_table() {
        let run = || {
            let mut config = EvaluatorConfig::new(4, 6);
            config.temperature = 1.0;
            let evaluator = PairedEvaluator::with_seed(config, fixed_seed(5));
            let challenger: SharedPolicy = Arc::new(UniformRandomPolicy);
            let incumbent: SharedPolicy = Arc::new(UniformRandomPolicy);
            evaluator.run(&challenger, &incumbent).unwrap().table
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn report_serde_round_trip() {
        let report = EvaluationReport {
            games_per_pass: 3,
            table: WinTable::from_counts([[2, 1], [0, 3]]),
        };
        let json = serde_json::to_string(&report).unwrap();
        let back: EvaluationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.table, report.table);
        assert_eq!(back.games_per_pass, 3);
    }
}
