//! Seat-swapped win accounting and the signed chi-squared statistic.

use serde::{Deserialize, Serialize};

/// Which policy opens the games of an evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvalPass {
    ChallengerOpens,
    IncumbentOpens,
}

/// 2×2 win counts from a color-swapped paired evaluation.
///
/// Rows index the pass, columns are laid out so challenger wins land on the
/// main diagonal:
///
/// ```text
/// a = counts[0][0]  challenger wins, challenger opening
/// b = counts[0][1]  incumbent wins,  challenger opening
/// c = counts[1][0]  incumbent wins,  incumbent opening
/// d = counts[1][1]  challenger wins, incumbent opening
/// ```
///
/// The strength signal is `4·adbc·|adbc| / ((a+b+c+d)·(a+d)·(b+c) + 1)` with
/// `adbc = a·d − b·c`: positive when the challenger wins consistently under
/// both color assignments, zero under pure first-move advantage, and the
/// `+1` keeps the denominator alive when one side never wins. This — not a
/// raw win percentage — is the principled comparison, because it is
/// invariant to which policy is labeled as starting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinTable {
    counts: [[u64; 2]; 2],
}

impl WinTable {
    #[must_use]
    pub const fn new() -> Self {
        Self { counts: [[0; 2]; 2] }
    }

    /// Builds a table directly from counts laid out as documented above.
    #[must_use]
    pub const fn from_counts(counts: [[u64; 2]; 2]) -> Self {
        Self { counts }
    }

    /// Records one finished game.
    pub fn record(&mut self, pass: EvalPass, challenger_won: bool) {
        let (row, column) = match (pass, challenger_won) {
            (EvalPass::ChallengerOpens, true) => (0, 0),
            (EvalPass::ChallengerOpens, false) => (0, 1),
            (EvalPass::IncumbentOpens, false) => (1, 0),
            (EvalPass::IncumbentOpens, true) => (1, 1),
        };
        self.counts[row][column] += 1;
    }

    #[must_use]
    pub const fn counts(&self) -> [[u64; 2]; 2] {
        self.counts
    }

    #[must_use]
    pub fn total_games(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    /// Challenger wins summed over both passes.
    #[must_use]
    pub const fn challenger_wins(&self) -> u64 {
        self.counts[0][0] + self.counts[1][1]
    }

    /// Challenger wins over total games. Both passes weigh equally, so a
    /// policy cannot score above 0.5 by exploiting first-move advantage
    /// alone. Returns 0 when no games were played.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn challenger_win_rate(&self) -> f64 {
        let total = self.total_games();
        if total == 0 {
            return 0.0;
        }
        self.challenger_wins() as f64 / total as f64
    }

    /// Signed chi-squared strength signal; see the type-level docs.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn signed_chi_squared(&self) -> f64 {
        let [[a, b], [c, d]] = self.counts;
        let (a, b, c, d) = (a as f64, b as f64, c as f64, d as f64);
        let adbc = a * d - b * c;
        4.0 * adbc * adbc.abs() / ((a + b + c + d) * (a + d) * (b + c) + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_table_scores_zero() {
        let table = WinTable::from_counts([[5, 5], [5, 5]]);
        assert_eq!(table.signed_chi_squared(), 0.0);
        assert_eq!(table.challenger_win_rate(), 0.5);
    }

    #[test]
    fn zero_whenever_the_cross_products_match() {
        // a*d == b*c with unequal cells.
        let table = WinTable::from_counts([[2, 4], [3, 6]]);
        assert_eq!(table.signed_chi_squared(), 0.0);
    }

    #[test]
    fn challenger_sweep_is_strongly_positive() {
        let table = WinTable::from_counts([[10, 0], [0, 10]]);
        assert_eq!(table.challenger_win_rate(), 1.0);
        assert_eq!(table.signed_chi_squared(), 40_000.0);
    }

    #[test]
    fn incumbent_sweep_is_strongly_negative() {
        let table = WinTable::from_counts([[0, 10], [10, 0]]);
        assert_eq!(table.challenger_win_rate(), 0.0);
        assert_eq!(table.signed_chi_squared(), -40_000.0);
    }

    #[test]
    fn pure_first_move_advantage_cancels_out() {
        // Whoever opens wins: the challenger sweeps pass one, the incumbent
        // sweeps pass two.
        let table = WinTable::from_counts([[10, 0], [10, 0]]);
        assert_eq!(table.challenger_win_rate(), 0.5);
        assert_eq!(table.signed_chi_squared(), 0.0);
    }

    #[test]
    fn record_places_wins_on_the_diagonal() {
        let mut table = WinTable::new();
        table.record(EvalPass::ChallengerOpens, true);
        table.record(EvalPass::ChallengerOpens, false);
        table.record(EvalPass::IncumbentOpens, true);
        table.record(EvalPass::IncumbentOpens, false);
        assert_eq!(table.counts(), [[1, 1], [1, 1]]);
        assert_eq!(table.challenger_wins(), 2);
        assert_eq!(table.total_games(), 4);
    }

    #[test]
    fn empty_table_is_inert() {
        let table = WinTable::new();
        assert_eq!(table.challenger_win_rate(), 0.0);
        assert_eq!(table.signed_chi_squared(), 0.0);
    }
}
