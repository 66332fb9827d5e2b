use std::sync::Arc;

use hexzero_engine::{Board, Player};
use hexzero_policy::SharedPolicy;

use crate::GameTrace;

/// Which policy occupies each seat for one board instance.
///
/// Seats may differ per board within a batch, so a single round can mix
/// heterogeneous opponents.
#[derive(Debug, Clone)]
pub struct PolicySeat {
    first: SharedPolicy,
    second: SharedPolicy,
}

impl PolicySeat {
    #[must_use]
    pub fn new(first: SharedPolicy, second: SharedPolicy) -> Self {
        Self { first, second }
    }

    /// Both seats occupied by the same policy.
    #[must_use]
    pub fn self_play(policy: SharedPolicy) -> Self {
        let second = Arc::clone(&policy);
        Self::new(policy, second)
    }

    #[must_use]
    pub fn seated(&self, player: Player) -> &SharedPolicy {
        match player {
            Player::First => &self.first,
            Player::Second => &self.second,
        }
    }

    /// The same policies with the seats exchanged.
    #[must_use]
    pub fn swapped(&self) -> Self {
        Self::new(Arc::clone(&self.second), Arc::clone(&self.first))
    }
}

/// Per-board sampling temperature with a decay factor applied once per round
/// while the board stays active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureState {
    current: f32,
    decay: f32,
}

impl TemperatureState {
    #[must_use]
    pub const fn new(temperature: f32, decay: f32) -> Self {
        Self {
            current: temperature,
            decay,
        }
    }

    /// Temperature 0: arg-max selection from the first move on.
    #[must_use]
    pub const fn greedy() -> Self {
        Self::new(0.0, 1.0)
    }

    #[must_use]
    pub const fn current(&self) -> f32 {
        self.current
    }

    pub(crate) fn decay_once(&mut self) {
        self.current *= self.decay;
    }
}

/// One game instance: a board, the policies seated at it, its sampling
/// temperature, and (when recording) its trace.
#[derive(Debug, Clone)]
pub struct GameSlot {
    pub(crate) board: Board,
    pub(crate) seats: PolicySeat,
    pub(crate) temperature: TemperatureState,
    pub(crate) trace: Option<GameTrace>,
}

impl GameSlot {
    #[must_use]
    pub fn new(board: Board, seats: PolicySeat, temperature: TemperatureState) -> Self {
        Self {
            board,
            seats,
            temperature,
            trace: None,
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn temperature(&self) -> &TemperatureState {
        &self.temperature
    }

    /// The recorded trace, present when the driver ran with recording on.
    #[must_use]
    pub fn trace(&self) -> Option<&GameTrace> {
        self.trace.as_ref()
    }

    #[must_use]
    pub fn into_trace(self) -> Option<GameTrace> {
        self.trace
    }
}

/// An ordered collection of game slots advanced together.
///
/// Slot order is stable: results come back in the order boards were added,
/// regardless of how the driver groups inference calls or when individual
/// games finish.
#[derive(Debug, Clone)]
pub struct GameBatch {
    slots: Vec<GameSlot>,
}

impl GameBatch {
    #[must_use]
    pub fn new(slots: Vec<GameSlot>) -> Self {
        Self { slots }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn slots(&self) -> &[GameSlot] {
        &self.slots
    }

    #[must_use]
    pub fn into_slots(self) -> Vec<GameSlot> {
        self.slots
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [GameSlot] {
        &mut self.slots
    }

    /// Indices of boards that have not finished.
    #[must_use]
    pub fn active_indices(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| !slot.board.is_terminal())
            .map(|(index, _)| index)
            .collect()
    }
}
