//! Game state (§4.4 C4): the per-session mutable record owned exclusively by one [`Session`].
//!
//! [`Session`]: crate::session::Session

use std::collections::HashSet;

use crate::meld::Meld;
use crate::tile::{to_kind_counts, KindIndex, ServerIndex};
use crate::win::wait_set;

/// Tiles drawable from the wall at the start of a round, before any draw.
pub const INITIAL_LIVE_WALL: i32 = 70;

/// Per-session mutable record: own hand, melds, riichi flag, live-wall counter, wait set, player
/// identity, room code.
///
/// Reset fields (`hand`, `in_riichi`, `live_wall`, `melds`, `wait`) are cleared on every round
/// start via [`GameState::reset_round`]; `name` and `room` persist for the life of the session.
#[derive(Debug, Clone, Default)]
pub struct GameState {
    pub name: String,
    pub room: String,
    pub hand: Vec<ServerIndex>,
    pub in_riichi: bool,
    pub live_wall: i32,
    pub melds: Vec<Meld>,
    pub wait: HashSet<KindIndex>,
}

impl GameState {
    /// Constructs a fresh state for a newly joined session, identity fields set from the AI's
    /// hello, everything else at its round-start default.
    pub fn new(name: String, room: String) -> Self {
        GameState {
            name,
            room,
            hand: Vec::new(),
            in_riichi: false,
            live_wall: INITIAL_LIVE_WALL,
            melds: Vec::new(),
            wait: HashSet::new(),
        }
    }

    /// Clears round-scoped fields at the start of each round, per spec.md §4.4.
    pub fn reset_round(&mut self) {
        self.hand.clear();
        self.in_riichi = false;
        self.live_wall = INITIAL_LIVE_WALL;
        self.melds.clear();
        self.wait.clear();
    }

    /// Recomputes `wait` from the current hand, via the C3 ready evaluator.
    pub fn recompute_wait(&mut self) {
        let mut counts = to_kind_counts(&self.hand);
        self.wait = wait_set(&mut counts).into_iter().collect();
    }

    /// `hand_kind_count + meld_exposed_count` for a given kind, used by invariant checks and by
    /// C5 candidate enumerators (e.g. ankan requires a hand count of 4).
    pub fn kind_count_in_hand(&self, kind: KindIndex) -> usize {
        self.hand.iter().filter(|&&t| t / 4 == kind).count()
    }
}
