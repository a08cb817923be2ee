//! Action enumerator (§4.5 C5): given the current [`GameState`] and an incoming server event,
//! produces the list of legal AI actions and the forbidden-discard ("cannot_dahai") set.
//!
//! Each candidate family is a standalone function, assembled by the caller (C6) in the fixed
//! order from spec.md §3: hora, reach, ryukyoku, ankan, kakan, pon, daiminkan, chi.

use std::collections::HashSet;

use itertools::Itertools;

use crate::meld::Meld;
use crate::state::GameState;
use crate::tile::{kind_of, to_kind_counts, KindIndex, ServerIndex};
use crate::win::wait_set;

/// Option bits carried on an own-draw event (`t` field).
pub mod draw_bits {
    pub const HORA: u32 = 1 << 4;
    pub const REACH: u32 = 1 << 5;
    pub const RYUKYOKU: u32 = 1 << 6;
}

/// Option bits carried on an opponent-discard event (`t` field).
pub mod discard_bits {
    pub const PON: u32 = 1 << 0;
    pub const DAIMINKAN: u32 = 1 << 1;
    pub const CHI: u32 = 1 << 2;
    pub const HORA: u32 = 1 << 3;
}

/// One legal action offered to the AI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PossibleAction {
    Hora,
    Reach,
    Ryukyoku,
    Ankan { tiles: [ServerIndex; 4] },
    Kakan { added: ServerIndex, pon_tiles: [ServerIndex; 3] },
    Pon { consumed: [ServerIndex; 2] },
    Daiminkan { consumed: [ServerIndex; 3] },
    Chi { consumed: [ServerIndex; 2] },
}

/// Ankan candidates: every kind held 4x in hand, gated on `live_wall > 0`.
///
/// Under riichi, candidates are further restricted to the kind of the tile just drawn, and only
/// offered if removing all four copies leaves the wait set unchanged (no okurikan).
pub fn ankan_candidates(state: &GameState, just_drawn: ServerIndex) -> Vec<PossibleAction> {
    if state.live_wall <= 0 {
        return Vec::new();
    }
    let counts = to_kind_counts(&state.hand);
    let mut kinds: Vec<KindIndex> = (0..34).filter(|&k| counts[k as usize] == 4).collect();

    if state.in_riichi {
        let drawn_kind = kind_of(just_drawn);
        kinds.retain(|&k| k == drawn_kind);
        kinds.retain(|&k| {
            let mut h = counts;
            h[k as usize] = 0;
            let new_wait: HashSet<KindIndex> = wait_set(&mut h).into_iter().collect();
            new_wait == state.wait
        });
    }

    kinds
        .into_iter()
        .map(|k| {
            let tiles: Vec<ServerIndex> =
                state.hand.iter().copied().filter(|&t| kind_of(t) == k).collect();
            PossibleAction::Ankan { tiles: tiles.try_into().unwrap() }
        })
        .collect()
}

/// Kakan candidates: one per existing pon whose kind has a matching extra copy still in hand.
///
/// `pon_tiles` carries the existing pon's three exposed tiles so the AI can identify which pon is
/// being promoted (§6: `consumed` on the wire is the pon's tiles, `pai` is the added tile).
///
/// Gated on `live_wall > 0`, same as ankan (§9 Design Notes documents this as asymmetric with
/// daiminkan, which is *not* gated -- see [`daiminkan_candidates`]).
pub fn kakan_candidates(state: &GameState) -> Vec<PossibleAction> {
    if state.live_wall <= 0 {
        return Vec::new();
    }
    state
        .melds
        .iter()
        .filter_map(|meld| match meld {
            Meld::Pon { tiles, .. } => {
                let pon_kind = kind_of(tiles[0]);
                state
                    .hand
                    .iter()
                    .copied()
                    .find(|&t| kind_of(t) == pon_kind)
                    .map(|added| PossibleAction::Kakan { added, pon_tiles: *tiles })
            }
            _ => None,
        })
        .collect()
}

/// Pon candidates: every unordered pair of hand tiles matching the discarded kind.
pub fn pon_candidates(state: &GameState, discarded: ServerIndex) -> Vec<PossibleAction> {
    let kind = kind_of(discarded);
    let copies: Vec<ServerIndex> =
        state.hand.iter().copied().filter(|&t| kind_of(t) == kind).collect();
    copies
        .into_iter()
        .combinations(2)
        .map(|pair| PossibleAction::Pon { consumed: [pair[0], pair[1]] })
        .collect()
}

/// Daiminkan candidates: offered iff exactly the three remaining copies of the kind are in hand.
///
/// Per §9's Open Question, this is *not* gated on `live_wall`, unlike [`ankan_candidates`] and
/// [`kakan_candidates`] -- the source gates the enumerator's kan variants but not this one, and
/// that asymmetry is preserved rather than "fixed".
pub fn daiminkan_candidates(state: &GameState, discarded: ServerIndex) -> Vec<PossibleAction> {
    let kind = kind_of(discarded);
    let copies: Vec<ServerIndex> =
        state.hand.iter().copied().filter(|&t| kind_of(t) == kind).collect();
    if copies.len() == 3 {
        vec![PossibleAction::Daiminkan { consumed: copies.try_into().unwrap() }]
    } else {
        Vec::new()
    }
}

/// Chi candidates: every pair of hand tiles that, with the discarded tile, forms a same-suit run
/// of three consecutive kinds (no wrap across suits, no honors).
pub fn chi_candidates(state: &GameState, discarded: ServerIndex) -> Vec<PossibleAction> {
    let kind = kind_of(discarded) as i32;
    let suit = kind / 9;
    if suit >= 3 {
        return Vec::new(); // honors admit no runs
    }
    let suit_lo = suit * 9;
    let suit_hi = suit_lo + 8;

    let mut out = Vec::new();
    for (d1, d2) in [(-2, -1), (-1, 1), (1, 2)] {
        let k1 = kind + d1;
        let k2 = kind + d2;
        if k1 < suit_lo || k1 > suit_hi || k2 < suit_lo || k2 > suit_hi {
            continue;
        }
        let (k1, k2) = (k1 as KindIndex, k2 as KindIndex);
        let t1_options: Vec<ServerIndex> =
            state.hand.iter().copied().filter(|&t| kind_of(t) == k1).collect();
        let t2_options: Vec<ServerIndex> =
            state.hand.iter().copied().filter(|&t| kind_of(t) == k2).collect();
        for &t1 in &t1_options {
            for &t2 in &t2_options {
                out.push(PossibleAction::Chi { consumed: [t1, t2] });
            }
        }
    }
    out
}

/// Assembles the possible-action list for an own draw event, in spec.md §3 order.
pub fn draw_options(state: &GameState, just_drawn: ServerIndex, t: u32) -> Vec<PossibleAction> {
    let mut out = Vec::new();
    if t & draw_bits::HORA != 0 {
        out.push(PossibleAction::Hora);
    }
    if t & draw_bits::REACH != 0 {
        out.push(PossibleAction::Reach);
    }
    if t & draw_bits::RYUKYOKU != 0 {
        out.push(PossibleAction::Ryukyoku);
    }
    out.extend(ankan_candidates(state, just_drawn));
    out.extend(kakan_candidates(state));
    out
}

/// Assembles the possible-action list for an opponent-discard event, in spec.md §3 order.
pub fn discard_options(state: &GameState, discarded: ServerIndex, t: u32) -> Vec<PossibleAction> {
    let mut out = Vec::new();
    if t & discard_bits::HORA != 0 {
        out.push(PossibleAction::Hora);
    }
    if t & discard_bits::PON != 0 {
        out.extend(pon_candidates(state, discarded));
    }
    if t & discard_bits::DAIMINKAN != 0 {
        out.extend(daiminkan_candidates(state, discarded));
    }
    if t & discard_bits::CHI != 0 {
        out.extend(chi_candidates(state, discarded));
    }
    out
}

/// Forbidden-discard kinds following a just-applied pon or chi meld (empty for any other variant).
///
/// - **Pon:** the fourth copy of the called kind, if it is (unusually) still in hand -- prevents
///   an instant kakan of the meld just called.
/// - **Chi:** every hand tile of the called kind, plus -- when the called tile occupies the
///   lowest position of the run -- every hand tile three kinds above (the other end of what would
///   have been a two-sided wait). The symmetric "three kinds below" branch for the highest
///   position is ported exactly as the reference decoder has it: gated on the called kind's suit
///   index being greater than 2, which never holds for a suited tile (chi never applies to
///   honors), so that branch is dead in practice and only the low-end case ever contributes. This
///   is a faithful port, not an oversight -- see DESIGN.md.
pub fn cannot_dahai_after_call(state: &GameState, meld: &Meld) -> HashSet<KindIndex> {
    match *meld {
        Meld::Pon { unused, .. } => {
            if state.hand.contains(&unused) {
                HashSet::from([kind_of(unused)])
            } else {
                HashSet::new()
            }
        }
        Meld::Chi { tiles, r, .. } => {
            let called_kind = kind_of(tiles[0]);
            let mut forbidden = HashSet::new();
            forbidden.insert(called_kind);
            if r == 0 {
                forbidden.insert(called_kind + 3);
            } else if r == 2 && called_kind / 9 > 2 {
                forbidden.insert(called_kind - 3);
            }
            forbidden.retain(|&k| state.hand.iter().any(|&t| kind_of(t) == k));
            forbidden
        }
        _ => HashSet::new(),
    }
}

/// Forbidden-discard kinds after declaring riichi step 1: every kind whose removal would leave
/// the hand not ready.
pub fn cannot_dahai_after_riichi_step1(state: &GameState) -> HashSet<KindIndex> {
    let mut counts = to_kind_counts(&state.hand);
    let mut forbidden = HashSet::new();
    let mut checked = HashSet::new();
    for &t in &state.hand {
        let k = kind_of(t);
        if !checked.insert(k) {
            continue;
        }
        counts[k as usize] -= 1;
        if wait_set(&mut counts).is_empty() {
            forbidden.insert(k);
        }
        counts[k as usize] += 1;
    }
    forbidden
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn state_with_hand(hand: Vec<ServerIndex>) -> GameState {
        let mut state = GameState::new("a".to_string(), "0000_0".to_string());
        state.hand = hand;
        state
    }

    #[test]
    fn ankan_offered_for_a_concealed_quad() {
        let mut state = state_with_hand(vec![0, 1, 2, 3, 40, 41]);
        state.live_wall = 30;
        let actions = ankan_candidates(&state, 40);
        assert_eq!(actions.len(), 1);
        match &actions[0] {
            PossibleAction::Ankan { tiles } => {
                let mut sorted = *tiles;
                sorted.sort_unstable();
                assert_eq!(sorted, [0, 1, 2, 3]);
            }
            other => panic!("expected Ankan, got {other:?}"),
        }
    }

    #[test]
    fn ankan_blocked_when_live_wall_exhausted() {
        let mut state = state_with_hand(vec![0, 1, 2, 3]);
        state.live_wall = 0;
        assert!(ankan_candidates(&state, 0).is_empty());
    }

    /// Shared fixture: a riichi hand tenpai on 3s (kind 20) via a tanki wait, with 1m held as a
    /// triplet (3 copies) that is orthogonal to the wait -- drawing the 4th 1m and removing the
    /// whole kind for an ankan leaves the 3s tanki wait untouched.
    fn tanki_wait_with_orthogonal_triplet() -> GameState {
        let mut state = state_with_hand(vec![
            0, 1, 2, // 1m x3 (the ankan candidate, not load-bearing for the wait)
            36, 40, 44, // 1p2p3p
            48, 52, 56, // 4p5p6p
            60, 64, 68, // 7p8p9p
            80, // 3s tanki
        ]);
        state.in_riichi = true;
        state.live_wall = 10;
        state.wait = HashSet::from([20]); // precomputed pre-draw, per §4.4 (fixed until next discard)
        state
    }

    #[test]
    fn okurikan_forbidden_when_ankan_would_change_wait() {
        let mut state = tanki_wait_with_orthogonal_triplet();
        state.hand.push(3); // draw the 4th 1m
        let actions = ankan_candidates(&state, 3);
        assert_eq!(actions.len(), 1);
    }

    #[test]
    fn okurikan_blocked_when_stored_wait_disagrees_with_recomputed_wait() {
        // Same hand/draw as above, but the stored wait is deliberately wrong (as it would be if
        // the 1m quad actually were load-bearing for it) to exercise the blocking branch.
        let mut state = tanki_wait_with_orthogonal_triplet();
        state.wait = HashSet::from([9]); // does not match the {20} the evaluator actually finds
        state.hand.push(3);
        let actions = ankan_candidates(&state, 3);
        assert!(actions.is_empty());
    }

    #[test]
    fn pon_enumerates_unordered_pairs() {
        let state = state_with_hand(vec![0, 1, 2]); // three copies of 1m
        let actions = pon_candidates(&state, 3); // discard the fourth 1m
        assert_eq!(actions.len(), 3); // C(3,2)
    }

    #[test]
    fn daiminkan_requires_exactly_three_copies() {
        let state = state_with_hand(vec![0, 1, 2]);
        let actions = daiminkan_candidates(&state, 3);
        assert_eq!(actions.len(), 1);
    }

    #[test]
    fn chi_candidates_respect_suit_and_range_boundaries() {
        // hand has 2m and 3m; opponent discards 1m (their call of 1m via hand's 2m,3m only valid
        // shape: 1-2-3).
        let state = state_with_hand(vec![4, 8]); // 2m, 3m
        let actions = chi_candidates(&state, 0); // discard 1m
        assert_eq!(actions.len(), 1);
        match &actions[0] {
            PossibleAction::Chi { consumed } => {
                assert_eq!([kind_of(consumed[0]), kind_of(consumed[1])], [1, 2]);
            }
            other => panic!("expected Chi, got {other:?}"),
        }
    }

    #[test]
    fn chi_never_wraps_across_suit_boundary() {
        // hand has 9m (kind 8) and 1p (kind 9); discard is 8m (kind 7) -- a naive +1/+2 scan
        // must not treat 9m,1p as consecutive with 8m.
        let state = state_with_hand(vec![4 * 8, 4 * 9]);
        let actions = chi_candidates(&state, 4 * 7);
        assert!(actions.is_empty());
    }

    #[test]
    fn cannot_dahai_after_pon_blocks_the_fourth_copy_if_present() {
        let state = state_with_hand(vec![3]); // the 4th copy of kind 0 happens to still be in hand
        let meld = Meld::Pon { target: 1, tiles: [0, 1, 2], unused: 3 };
        let forbidden = cannot_dahai_after_call(&state, &meld);
        assert_eq!(forbidden, HashSet::from([0]));
    }

    #[test]
    fn cannot_dahai_after_chi_low_end_call_forbids_the_other_ryanmen_end() {
        // Ryanmen: hand holds 4m,5m; opponent discards 3m, forming 345m with 3m as the called,
        // lowest-position tile (r=0). The other half of the original 3-6m wait (6m) becomes
        // forbidden, along with any remaining 3m in hand -- matching spec.md §8 scenario 5's
        // forbidden-kind set {called kind, called kind + 3}.
        let state = state_with_hand(vec![12, 16, 20]); // 4m, 5m, 6m (one 6m left over)
        let meld = Meld::Chi { target: 1, tiles: [8, 12, 16], r: 0 }; // called = 3m (kind 2)
        let forbidden = cannot_dahai_after_call(&state, &meld);
        assert_eq!(forbidden, HashSet::from([5])); // 6m (kind 5) only; no 3m left in hand
    }

    #[test]
    fn cannot_dahai_after_chi_high_end_call_never_forbids_the_other_ryanmen_end() {
        // Hand holds 4m,5m; opponent discards 6m, forming 456m with 6m as the called, highest
        // position tile (r=2). The reference decoder's symmetric "three below" branch is gated
        // on a suit check that's always false for an actual chi, so 3m is *not* forbidden here
        // even though it would complete the mirror image of the low-end kuikae rule -- ported
        // as-is, see DESIGN.md.
        let state = state_with_hand(vec![12, 16, 8]); // 4m, 5m, and a spare 3m
        let meld = Meld::Chi { target: 1, tiles: [20, 12, 16], r: 2 }; // called = 6m (kind 5)
        let forbidden = cannot_dahai_after_call(&state, &meld);
        assert_eq!(forbidden, HashSet::new()); // no 6m left in hand, and the below-branch is dead
    }

    #[test]
    fn cannot_dahai_after_chi_low_end_call_can_leak_across_a_suit_boundary() {
        // Hand holds 8m,9m; opponent discards 7m, forming 789m with 7m lowest (r=0). The low-end
        // branch adds `called_kind + 3` with no suit-top check, so it lands on kind 9 (1p) --
        // ported as-is from the reference decoder, which has the same unchecked arithmetic.
        let state = state_with_hand(vec![32, 36, 9]); // 8m, 9m, and a spare 1p
        let meld = Meld::Chi { target: 1, tiles: [24, 32, 36], r: 0 }; // called = 7m (kind 6)
        let forbidden = cannot_dahai_after_call(&state, &meld);
        assert_eq!(forbidden, HashSet::from([9])); // 1p (kind 9), leaked from manzu
    }

    #[test]
    fn cannot_dahai_after_riichi_step1_forbids_the_run_tiles_but_not_either_shanpon_pair() {
        // 1m..9m 1p1p1p 9s9s: the nine consecutive manzu can only decompose as three pure runs,
        // so dropping any one of them leaves no valid shape. Dropping a 1p or a 9s instead keeps
        // the hand ready (shanpon wait on whichever pair remains), so those two are not forbidden.
        let state = state_with_hand(vec![0, 4, 8, 12, 16, 20, 24, 28, 32, 36, 37, 38, 104, 105]);
        let forbidden = cannot_dahai_after_riichi_step1(&state);
        let expected: HashSet<KindIndex> = HashSet::from([0, 1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(forbidden, expected);
    }
}
