//! Tile codec (§4.1 C1): bidirectional mapping between server tile indices
//! (`0..135`, with fixed red-five slots) and mjai tile labels (`"1m".."9s"`,
//! honors, `"5mr"` etc).
//!
//! Two integer representations coexist, per spec.md §3:
//! - [`ServerIndex`] -- `0..135`; `idx/4` is the [`KindIndex`], `idx%4` the copy.
//! - [`KindIndex`] -- `0..33`; `0..=8` = 1m..9m, `9..=17` = 1p..9p, `18..=26` = 1s..9s,
//!   `27..=30` = E/S/W/N, `31..=33` = P/F/C (white/green/red dragon).
//!
//! [`Label`] is the AI-facing textual form.

use crate::error::EncodingError;

pub type ServerIndex = u8;
pub type KindIndex = u8;
pub type Label = String;

/// The fixed server indices of the three red-five copies (5m, 5p, 5s).
pub const RED_FIVE_INDICES: [ServerIndex; 3] = [16, 52, 88];

const LABELS: [&str; 34] = [
    "1m", "2m", "3m", "4m", "5m", "6m", "7m", "8m", "9m", //
    "1p", "2p", "3p", "4p", "5p", "6p", "7p", "8p", "9p", //
    "1s", "2s", "3s", "4s", "5s", "6s", "7s", "8s", "9s", //
    "E", "S", "W", "N", "P", "F", "C",
];

/// `idx/4`: the 34-kind index of a server tile index.
pub const fn kind_of(index: ServerIndex) -> KindIndex {
    index / 4
}

/// Whether a server index is one of the three red-five slots.
///
/// A tile is "red" iff its server index is one of `{16, 52, 88}` and `idx % 4 == 0`; since those
/// three constants already satisfy `idx % 4 == 0`, checking membership is sufficient.
pub const fn is_red(index: ServerIndex) -> bool {
    index == 16 || index == 52 || index == 88
}

/// `encode_one`: total. Red label emitted iff `index` is one of the three red-five slots.
pub fn encode_one(index: ServerIndex) -> Label {
    let label = LABELS[kind_of(index) as usize];
    if is_red(index) {
        format!("{label}r")
    } else {
        label.to_string()
    }
}

/// Histogram over kind indices (§4.1 `to_kind_counts`).
pub fn to_kind_counts(hand: &[ServerIndex]) -> [u8; 34] {
    let mut counts = [0u8; 34];
    for &index in hand {
        counts[kind_of(index) as usize] += 1;
    }
    counts
}

/// Selects a concrete copy from `hand` whose kind matches `label`'s and whose redness matches.
///
/// When multiple copies qualify, the non-red copies are preferred so red fives are retained for
/// scoring value: this is implemented by searching `hand` sorted by server index descending and
/// taking the first match, since red fives occupy copy 0 of each kind and therefore sort last.
pub fn decode_one(label: &str, hand: &[ServerIndex]) -> Result<ServerIndex, EncodingError> {
    let (kind, want_red) = parse_label(label);
    let mut sorted: Vec<ServerIndex> = hand.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted
        .into_iter()
        .find(|&index| kind_of(index) == kind && is_red(index) == want_red)
        .ok_or_else(|| EncodingError::NoMatchingTile {
            label: label.to_string(),
            hand: hand.to_vec(),
        })
}

/// Decodes several labels against one hand, in the order the AI supplied them, each copy removed
/// from the working hand before the next label is resolved (so the same physical tile is never
/// picked twice). Red-retention preference (§4.1) is applied to each pick independently; the
/// *order of results* mirrors `labels`, not the descending-index search order used internally --
/// this is the §9 Open Question ("chi encoding") resolved literally: red-retention governs
/// selection, the AI's own order governs what gets sent back to the server.
pub fn decode_many(labels: &[&str], hand: &[ServerIndex]) -> Result<Vec<ServerIndex>, EncodingError> {
    let mut working: Vec<ServerIndex> = hand.to_vec();
    working.sort_unstable_by(|a, b| b.cmp(a));
    let mut out = Vec::with_capacity(labels.len());
    for &label in labels {
        let index = decode_one(label, &working)?;
        working.retain(|&t| t != index);
        out.push(index);
    }
    Ok(out)
}

/// `tsumogiri_one`: the last-drawn tile, identified as the final element of `hand` (C6 appends
/// draws to the end).
pub fn tsumogiri_one(hand: &[ServerIndex]) -> Option<ServerIndex> {
    hand.last().copied()
}

/// Parses a label into its kind index and red-ness. Panics on a label outside the fixed set
/// documented in spec.md §3, since all labels reaching this function originate from either our
/// own [`encode_one`] or a validated AI reply.
fn parse_label(label: &str) -> (KindIndex, bool) {
    let (base, is_red) = match label.strip_suffix('r') {
        Some(base) => (base, true),
        None => (label, false),
    };
    let kind = LABELS
        .iter()
        .position(|&l| l == base)
        .unwrap_or_else(|| panic!("unrecognized tile label {label:?}")) as KindIndex;
    (kind, is_red)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn encode_red_fives() {
        assert_eq!(encode_one(16), "5mr");
        assert_eq!(encode_one(52), "5pr");
        assert_eq!(encode_one(88), "5sr");
        assert_eq!(encode_one(17), "5m");
        assert_eq!(encode_one(0), "1m");
        assert_eq!(encode_one(135), "C");
    }

    #[test]
    fn decode_many_preserves_caller_order_but_picks_red_retaining_copies() {
        // Scenario 6 of spec.md §8: hand has red 5p (52) and plain 5p (53); AI pons with
        // consumed ["5p", "5p"] (no `r` flags). Both picks must be the non-red copies (53, 54),
        // leaving 52 (the red one) behind, and returned in the order requested.
        let hand = [52, 53, 54, 55];
        let picked = decode_many(&["5p", "5p"], &hand).unwrap();
        assert_eq!(picked, vec![53, 54]);
    }

    #[test]
    fn decode_many_keeps_ai_order_distinct_from_descending_search_order() {
        // consumed = ["2m", "1m"] (AI's own order): result must come back as [2m-index, 1m-index]
        // even though the internal search scans the hand in descending order.
        let hand = [0, 4]; // 1m, 2m
        let picked = decode_many(&["2m", "1m"], &hand).unwrap();
        assert_eq!(picked, vec![4, 0]);
    }

    #[test]
    fn decode_prefers_non_red_copy() {
        // hand contains red 5p (52) and plain 5p (53); requesting "5p" (no r) should keep 52.
        let hand = [52, 53];
        let picked = decode_one("5p", &hand).unwrap();
        assert_eq!(picked, 53);
        assert_eq!(encode_one(picked), "5p");
    }

    #[test]
    fn decode_red_five_picks_the_red_copy() {
        let hand = [52, 53, 54, 55];
        let picked = decode_one("5pr", &hand).unwrap();
        assert_eq!(picked, 52);
    }

    #[test]
    fn decode_one_roundtrips_every_label_present_in_hand() {
        for kind in 0u8..34 {
            let base = 4 * kind;
            let hand = [base, base + 1, base + 2, base + 3];
            for &index in &hand {
                let label = encode_one(index);
                let decoded = decode_one(&label, &hand).unwrap();
                assert_eq!(encode_one(decoded), label);
            }
        }
    }

    #[test]
    fn decode_one_fails_when_absent() {
        let hand = [0, 1, 2];
        assert!(decode_one("9s", &hand).is_err());
    }

    #[test]
    fn tsumogiri_is_the_last_element() {
        let hand = [3, 7, 99];
        assert_eq!(tsumogiri_one(&hand), Some(99));
        assert_eq!(tsumogiri_one(&[]), None);
    }

    #[test]
    fn kind_counts_histogram() {
        let hand = [0, 1, 4, 5, 135, 134];
        let counts = to_kind_counts(&hand);
        assert_eq!(counts[0], 1);
        assert_eq!(counts[1], 2);
        assert_eq!(counts[33], 2);
    }
}
