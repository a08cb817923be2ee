//! Meld decoder (§4.2 C2): parses the 16-bit packed meld word the remote sends in the `N` tag's
//! `m` field into a structured [`Meld`].
//!
//! Low two bits of the word are always `target` (called-from offset, mod 4). The discriminator
//! bits are checked in order: bit 2 -> chi, bit 3 -> pon, bit 4 -> kakan, otherwise
//! daiminkan/ankan (distinguished by `target == 0`).
//!
//! Inputs are presumed well-formed remote data (spec.md §9 Design Notes); every discriminator
//! combination is covered by one of the four branches below, so decoding is total.

use crate::tile::ServerIndex;

/// A called or declared meld, in the structural shape spec.md §3 describes.
///
/// `tiles[0]` is the called tile for every variant except [`Meld::Ankan`]; the remainder are the
/// tiles contributed from the caller's own hand. `target` is the seat the called tile came from,
/// relative to the caller (`0` for [`Meld::Ankan`], which is never called).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Meld {
    /// Called run. `r` records which position in the sequence the called tile occupies
    /// (`0` = lowest, `1` = middle, `2` = highest).
    Chi {
        target: u8,
        tiles: [ServerIndex; 3],
        r: u8,
    },
    /// Called triplet. `unused` is the fourth copy of the kind that remained in hand.
    Pon {
        target: u8,
        tiles: [ServerIndex; 3],
        unused: ServerIndex,
    },
    /// Promotion of an existing pon. `tiles[0]` is the newly added tile.
    Kakan { target: u8, tiles: [ServerIndex; 4] },
    /// Called quad.
    Daiminkan { target: u8, tiles: [ServerIndex; 4] },
    /// Concealed quad.
    Ankan { tiles: [ServerIndex; 4] },
}

impl Meld {
    /// The seat the meld was called from, relative to the caller (`0` for [`Meld::Ankan`]).
    pub fn target(&self) -> u8 {
        match *self {
            Meld::Chi { target, .. }
            | Meld::Pon { target, .. }
            | Meld::Kakan { target, .. }
            | Meld::Daiminkan { target, .. } => target,
            Meld::Ankan { .. } => 0,
        }
    }

    /// The called tile (`tiles[0]` for every variant but [`Meld::Ankan`], where there is none).
    pub fn called_tile(&self) -> Option<ServerIndex> {
        match *self {
            Meld::Chi { tiles, .. } => Some(tiles[0]),
            Meld::Pon { tiles, .. } => Some(tiles[0]),
            Meld::Kakan { tiles, .. } => Some(tiles[0]),
            Meld::Daiminkan { tiles, .. } => Some(tiles[0]),
            Meld::Ankan { .. } => None,
        }
    }

    /// All tiles belonging to this meld (called + contributed), as they are exposed on the table.
    /// For [`Meld::Ankan`] this is the full concealed quad.
    pub fn all_tiles(&self) -> Vec<ServerIndex> {
        match *self {
            Meld::Chi { tiles, .. } => tiles.to_vec(),
            Meld::Pon { tiles, .. } => tiles.to_vec(),
            Meld::Kakan { tiles, .. } => tiles.to_vec(),
            Meld::Daiminkan { tiles, .. } => tiles.to_vec(),
            Meld::Ankan { tiles } => tiles.to_vec(),
        }
    }

    /// Tiles that must be removed from the caller's own concealed hand: everything but the called
    /// tile, except for [`Meld::Ankan`] where all four tiles come from the hand.
    pub fn tiles_from_hand(&self) -> Vec<ServerIndex> {
        match *self {
            Meld::Ankan { tiles } => tiles.to_vec(),
            Meld::Kakan { tiles } => tiles[0..1].to_vec(),
            _ => self.all_tiles()[1..].to_vec(),
        }
    }

    /// Parses a 16-bit packed meld word (the `m` field of a server `N` tag).
    pub fn decode(m: u16) -> Self {
        if m & (1 << 2) != 0 {
            Self::decode_chi(m)
        } else if m & (1 << 3) != 0 {
            Self::decode_pon(m)
        } else if m & (1 << 4) != 0 {
            Self::decode_kakan(m)
        } else {
            Self::decode_daiminkan_ankan(m)
        }
    }

    fn decode_chi(m: u16) -> Self {
        let target = (m & 3) as u8;
        let mut t = m >> 10;
        let r = (t % 3) as u8;
        t = (t / 3 / 7) * 9 + (t / 3) % 7;
        t *= 4;
        let mut tiles = [0u16; 3];
        for (i, tile) in tiles.iter_mut().enumerate() {
            *tile = t + 4 * i as u16 + ((m >> (3 + 2 * i)) & 3);
        }
        tiles.swap(0, r as usize);
        Meld::Chi {
            target,
            tiles: [tiles[0] as ServerIndex, tiles[1] as ServerIndex, tiles[2] as ServerIndex],
            r,
        }
    }

    fn decode_pon(m: u16) -> Self {
        let target = (m & 3) as u8;
        let unused_pos = ((m >> 5) & 3) as usize;
        let raw = m >> 9;
        let r = (raw % 3) as usize;
        let t = (raw / 3) * 4;
        let quad = [t, t + 1, t + 2, t + 3];
        let unused = quad[unused_pos];
        let mut h: Vec<u16> = quad
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != unused_pos)
            .map(|(_, &v)| v)
            .collect();
        h.swap(0, r);
        Meld::Pon {
            target,
            tiles: [h[0] as ServerIndex, h[1] as ServerIndex, h[2] as ServerIndex],
            unused: unused as ServerIndex,
        }
    }

    fn decode_kakan(m: u16) -> Self {
        let target = (m & 3) as u8;
        let added_pos = ((m >> 5) & 3) as usize;
        let raw = m >> 9;
        let r = (raw % 3) as usize;
        let t = (raw / 3) * 4;
        let quad = [t, t + 1, t + 2, t + 3];
        let added = quad[added_pos];
        let mut h: Vec<u16> = quad
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != added_pos)
            .map(|(_, &v)| v)
            .collect();
        h.swap(0, r);
        Meld::Kakan {
            target,
            tiles: [
                added as ServerIndex,
                h[0] as ServerIndex,
                h[1] as ServerIndex,
                h[2] as ServerIndex,
            ],
        }
    }

    fn decode_daiminkan_ankan(m: u16) -> Self {
        let target = (m & 3) as u8;
        let hai0 = m >> 8;
        let t = (hai0 / 4) * 4;
        let r = (hai0 % 4) as usize;
        let mut tiles = [t, t + 1, t + 2, t + 3];
        tiles.swap(0, r);
        let tiles = [
            tiles[0] as ServerIndex,
            tiles[1] as ServerIndex,
            tiles[2] as ServerIndex,
            tiles[3] as ServerIndex,
        ];
        if target == 0 {
            Meld::Ankan { tiles }
        } else {
            Meld::Daiminkan { target, tiles }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::tile::kind_of;

    #[test]
    fn pon_kind_1m_called_from_kamicha() {
        // Scenario 1 of spec.md §8: pon of kind 1m, called from kamicha (target=1), one
        // unused copy recorded. target=1, pon discriminator (bit 3), unused_pos=2, raw=0.
        let m: u16 = 1 | (1 << 3) | (2 << 5);
        let meld = Meld::decode(m);
        match meld {
            Meld::Pon { target, tiles, unused } => {
                assert_eq!(target, 1);
                assert!(tiles.iter().all(|&t| kind_of(t) == 0));
                assert_eq!(kind_of(unused), 0);
            }
            other => panic!("expected Pon, got {other:?}"),
        }
    }

    #[test]
    fn chi_234m_middle_called_from_kamicha() {
        // bit 2 set (chi discriminator), target = 1 (kamicha)
        let m = (1u16 << 2) | 1;
        let meld = Meld::decode(m);
        match meld {
            Meld::Chi { target, tiles, r } => {
                assert_eq!(target, 1);
                let kinds: Vec<_> = tiles.iter().map(|&t| kind_of(t)).collect();
                let mut sorted = kinds.clone();
                sorted.sort_unstable();
                assert_eq!(sorted, vec![0, 1, 2]);
                assert!(r <= 2);
            }
            other => panic!("expected Chi, got {other:?}"),
        }
    }

    #[test]
    fn ankan_has_target_zero_and_four_tiles_of_one_kind() {
        // low bit4/3/2 all clear -> daiminkan/ankan branch; target bits = 0 -> ankan.
        let m = 5u16 << 8; // hai0 = 5, target = 0
        let meld = Meld::decode(m);
        if let Meld::Ankan { tiles } = meld {
            let kind = kind_of(tiles[0]);
            assert!(tiles.iter().all(|&t| kind_of(t) == kind));
        } else {
            panic!("expected Ankan, got {meld:?}");
        }
    }

    #[test]
    fn daiminkan_has_nonzero_target() {
        let m = (5u16 << 8) | 2; // target = 2
        let meld = Meld::decode(m);
        match meld {
            Meld::Daiminkan { target, tiles } => {
                assert_eq!(target, 2);
                let kind = kind_of(tiles[0]);
                assert!(tiles.iter().all(|&t| kind_of(t) == kind));
            }
            other => panic!("expected Daiminkan, got {other:?}"),
        }
    }

    #[test]
    fn decode_always_produces_three_or_four_tiles() {
        for m in 0u16..=0xffff {
            let meld = Meld::decode(m);
            let n = meld.all_tiles().len();
            assert!(n == 3 || n == 4, "m={m:#06x} produced {n} tiles");
        }
    }
}
