//! Rank derivation from (prestige, layer)

use serde::Serialize;

/// Badge tier shown next to a rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum RankTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
    Legend,
}

impl RankTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankTier::Bronze => "Bronze",
            RankTier::Silver => "Silver",
            RankTier::Gold => "Gold",
            RankTier::Platinum => "Platinum",
            RankTier::Diamond => "Diamond",
            RankTier::Legend => "Legend",
        }
    }
}

/// A display rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rank {
    /// 1..=18
    pub number: u8,
    pub name: &'static str,
    pub badge: &'static str,
    pub tier: RankTier,
    /// Breakpoint this rank starts at
    pub prestige: u32,
    pub layer: u8,
}

const fn rank(
    number: u8,
    prestige: u32,
    layer: u8,
    name: &'static str,
    badge: &'static str,
    tier: RankTier,
) -> Rank {
    Rank {
        number,
        name,
        badge,
        tier,
        prestige,
        layer,
    }
}

/// Ordered breakpoints, ascending in both rank number and (prestige, layer)
pub static RANKS: [Rank; 18] = [
    rank(1, 0, 1, "Script Kiddie", "chip", RankTier::Bronze),
    rank(2, 0, 3, "Packet Sniffer", "antenna", RankTier::Bronze),
    rank(3, 0, 5, "Port Scanner", "radar", RankTier::Bronze),
    rank(4, 1, 1, "Shell Popper", "terminal", RankTier::Silver),
    rank(5, 1, 4, "Buffer Smasher", "hammer", RankTier::Silver),
    rank(6, 2, 1, "Privilege Climber", "ladder", RankTier::Silver),
    rank(7, 2, 4, "Root Seeker", "key", RankTier::Gold),
    rank(8, 3, 1, "Kernel Diver", "anchor", RankTier::Gold),
    rank(9, 3, 4, "Syscall Hijacker", "hook", RankTier::Gold),
    rank(10, 4, 1, "Ring Zero", "ring", RankTier::Platinum),
    rank(11, 4, 4, "Firmware Phantom", "ghost", RankTier::Platinum),
    rank(12, 5, 1, "Bootloader Baron", "crown", RankTier::Platinum),
    rank(13, 5, 4, "Microcode Mage", "wand", RankTier::Diamond),
    rank(14, 6, 1, "Silicon Sage", "crystal", RankTier::Diamond),
    rank(15, 6, 4, "Hypervisor", "eye", RankTier::Diamond),
    rank(16, 7, 1, "Quantum Wraith", "atom", RankTier::Legend),
    rank(17, 7, 4, "Singularity", "spiral", RankTier::Legend),
    rank(18, 8, 1, "Zero Day", "skull", RankTier::Legend),
];

/// Highest rank whose breakpoint is at or below `(prestige, layer)`,
/// compared by prestige first, then layer. Always at least rank 1.
pub fn rank_for(prestige: u32, layer: u8) -> Rank {
    RANKS
        .iter()
        .rev()
        .find(|r| (r.prestige, r.layer) <= (prestige, layer))
        .copied()
        .unwrap_or(RANKS[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_table_is_ordered() {
        for pair in RANKS.windows(2) {
            assert_eq!(pair[1].number, pair[0].number + 1);
            assert!((pair[0].prestige, pair[0].layer) < (pair[1].prestige, pair[1].layer));
            assert!(pair[0].tier <= pair[1].tier);
        }
    }

    #[test]
    fn test_rank_for_known_points() {
        assert_eq!(rank_for(0, 1).number, 1);
        assert_eq!(rank_for(0, 2).number, 1);
        assert_eq!(rank_for(0, 3).number, 2);
        assert_eq!(rank_for(0, 6).number, 3);
        assert_eq!(rank_for(1, 1).number, 4);
        assert_eq!(rank_for(8, 1).name, "Zero Day");
        assert_eq!(rank_for(99, 6).number, 18);
    }

    #[test]
    fn test_rank_for_is_total() {
        assert_eq!(rank_for(0, 0).number, 1);
    }

    proptest! {
        #[test]
        fn prop_rank_monotonic(p1 in 0u32..12, l1 in 0u8..8, p2 in 0u32..12, l2 in 0u8..8) {
            let (lo, hi) = if (p1, l1) <= (p2, l2) { ((p1, l1), (p2, l2)) } else { ((p2, l2), (p1, l1)) };
            prop_assert!(rank_for(lo.0, lo.1).number <= rank_for(hi.0, hi.1).number);
        }
    }
}
