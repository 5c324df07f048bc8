//! Wound track - tiered damage buckets filled light → moderate → heavy.

use serde::{Deserialize, Serialize};

use crate::lenient;

/// One tier of the wound track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WoundTier {
    Light,
    Moderate,
    Heavy,
}

impl WoundTier {
    /// Tiers in fill order.
    pub const ORDER: [WoundTier; 3] = [Self::Light, Self::Moderate, Self::Heavy];

    pub fn capacity(&self) -> u32 {
        match self {
            Self::Light => 4,
            Self::Moderate => 2,
            Self::Heavy => 1,
        }
    }

    /// Stress caused when this tier is the worst one a hit reaches.
    pub fn stress(&self) -> u32 {
        match self {
            Self::Light => 1,
            Self::Moderate => 2,
            Self::Heavy => 4,
        }
    }
}

/// Total damage points the track can hold.
pub const WOUND_TRACK_CAPACITY: u32 = 7;

/// Filled boxes per tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WoundTrack {
    #[serde(default, deserialize_with = "lenient::count")]
    pub light: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub moderate: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub heavy: u32,
}

/// What a single fill added to each tier, plus what did not fit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WoundFill {
    pub light: u32,
    pub moderate: u32,
    pub heavy: u32,
    /// Points beyond the track's capacity, not tracked anywhere
    pub overflow: u32,
}

impl WoundFill {
    /// Worst tier that received at least one point.
    pub fn worst_tier(&self) -> Option<WoundTier> {
        if self.heavy > 0 {
            Some(WoundTier::Heavy)
        } else if self.moderate > 0 {
            Some(WoundTier::Moderate)
        } else if self.light > 0 {
            Some(WoundTier::Light)
        } else {
            None
        }
    }

    fn add(&mut self, tier: WoundTier, amount: u32) {
        match tier {
            WoundTier::Light => self.light += amount,
            WoundTier::Moderate => self.moderate += amount,
            WoundTier::Heavy => self.heavy += amount,
        }
    }
}

impl WoundTrack {
    pub fn get(&self, tier: WoundTier) -> u32 {
        match tier {
            WoundTier::Light => self.light,
            WoundTier::Moderate => self.moderate,
            WoundTier::Heavy => self.heavy,
        }
    }

    fn slot(&mut self, tier: WoundTier) -> &mut u32 {
        match tier {
            WoundTier::Light => &mut self.light,
            WoundTier::Moderate => &mut self.moderate,
            WoundTier::Heavy => &mut self.heavy,
        }
    }

    /// Fills tiers in strict order, each absorbing up to its free capacity.
    pub fn fill(&mut self, damage: u32) -> WoundFill {
        let mut remaining = damage;
        let mut fill = WoundFill::default();

        for tier in WoundTier::ORDER {
            let current = self.get(tier);
            let free = tier.capacity().saturating_sub(current);
            let absorbed = remaining.min(free);
            *self.slot(tier) = current + absorbed;
            fill.add(tier, absorbed);
            remaining -= absorbed;
        }

        fill.overflow = remaining;
        fill
    }

    /// True once every tier is at capacity.
    pub fn is_full(&self) -> bool {
        WoundTier::ORDER.iter().all(|t| self.get(*t) >= t.capacity())
    }

    /// Wound-box toggle: clicking a filled box at `index` clears it and every
    /// box after it, clicking an empty box fills up to and including it.
    pub fn toggle(&mut self, tier: WoundTier, index: u32) {
        let current = self.get(tier);
        let next = if index < current { index } else { index.saturating_add(1) };
        *self.slot(tier) = next.min(tier.capacity());
    }
}
