use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the five switchable effect blocks in the amp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Tremolo,
    Distortion,
    Flanger,
    Echo,
    Reverb,
}

impl EffectKind {
    pub const ALL: [EffectKind; 5] = [
        EffectKind::Tremolo,
        EffectKind::Distortion,
        EffectKind::Flanger,
        EffectKind::Echo,
        EffectKind::Reverb,
    ];

    /// Bit value in a footswitch assignment mask.
    ///
    /// Bit order is the device's: 0 Tremolo, 1 Distortion, 2 Flanger,
    /// 3 Echo, 4 Reverb.
    pub fn bit(self) -> u8 {
        match self {
            EffectKind::Tremolo => 1 << 0,
            EffectKind::Distortion => 1 << 1,
            EffectKind::Flanger => 1 << 2,
            EffectKind::Echo => 1 << 3,
            EffectKind::Reverb => 1 << 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EffectKind::Tremolo => "Tremolo",
            EffectKind::Distortion => "Distortion",
            EffectKind::Flanger => "Flanger",
            EffectKind::Echo => "Echo",
            EffectKind::Reverb => "Reverb",
        }
    }

    /// Case-insensitive lookup by name, for command input.
    pub fn from_name(name: &str) -> Option<EffectKind> {
        EffectKind::ALL
            .into_iter()
            .find(|e| e.name().eq_ignore_ascii_case(name))
    }
}

/// The set of effects one footswitch toggles, packed the way the device
/// stores it: a 5-bit mask, always in 0..=31.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FootswitchMask(u8);

impl FootswitchMask {
    pub const MAX_BITS: u8 = 0b1_1111;

    pub fn empty() -> FootswitchMask {
        FootswitchMask(0)
    }

    /// Build a mask from a raw device value. `None` if any bit above the
    /// five effect bits is set.
    pub fn from_bits(bits: u8) -> Option<FootswitchMask> {
        (bits <= Self::MAX_BITS).then_some(FootswitchMask(bits))
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, effect: EffectKind) -> bool {
        self.0 & effect.bit() != 0
    }

    pub fn set(&mut self, effect: EffectKind, on: bool) {
        if on {
            self.0 |= effect.bit();
        } else {
            self.0 &= !effect.bit();
        }
    }

    pub fn toggle(&mut self, effect: EffectKind) {
        self.0 ^= effect.bit();
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The effects in this mask, in bit order.
    pub fn effects(self) -> impl Iterator<Item = EffectKind> {
        EffectKind::ALL.into_iter().filter(move |e| self.contains(*e))
    }
}

impl fmt::Display for FootswitchMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "(none)");
        }
        let mut first = true;
        for effect in self.effects() {
            if !first {
                write!(f, " + ")?;
            }
            write!(f, "{}", effect.name())?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_order_matches_device() {
        assert_eq!(EffectKind::Tremolo.bit(), 1);
        assert_eq!(EffectKind::Distortion.bit(), 2);
        assert_eq!(EffectKind::Flanger.bit(), 4);
        assert_eq!(EffectKind::Echo.bit(), 8);
        assert_eq!(EffectKind::Reverb.bit(), 16);
    }

    #[test]
    fn pack_unpack_identity_over_all_subsets() {
        for bits in 0u8..=FootswitchMask::MAX_BITS {
            let mask = FootswitchMask::from_bits(bits).expect("valid mask");
            assert_eq!(mask.bits(), bits);
            // Rebuilding from the membership test recovers the same set.
            let mut rebuilt = FootswitchMask::empty();
            for effect in EffectKind::ALL {
                rebuilt.set(effect, mask.contains(effect));
            }
            assert_eq!(rebuilt, mask);
        }
    }

    #[test]
    fn rejects_bits_above_range() {
        assert_eq!(FootswitchMask::from_bits(32), None);
        assert_eq!(FootswitchMask::from_bits(255), None);
        assert!(FootswitchMask::from_bits(31).is_some());
    }

    #[test]
    fn set_and_toggle() {
        let mut mask = FootswitchMask::empty();
        mask.set(EffectKind::Tremolo, true);
        mask.set(EffectKind::Echo, true);
        assert_eq!(mask.bits(), 9);
        mask.toggle(EffectKind::Echo);
        assert_eq!(mask.bits(), 1);
        mask.set(EffectKind::Tremolo, false);
        assert!(mask.is_empty());
    }

    #[test]
    fn display_lists_effects() {
        let mut mask = FootswitchMask::empty();
        assert_eq!(mask.to_string(), "(none)");
        mask.set(EffectKind::Tremolo, true);
        mask.set(EffectKind::Reverb, true);
        assert_eq!(mask.to_string(), "Tremolo + Reverb");
    }

    #[test]
    fn from_name_is_case_insensitive() {
        assert_eq!(EffectKind::from_name("echo"), Some(EffectKind::Echo));
        assert_eq!(EffectKind::from_name("REVERB"), Some(EffectKind::Reverb));
        assert_eq!(EffectKind::from_name("chorus"), None);
    }
}
