//! reward and mask engine
//!
//! the payout determination for every call site: play-time display, the
//! multi-ticket worker, the withdrawal proof builder and the simulation
//! engine all route through [`compute_reward`]. any fork of this arithmetic
//! changes win probabilities

use alloy_primitives::U256;

use crate::error::{Error, Result};
use crate::{BET_MIN, MAX_POWER};

/// tier widths in bits
pub const TIER1_BITS: u32 = 10;
pub const TIER2_BITS: u32 = 16;
pub const TIER3_BITS: u32 = 22;

/// dice windows per tier: bits 0..10, 10..26, 26..48
pub const TIER1_WINDOW: u64 = 0b1111111111;
pub const TIER2_WINDOW: u64 = 0b11111111111111110000000000;
pub const TIER3_WINDOW: u64 = 0b111111111111111111111100000000000000000000000000;

/// the 49 bits the mask construction works within
const FULL_MASK: u64 = (1 << (TIER1_BITS + TIER2_BITS + TIER3_BITS + 1)) - 1;

/// bitmask of dice bits in play at `power`
///
/// power 0..=10 slides coverage out of the small window (power 10 empties
/// it); 11..=16 slides coverage out of the medium window with the small
/// window pinned to full; 17..=22 does the same for the large window
pub fn power_mask(power: u8) -> Result<u64> {
    if power > MAX_POWER {
        return Err(Error::InvalidPower(power));
    }
    let p = power as u32;
    let mask: u128 = if p <= TIER1_BITS {
        (FULL_MASK as u128) << p
    } else if p <= TIER2_BITS {
        (((1u128 << (TIER2_BITS + TIER3_BITS + 1)) - 1) << (p + TIER1_BITS))
            | ((1 << TIER1_BITS) - 1)
    } else {
        (((1u128 << (TIER3_BITS + 1)) - 1) << (p + TIER1_BITS + TIER2_BITS))
            | ((1 << (TIER1_BITS + TIER2_BITS)) - 1)
    };
    Ok((mask & FULL_MASK as u128) as u64)
}

/// outcome of masking a dice value at a power level
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reward {
    /// bit0 = small tier win, bit1 = medium, bit2 = large
    pub bits: u8,
    /// winnings in units of [`BET_MIN`]
    pub units: u64,
    /// the mask that was applied
    pub mask: u64,
    /// the dice bits the mask was applied to
    pub dice: u64,
}

/// determine the reward for `power` against a dice value
///
/// a tier wins iff every active dice bit in its window is zero:
/// `(mask & dice & window) == 0`
pub fn compute_reward(power: u8, dice: U256) -> Result<Reward> {
    let mask = power_mask(power)?;
    let dice_low = dice.as_limbs()[0] & FULL_MASK;
    let masked = mask & dice_low;
    let rew1 = masked & TIER1_WINDOW == 0;
    let rew2 = masked & TIER2_WINDOW == 0;
    let rew3 = masked & TIER3_WINDOW == 0;
    let bits = rew1 as u8 | (rew2 as u8) << 1 | (rew3 as u8) << 2;
    let units = ((rew1 as u64) << TIER1_BITS)
        + ((rew2 as u64) << TIER2_BITS)
        + ((rew3 as u64) << TIER3_BITS);
    Ok(Reward {
        bits,
        units,
        mask,
        dice: dice_low,
    })
}

impl Reward {
    pub fn won(&self) -> bool {
        self.bits != 0
    }

    /// winnings in 18-decimal base units
    pub fn amount(&self) -> U256 {
        BET_MIN * U256::from(self.units)
    }

    /// per-tier mask values, each shifted down to its own window
    pub fn tier_masks(&self) -> [u64; 3] {
        [
            self.mask & TIER1_WINDOW,
            (self.mask & TIER2_WINDOW) >> TIER1_BITS,
            (self.mask & TIER3_WINDOW) >> (TIER1_BITS + TIER2_BITS),
        ]
    }

    /// per-tier mask bits as fixed-width binary strings, msb first
    pub fn mask_strings(&self) -> [String; 3] {
        tier_strings(self.mask)
    }

    /// per-tier dice bits as fixed-width binary strings, msb first
    pub fn dice_strings(&self) -> [String; 3] {
        tier_strings(self.dice)
    }

    /// dice bits with masked-out positions replaced by a placeholder
    pub fn masked_strings(&self) -> [String; 3] {
        let masks = self.mask_strings();
        let bits = self.dice_strings();
        [
            mask_display(&bits[0], &masks[0]),
            mask_display(&bits[1], &masks[1]),
            mask_display(&bits[2], &masks[2]),
        ]
    }

    /// display payload for callers
    pub fn view(&self) -> RewardView {
        RewardView {
            masked_bits: self.masked_strings(),
            reward: format_foom(self.amount()),
            mask_bits: self.mask_strings(),
            bits: self.dice_strings(),
        }
    }
}

fn tier_strings(value: u64) -> [String; 3] {
    [
        format!("{:010b}", value & TIER1_WINDOW),
        format!("{:016b}", (value & TIER2_WINDOW) >> TIER1_BITS),
        format!(
            "{:022b}",
            (value & TIER3_WINDOW) >> (TIER1_BITS + TIER2_BITS)
        ),
    ]
}

/// render dice bits against a mask: positions whose mask char is `0` are out
/// of play and drawn as a double placeholder
pub fn mask_display(bits: &str, mask: &str) -> String {
    bits.chars()
        .zip(mask.chars())
        .map(|(b, m)| if m == '1' { b.to_string() } else { "ˍˍ".to_string() })
        .collect()
}

/// display payload for a resolved ticket
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewardView {
    pub masked_bits: [String; 3],
    /// formatted whole-token amount
    pub reward: String,
    pub mask_bits: [String; 3],
    pub bits: [String; 3],
}

/// resolution state of a ticket, replacing stringly-typed placeholders
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// bet not yet inserted, or randomness not yet revealed
    Pending,
    /// resolved against revealed randomness
    Resolved(Reward),
}

impl Resolution {
    pub fn status(&self) -> &'static str {
        match self {
            Resolution::Pending => "Waiting",
            Resolution::Resolved(reward) if reward.won() => "Jackpot!",
            Resolution::Resolved(_) => "Lost",
        }
    }
}

/// format an 18-decimal base-unit amount as a decimal token string
pub fn format_foom(amount: U256) -> String {
    let unit = U256::from(10u64).pow(U256::from(18u64));
    let whole = amount / unit;
    let frac = amount % unit;
    if frac.is_zero() {
        return whole.to_string();
    }
    let mut frac_str = frac.to_string();
    while frac_str.len() < 18 {
        frac_str.insert(0, '0');
    }
    let frac_str = frac_str.trim_end_matches('0');
    format!("{whole}.{frac_str}")
}
