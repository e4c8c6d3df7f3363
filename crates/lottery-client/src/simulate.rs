//! what-if simulation across all power levels
//!
//! runs many synthetic draws against a fixed secret so a player can judge a
//! bet size before committing funds. the reward math is the shared engine
//! from `lottery-core` — the same function the withdrawal builder uses —
//! never a local re-derivation

use alloy_primitives::U256;
use rayon::prelude::*;
use tracing::info;

use lottery_core::dice::SIM_DICE_MASK;
use lottery_core::{compute_dice, compute_reward, BET_MIN, MAX_POWER};

use crate::error::Result;
use crate::resolve::NetworkContext;

/// number of power levels (0..=22)
pub const POWER_LEVELS: usize = MAX_POWER as usize + 1;

/// draws used when the caller does not pick a count
pub const DEFAULT_DRAWS: usize = 30;

/// upper bound on draws per run
pub const MAX_DRAWS: usize = 1024;

/// platform fee in percent, deducted from gross reward
pub const PLATFORM_FEE_PCT: u64 = 4;

/// per-power aggregate over a simulation run
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PowerStats {
    pub power: u8,
    /// total stake over all draws, in units of [`BET_MIN`]
    pub cost_units: u64,
    /// total winnings, in units of [`BET_MIN`]
    pub reward_units: u64,
    /// reward minus cost
    pub profit_units: i128,
    /// reward * 100 / cost
    pub luck_pct: f64,
    /// profit after the platform fee, in units of [`BET_MIN`]
    pub net_profit_units: f64,
}

impl PowerStats {
    /// total stake in 18-decimal base units
    pub fn cost(&self) -> U256 {
        BET_MIN * U256::from(self.cost_units)
    }

    /// total winnings in 18-decimal base units
    pub fn reward(&self) -> U256 {
        BET_MIN * U256::from(self.reward_units)
    }
}

/// pure accumulation: total win units per power over the given draws
///
/// factored out of [`simulate`] so the reward-parity test can feed fixed
/// pairs without a network. draw evaluation is cpu-parallel
pub fn accumulate_wins(
    secret: U256,
    pairs: &[(U256, U256)],
) -> Result<[u64; POWER_LEVELS]> {
    let rows = pairs
        .par_iter()
        .map(|&(index, rand)| -> Result<[u64; POWER_LEVELS]> {
            let dice = compute_dice(secret, rand, index)? & U256::from(SIM_DICE_MASK);
            let mut row = [0u64; POWER_LEVELS];
            for power in 0..=MAX_POWER {
                row[power as usize] = compute_reward(power, dice)?.units;
            }
            Ok(row)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut wins = [0u64; POWER_LEVELS];
    for row in rows {
        for (total, units) in wins.iter_mut().zip(row) {
            *total += units;
        }
    }
    Ok(wins)
}

/// fold win totals into per-power statistics
pub fn stats_from_wins(wins: &[u64; POWER_LEVELS], draws: usize) -> Vec<PowerStats> {
    (0..POWER_LEVELS)
        .map(|p| {
            let cost_units = draws as u64 * (2 + (1u64 << p));
            let reward_units = wins[p];
            let profit_units = reward_units as i128 - cost_units as i128;
            let luck_pct = if cost_units > 0 {
                reward_units as f64 * 100.0 / cost_units as f64
            } else {
                0.0
            };
            let net_profit_units = reward_units as f64
                * (1.0 - PLATFORM_FEE_PCT as f64 / 100.0)
                - cost_units as f64;
            PowerStats {
                power: p as u8,
                cost_units,
                reward_units,
                profit_units,
                luck_pct,
                net_profit_units,
            }
        })
        .collect()
}

/// run `draws` what-if draws for a secret against live chain randomness
pub async fn simulate(
    ctx: &NetworkContext,
    secret: U256,
    draws: usize,
) -> Result<Vec<PowerStats>> {
    let draws = draws.clamp(1, MAX_DRAWS);
    let head = ctx.indexer.last_leaf().await?;
    let pairs = ctx.indexer.rand_range(head.next_index, draws).await?;
    info!(requested = draws, received = pairs.len(), "simulation draws fetched");

    let wins = accumulate_wins(secret, &pairs)?;
    Ok(stats_from_wins(&wins, pairs.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_pairs(n: u64) -> Vec<(U256, U256)> {
        (1..=n)
            .map(|i| (U256::from(i), U256::from(i * 7919 + 13)))
            .collect()
    }

    #[test]
    fn test_accumulate_deterministic() {
        let secret = U256::from(1234u64);
        let pairs = fixed_pairs(8);
        let a = accumulate_wins(secret, &pairs).unwrap();
        let b = accumulate_wins(secret, &pairs).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_guaranteed_tiers_floor_the_wins() {
        // power 10 always wins tier 1, power 16 tier 2, power 22 tier 3
        let pairs = fixed_pairs(5);
        let wins = accumulate_wins(U256::from(42u64), &pairs).unwrap();
        assert!(wins[10] >= 5 * (1 << 10));
        assert!(wins[16] >= 5 * (1 << 16));
        assert!(wins[22] >= 5 * (1 << 22));
    }

    #[test]
    fn test_stats_arithmetic() {
        let mut wins = [0u64; POWER_LEVELS];
        wins[0] = 3 * (1 << 10);
        let stats = stats_from_wins(&wins, 10);
        assert_eq!(stats.len(), POWER_LEVELS);

        let s0 = stats[0];
        assert_eq!(s0.power, 0);
        assert_eq!(s0.cost_units, 30);
        assert_eq!(s0.reward_units, 3072);
        assert_eq!(s0.profit_units, 3042);
        assert!((s0.luck_pct - 10240.0).abs() < 1e-9);
        assert!((s0.net_profit_units - (3072.0 * 0.96 - 30.0)).abs() < 1e-9);
        assert_eq!(s0.cost(), BET_MIN * U256::from(30u64));
        assert_eq!(s0.reward(), BET_MIN * U256::from(3072u64));

        let s22 = stats[22];
        assert_eq!(s22.cost_units, 10 * (2 + (1 << 22)));
        assert_eq!(s22.reward_units, 0);
    }
}
