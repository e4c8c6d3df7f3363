//! the reward engine's cross-consistency regression
//!
//! historically the payout math lived in three call sites (play-time
//! display, the ticket worker and the withdrawal builder) and drifted; the
//! rewrite routes everything through one engine. these tests lock the
//! simulation path and the withdrawal path to identical outcomes

use alloy_primitives::U256;
use lottery_client::simulate::{accumulate_wins, stats_from_wins, POWER_LEVELS};
use lottery_core::dice::SIM_DICE_MASK;
use lottery_core::{compute_dice, compute_nullifier, compute_reward};

fn synthetic_pairs(n: u64) -> Vec<(U256, U256)> {
    (1..=n)
        .map(|i| {
            let index = U256::from(i);
            let rand = U256::from(i * i * 7919 + 104_729);
            (index, rand)
        })
        .collect()
}

#[test]
fn simulation_matches_withdrawal_rewards() {
    let secret = U256::from(0xdead_beef_cafeu64);
    let pairs = synthetic_pairs(32);

    // simulation path: 48-bit masked dice, batch accumulation
    let wins = accumulate_wins(secret, &pairs).unwrap();

    // withdrawal path: full dice per resolved bet
    let mut expected = [0u64; POWER_LEVELS];
    for &(index, rand) in &pairs {
        let dice = compute_dice(secret, rand, index).unwrap();
        for power in 0..POWER_LEVELS {
            let reward = compute_reward(power as u8, dice).unwrap();
            expected[power] += reward.units;
        }
    }

    assert_eq!(wins, expected);
}

#[test]
fn dice_masking_never_changes_reward_bits() {
    // the tier windows sit entirely inside the low 48 bits, so the
    // simulation's mask must be invisible to the reward engine
    let secret = U256::from(7u64);
    for &(index, rand) in &synthetic_pairs(16) {
        let dice = compute_dice(secret, rand, index).unwrap();
        let masked = dice & U256::from(SIM_DICE_MASK);
        for power in 0..=22u8 {
            assert_eq!(
                compute_reward(power, dice).unwrap().bits,
                compute_reward(power, masked).unwrap().bits,
                "power {power} diverged"
            );
        }
    }
}

#[test]
fn stats_reflect_accumulated_wins() {
    let secret = U256::from(31_337u64);
    let pairs = synthetic_pairs(10);
    let wins = accumulate_wins(secret, &pairs).unwrap();
    let stats = stats_from_wins(&wins, pairs.len());

    assert_eq!(stats.len(), POWER_LEVELS);
    for (power, stat) in stats.iter().enumerate() {
        assert_eq!(stat.power as usize, power);
        assert_eq!(stat.reward_units, wins[power]);
        assert_eq!(stat.cost_units, 10 * (2 + (1u64 << power)));
        assert_eq!(
            stat.profit_units,
            stat.reward_units as i128 - stat.cost_units as i128
        );
    }
}

#[test]
fn one_nullifier_per_resolved_bet() {
    let secret = U256::from(555u64);
    let pairs = synthetic_pairs(8);
    let mut seen = std::collections::HashSet::new();
    for &(index, rand) in &pairs {
        let dice = compute_dice(secret, rand, index).unwrap();
        let nullifier = compute_nullifier(dice).unwrap();
        // stable across recomputation, unique across bets
        assert_eq!(nullifier, compute_nullifier(dice).unwrap());
        assert!(seen.insert(nullifier), "nullifier collision across bets");
    }
}
