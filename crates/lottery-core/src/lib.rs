//! shielded lottery core
//!
//! pure protocol math for the privacy-preserving lottery
//!
//! # architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      TICKET LIFECYCLE                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  commit                                                      │
//! │  ├─ secret: 31 random bytes                                  │
//! │  ├─ hash = poseidon(secret), retried until hash & 0x1f == 0  │
//! │  └─ ticket = secret << 8 | power                             │
//! │                                                              │
//! │  resolve (after on-chain randomness reveal)                  │
//! │  ├─ dice = poseidon(secret, rand, index)                     │
//! │  ├─ mask = f(power), three jackpot tiers over 48 dice bits   │
//! │  └─ tier wins iff mask & dice & window == 0                  │
//! │                                                              │
//! │  claim                                                       │
//! │  └─ nullifier = poseidon(reverse_bits(dice, 248))            │
//! │                                                              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! everything here is a pure function of its inputs; the async shell
//! (indexer access, proof generation, witness encoding) lives in the
//! `lottery-client` crate.

pub mod bigint;
pub mod commitment;
pub mod dice;
pub mod error;
pub mod hash;
pub mod reward;

pub use commitment::{bet_cost, Commitment, Ticket};
pub use dice::{compute_dice, compute_nullifier};
pub use error::{Error, Result};
pub use reward::{compute_reward, power_mask, Resolution, Reward, RewardView};

use alloy_primitives::U256;

/// secret byte length (248 bits, always below the bn254 scalar modulus)
pub const SECRET_BYTES: usize = 31;

/// highest valid power level
pub const MAX_POWER: u8 = 22;

/// commitment shard predicate: poseidon(secret) must clear these low bits
/// before the tree-insertion process will take the deposit
pub const COMMITMENT_SHARD_MASK: u64 = 0x1f;

/// bound on secret draws before commitment generation gives up
pub const COMMITMENT_MAX_ATTEMPTS: u32 = 10_000;

/// one bet unit: 1 million FOOM in 18-decimal base units
pub const BET_MIN: U256 = U256::from_limbs([0x1bce_cced_a100_0000, 0xd3c2, 0, 0]);

/// contract-side padding added on top of every bet: 2 million FOOM
pub const BET_PADDING: U256 = U256::from_limbs([0x379d_99db_4200_0000, 0x0001_a784, 0, 0]);

/// relayer minimum fee: 10 million FOOM
pub const FEE_MIN: U256 = U256::from_limbs([0x1614_0148_4a00_0000, 0x0008_4595, 0, 0]);

/// maximum gas refund: 0.001 eth
pub const REFUND_MAX: U256 = U256::from_limbs([0x0003_8d7e_a4c6_8000, 0, 0, 0]);

/// gas refund for custom-secret withdrawals: 0.0001 eth
pub const REFUND_CUSTOM: U256 = U256::from_limbs([0x0000_5af3_107a_4000, 0, 0, 0]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_constants() {
        let unit = U256::from(10u64).pow(U256::from(18u64));
        assert_eq!(BET_MIN, unit * U256::from(1_000_000u64));
        assert_eq!(BET_PADDING, unit * U256::from(2_000_000u64));
        assert_eq!(FEE_MIN, unit * U256::from(10_000_000u64));
        assert_eq!(REFUND_MAX, U256::from(1_000_000_000_000_000u64));
        assert_eq!(REFUND_CUSTOM, U256::from(100_000_000_000_000u64));
    }
}
