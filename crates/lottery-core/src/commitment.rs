//! ticket commitments
//!
//! a ticket binds a secret to a power level; before the contract takes the
//! deposit, the secret's one-way hash must land in the accepted shard
//! (low five bits zero), so generation retries with fresh random secrets

use alloy_primitives::U256;
use rand::RngCore;

use crate::bigint::{hex_to_u256, random_secret};
use crate::error::{Error, Result};
use crate::hash::one_way_hash;
use crate::{BET_MIN, COMMITMENT_MAX_ATTEMPTS, COMMITMENT_SHARD_MASK, MAX_POWER};

/// a secret and its accepted commitment hash
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Commitment {
    pub secret: U256,
    pub hash: U256,
}

impl Commitment {
    /// draw fresh secrets until the hash clears the shard mask
    ///
    /// the acceptance rate is 1/32, so exhausting the attempt bound has
    /// probability ~2^-14 per 100 attempts worth of margin; treat
    /// `CommitmentExhausted` as fatal rather than retrying
    pub fn generate<R: RngCore>(rng: &mut R) -> Result<Self> {
        for _ in 0..COMMITMENT_MAX_ATTEMPTS {
            let secret = random_secret(rng);
            let hash = one_way_hash(secret)?;
            if hash & U256::from(COMMITMENT_SHARD_MASK) == U256::ZERO {
                return Ok(Self { secret, hash });
            }
        }
        Err(Error::CommitmentExhausted {
            attempts: COMMITMENT_MAX_ATTEMPTS,
        })
    }

    /// recompute the commitment for a caller-supplied secret, no retry loop
    /// (custom-secret flow; the shard predicate is not enforced here)
    pub fn from_secret(secret: U256) -> Result<Self> {
        let hash = one_way_hash(secret)?;
        Ok(Self { secret, hash })
    }
}

/// a secret bound to a power level in 0..=22
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub secret: U256,
    pub power: u8,
}

impl Ticket {
    pub fn new(secret: U256, power: u8) -> Result<Self> {
        if power > MAX_POWER {
            return Err(Error::InvalidPower(power));
        }
        Ok(Self { secret, power })
    }

    /// pack into the combined wire form: `secret << 8 | power`
    pub fn combined(&self) -> U256 {
        (self.secret << 8) | U256::from(self.power)
    }

    /// unpack a combined value; the low byte is the power
    pub fn decompose(combined: U256) -> Result<Self> {
        let power = (combined & U256::from(0xffu64)).to::<u8>();
        Self::new(combined >> 8, power)
    }

    /// parse the combined hex form
    pub fn parse(hex: &str) -> Result<Self> {
        Self::decompose(hex_to_u256(hex)?)
    }

    /// one-way hash of the secret
    pub fn commitment_hash(&self) -> Result<U256> {
        one_way_hash(self.secret)
    }

    /// indexer lookup key: `hash + power + 1`, distinct per power level of
    /// the same secret so bets at different powers stay distinguishable
    pub fn lookup_key(&self) -> Result<U256> {
        Ok(self.commitment_hash()? + U256::from(self.power) + U256::from(1u64))
    }

    /// bet cost in 18-decimal base units
    pub fn cost(&self) -> U256 {
        bet_cost(self.power)
    }
}

/// cost of a bet at `power`: `(2 + 2^power) * BET_MIN`
pub fn bet_cost(power: u8) -> U256 {
    BET_MIN * (U256::from(2u64) + (U256::from(1u64) << power as usize))
}
