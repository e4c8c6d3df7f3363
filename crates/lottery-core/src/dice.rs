//! deterministic dice derivation
//!
//! dice is the single source of win randomness: the sponge of the player's
//! secret, the oracle-revealed rand and the bet's tree index. recomputed on
//! demand, never stored

use alloy_primitives::U256;

use crate::bigint::reverse_bits;
use crate::error::Result;
use crate::hash::{one_way_hash, sponge3};
use crate::SECRET_BYTES;

/// the simulation path masks dice down to the 48 bits the tier windows span
pub const SIM_DICE_MASK: u64 = (1 << 48) - 1;

/// derive the dice value for a resolved bet
///
/// pure: identical (secret, rand, index) always yield identical dice
pub fn compute_dice(secret: U256, rand: U256, index: U256) -> Result<U256> {
    sponge3(secret, rand, index)
}

/// nullifier = one-way hash of the bit-reversed dice; published on
/// withdrawal so a resolved bet can be claimed exactly once
pub fn compute_nullifier(dice: U256) -> Result<U256> {
    one_way_hash(reverse_bits(dice, 8 * SECRET_BYTES))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::hash::field_modulus;

    #[test]
    fn test_dice_deterministic() {
        let secret = U256::from(11u64);
        let rand = U256::from(22u64);
        let index = U256::from(33u64);
        let a = compute_dice(secret, rand, index).unwrap();
        let b = compute_dice(secret, rand, index).unwrap();
        assert_eq!(a, b);
        assert!(a < field_modulus());
    }

    #[test]
    fn test_dice_input_sensitive() {
        let base = compute_dice(U256::from(1u64), U256::from(2u64), U256::from(3u64)).unwrap();
        assert_ne!(
            base,
            compute_dice(U256::from(1u64), U256::from(2u64), U256::from(4u64)).unwrap()
        );
        assert_ne!(
            base,
            compute_dice(U256::from(1u64), U256::from(3u64), U256::from(3u64)).unwrap()
        );
        assert_ne!(
            base,
            compute_dice(U256::from(2u64), U256::from(2u64), U256::from(3u64)).unwrap()
        );
    }

    #[test]
    fn test_dice_rejects_oversized_inputs() {
        assert!(matches!(
            compute_dice(field_modulus(), U256::ZERO, U256::ZERO),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_nullifier_deterministic_per_dice() {
        let dice = compute_dice(U256::from(5u64), U256::from(6u64), U256::from(7u64)).unwrap();
        let a = compute_nullifier(dice).unwrap();
        let b = compute_nullifier(dice).unwrap();
        assert_eq!(a, b);
        // a different bet gives a different nullifier
        let other = compute_dice(U256::from(5u64), U256::from(6u64), U256::from(8u64)).unwrap();
        assert_ne!(a, compute_nullifier(other).unwrap());
    }
}
