//! circom-compatible poseidon hashing over the bn254 scalar field
//!
//! the only module that crosses between plain integers and field
//! representation: inputs are range-checked against the modulus, outputs are
//! normalized out of montgomery form and read little-endian, matching the
//! on-chain circuit convention

use alloy_primitives::U256;
use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use light_poseidon::{Poseidon, PoseidonHasher};

use crate::error::{Error, Result};

/// bn254 scalar field modulus as a plain integer
pub fn field_modulus() -> U256 {
    U256::from_le_slice(&Fr::MODULUS.to_bytes_le())
}

fn to_field(value: U256, what: &'static str) -> Result<Fr> {
    if value >= field_modulus() {
        return Err(Error::InvalidInput(what));
    }
    Ok(Fr::from_le_bytes_mod_order(&value.to_le_bytes::<32>()))
}

fn from_field(value: Fr) -> U256 {
    U256::from_le_slice(&value.into_bigint().to_bytes_le())
}

/// arity-1 one-way hash: ticket commitments and nullifiers
pub fn one_way_hash(input: U256) -> Result<U256> {
    let mut poseidon =
        Poseidon::<Fr>::new_circom(1).map_err(|e| Error::Hash(e.to_string()))?;
    let out = poseidon
        .hash(&[to_field(input, "hash input exceeds field modulus")?])
        .map_err(|e| Error::Hash(e.to_string()))?;
    Ok(from_field(out))
}

/// arity-3 sponge: combines (secret, rand, index) into the dice value
pub fn sponge3(secret: U256, rand: U256, index: U256) -> Result<U256> {
    let inputs = [
        to_field(secret, "secret exceeds field modulus")?,
        to_field(rand, "rand exceeds field modulus")?,
        to_field(index, "index exceeds field modulus")?,
    ];
    let mut poseidon =
        Poseidon::<Fr>::new_circom(3).map_err(|e| Error::Hash(e.to_string()))?;
    let out = poseidon
        .hash(&inputs)
        .map_err(|e| Error::Hash(e.to_string()))?;
    Ok(from_field(out))
}
