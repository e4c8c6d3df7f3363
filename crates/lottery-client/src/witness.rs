//! on-chain witness encoding
//!
//! the verifier contract takes the abi tuple
//! `(uint256[2], uint256[2][2], uint256[2], uint256[7])`. the b component's
//! inner coordinates are swapped pairwise: the pairing precompile consumes
//! fq2 elements in (imaginary, real) order. do not "fix" the swap

use alloy_primitives::U256;
use alloy_sol_types::SolValue;

/// groth16 proof in the affine form the verifier consumes (the prover's
/// projective third coordinates already stripped)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Groth16Proof {
    pub pi_a: [U256; 2],
    pub pi_b: [[U256; 2]; 2],
    pub pi_c: [U256; 2],
}

/// public signals bound into the proof, in verifier order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicSignals {
    pub root: U256,
    pub nullifier_hash: U256,
    pub rewardbits: U256,
    pub recipient: U256,
    pub relayer: U256,
    pub fee: U256,
    pub refund: U256,
}

impl PublicSignals {
    fn to_words(self) -> [U256; 7] {
        [
            self.root,
            self.nullifier_hash,
            self.rewardbits,
            self.recipient,
            self.relayer,
            self.fee,
            self.refund,
        ]
    }
}

/// encode the verifier calldata tuple; 15 words, 480 bytes
pub fn encode_witness(proof: &Groth16Proof, signals: &PublicSignals) -> Vec<u8> {
    let swapped_b = [
        [proof.pi_b[0][1], proof.pi_b[0][0]],
        [proof.pi_b[1][1], proof.pi_b[1][0]],
    ];
    (proof.pi_a, swapped_b, proof.pi_c, signals.to_words()).abi_encode()
}

/// hex form for relayer submission
pub fn witness_hex(witness: &[u8]) -> String {
    format!("0x{}", hex::encode(witness))
}
