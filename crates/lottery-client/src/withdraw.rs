//! withdrawal proof builder
//!
//! the end-to-end claim pipeline: parse ticket, resolve bet, derive dice and
//! reward, compute the nullifier, fetch the merkle path, assemble the
//! circuit input, invoke the external prover and encode the witness. steps
//! run strictly in order; each output feeds the next

use alloy_primitives::U256;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use tracing::{debug, info, warn};

use lottery_core::bigint::u256_to_hex;
use lottery_core::{compute_dice, compute_nullifier, compute_reward, Reward, Ticket};

use crate::error::{Error, Result};
use crate::prover::WithdrawProver;
use crate::resolve::{resolve_bet, NetworkContext, ResolvedBet};
use crate::witness::{encode_witness, PublicSignals};

/// merkle siblings the circuit expects; the path response appends the root
pub const PATH_ELEMENTS: usize = 32;

/// caller-facing withdrawal parameters
#[derive(Clone, Debug)]
pub struct WithdrawRequest {
    /// combined `secret << 8 | power` hex form
    pub ticket_hex: String,
    /// bet index from the transaction receipt; enables the decoy-batch
    /// path. without it resolution falls back to direct hash lookup
    pub manual_index: Option<u64>,
    pub recipient: U256,
    pub relayer: U256,
    pub fee: U256,
    pub refund: U256,
}

/// input handed to the withdrawal circuit. field names are the circuit's
/// signal names; every value serializes as a decimal string
#[derive(Clone, Debug, Serialize)]
pub struct CircuitInput {
    #[serde(serialize_with = "as_decimal")]
    pub root: U256,
    #[serde(rename = "nullifierHash", serialize_with = "as_decimal")]
    pub nullifier_hash: U256,
    #[serde(serialize_with = "as_decimal")]
    pub rewardbits: U256,
    #[serde(serialize_with = "as_decimal")]
    pub recipient: U256,
    #[serde(serialize_with = "as_decimal")]
    pub relayer: U256,
    #[serde(serialize_with = "as_decimal")]
    pub fee: U256,
    #[serde(serialize_with = "as_decimal")]
    pub refund: U256,
    #[serde(serialize_with = "as_decimal")]
    pub secret: U256,
    #[serde(serialize_with = "as_decimal")]
    pub power: U256,
    #[serde(serialize_with = "as_decimal")]
    pub rand: U256,
    #[serde(rename = "pathIndex", serialize_with = "as_decimal")]
    pub path_index: U256,
    #[serde(rename = "pathElements", serialize_with = "as_decimal_seq")]
    pub path_elements: Vec<U256>,
}

fn as_decimal<S: Serializer>(value: &U256, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

fn as_decimal_seq<S: Serializer>(
    values: &[U256],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(values.len()))?;
    for value in values {
        seq.serialize_element(&value.to_string())?;
    }
    seq.end()
}

/// the assembled claim, ready for relayer submission
#[derive(Clone, Debug)]
pub struct Withdrawal {
    /// abi-encoded verifier calldata
    pub witness: Vec<u8>,
    pub reward: Reward,
    pub bet: ResolvedBet,
    pub nullifier_hash: U256,
    pub root: U256,
}

/// the path service is untrusted; check the shape before anything derived
/// from it can reach the prover
pub fn validate_path(path: Vec<U256>) -> Result<(U256, Vec<U256>)> {
    if path.len() != PATH_ELEMENTS + 1 {
        return Err(Error::MalformedPath {
            expected: PATH_ELEMENTS + 1,
            got: path.len(),
        });
    }
    let root = path[PATH_ELEMENTS];
    let elements = path[..PATH_ELEMENTS].to_vec();
    Ok((root, elements))
}

/// run the full withdrawal pipeline once; a fresh witness is built per
/// attempt, nothing is reused across different recipients or fees
pub async fn build_withdrawal<P: WithdrawProver>(
    ctx: &NetworkContext,
    prover: &P,
    request: &WithdrawRequest,
) -> Result<Withdrawal> {
    // 1-2: parse and derive the lookup key
    let ticket = Ticket::parse(&request.ticket_hex)?;
    let lookup_key = ticket.lookup_key()?;
    debug!(lookup = %u256_to_hex(lookup_key), "resolving bet");

    // 3: resolve index and randomness
    let bet = resolve_bet(ctx, lookup_key, request.manual_index).await?;

    // 4: dice and reward
    let dice = compute_dice(ticket.secret, bet.rand, U256::from(bet.index))?;
    let reward = compute_reward(ticket.power, dice)?;
    info!(index = bet.index, rewardbits = reward.bits, "bet outcome determined");

    // 5: nullifier
    let nullifier_hash = compute_nullifier(dice)?;

    // 6: merkle path
    let path = ctx.indexer.proof_path(bet.index, bet.next_index).await?;
    let (root, path_elements) = validate_path(path).inspect_err(|err| {
        warn!(%err, "path service returned a malformed response");
    })?;

    // 7: circuit input
    let input = CircuitInput {
        root,
        nullifier_hash,
        rewardbits: U256::from(reward.bits),
        recipient: request.recipient,
        relayer: request.relayer,
        fee: request.fee,
        refund: request.refund,
        secret: ticket.secret,
        power: U256::from(ticket.power),
        rand: bet.rand,
        path_index: U256::from(bet.index),
        path_elements,
    };

    // 8: external prover
    let proof = prover.prove(&input).await?;

    // 9: witness
    let signals = PublicSignals {
        root,
        nullifier_hash,
        rewardbits: U256::from(reward.bits),
        recipient: request.recipient,
        relayer: request.relayer,
        fee: request.fee,
        refund: request.refund,
    };
    let witness = encode_witness(&proof, &signals);
    info!(bytes = witness.len(), "witness encoded");

    Ok(Withdrawal {
        witness,
        reward,
        bet,
        nullifier_hash,
        root,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path_shape() {
        let good: Vec<U256> = (0..33).map(|i| U256::from(i as u64)).collect();
        let (root, elements) = validate_path(good).unwrap();
        assert_eq!(root, U256::from(32u64));
        assert_eq!(elements.len(), PATH_ELEMENTS);
        assert_eq!(elements[0], U256::ZERO);

        let short: Vec<U256> = (0..30).map(|i| U256::from(i as u64)).collect();
        assert!(matches!(
            validate_path(short),
            Err(Error::MalformedPath { expected: 33, got: 30 })
        ));
        assert!(matches!(
            validate_path(vec![U256::ZERO; 40]),
            Err(Error::MalformedPath { expected: 33, got: 40 })
        ));
    }

    #[test]
    fn test_circuit_input_serialization() {
        let input = CircuitInput {
            root: U256::from(1u64),
            nullifier_hash: U256::from(2u64),
            rewardbits: U256::from(5u64),
            recipient: U256::from(3u64),
            relayer: U256::from(4u64),
            fee: U256::from(6u64),
            refund: U256::from(7u64),
            secret: U256::from(8u64),
            power: U256::from(9u64),
            rand: U256::from(10u64),
            path_index: U256::from(11u64),
            path_elements: vec![U256::from(12u64), U256::from(13u64)],
        };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["root"], "1");
        assert_eq!(value["nullifierHash"], "2");
        assert_eq!(value["rewardbits"], "5");
        assert_eq!(value["pathIndex"], "11");
        assert_eq!(value["pathElements"][1], "13");
        // decimal strings even for large values
        let mut big = input.clone();
        big.secret = U256::MAX;
        let value = serde_json::to_value(&big).unwrap();
        assert_eq!(
            value["secret"],
            "115792089237316195423570985008687907853269984665640564039457584007913129639935"
        );
    }
}
