//! external zk-snark prover boundary
//!
//! proving is multi-second cpu work owned by an external toolchain; the
//! client only assembles inputs and parses proof points back. failures are
//! fatal for the attempt and never retried automatically

use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;

use alloy_primitives::U256;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::indexer::parse_numeric;
use crate::withdraw::CircuitInput;
use crate::witness::Groth16Proof;

/// the seam between the claim pipeline and the proving system
pub trait WithdrawProver {
    /// prove the withdrawal circuit for an assembled input
    fn prove(&self, input: &CircuitInput) -> impl Future<Output = Result<Groth16Proof>> + Send;
}

/// runs `snarkjs groth16 fullprove` against the withdrawal circuit artifacts
///
/// the child process is killed if the returned future is dropped, so callers
/// can cancel an in-flight proof by dropping or timing out the call
#[derive(Clone, Debug)]
pub struct SnarkjsProver {
    /// prover executable, `snarkjs` on PATH by default
    pub program: PathBuf,
    /// compiled circuit, e.g. `circuit_artifacts/withdraw_js/withdraw.wasm`
    pub wasm: PathBuf,
    /// proving key, e.g. `circuit_artifacts/withdraw_final.zkey`
    pub zkey: PathBuf,
    /// scratch directory for input/proof json files
    pub work_dir: PathBuf,
}

impl SnarkjsProver {
    pub fn new(wasm: impl Into<PathBuf>, zkey: impl Into<PathBuf>) -> Self {
        Self {
            program: PathBuf::from("snarkjs"),
            wasm: wasm.into(),
            zkey: zkey.into(),
            work_dir: std::env::temp_dir(),
        }
    }
}

impl WithdrawProver for SnarkjsProver {
    async fn prove(&self, input: &CircuitInput) -> Result<Groth16Proof> {
        let tag: u64 = rand::random();
        let input_path = self.work_dir.join(format!("withdraw-input-{tag:016x}.json"));
        let proof_path = self.work_dir.join(format!("withdraw-proof-{tag:016x}.json"));
        let public_path = self.work_dir.join(format!("withdraw-public-{tag:016x}.json"));

        let encoded = serde_json::to_vec(input)
            .map_err(|e| Error::ProofGenerationFailed(e.to_string()))?;
        tokio::fs::write(&input_path, encoded)
            .await
            .map_err(|e| Error::ProofGenerationFailed(e.to_string()))?;

        info!("invoking external prover");
        let output = tokio::process::Command::new(&self.program)
            .arg("groth16")
            .arg("fullprove")
            .arg(&input_path)
            .arg(&self.wasm)
            .arg(&self.zkey)
            .arg(&proof_path)
            .arg(&public_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Error::ProofGenerationFailed(e.to_string()))?;

        let result = if output.status.success() {
            let raw = tokio::fs::read(&proof_path)
                .await
                .map_err(|e| Error::ProofGenerationFailed(e.to_string()))?;
            parse_proof(&raw)
        } else {
            Err(Error::ProofGenerationFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ))
        };

        // best-effort scratch cleanup
        for path in [&input_path, &proof_path, &public_path] {
            let _ = tokio::fs::remove_file(path).await;
        }
        debug!(ok = result.is_ok(), "prover finished");
        result
    }
}

/// snarkjs proof points arrive projective (three coordinates, strings);
/// only the affine pair of each is kept
#[derive(Debug, Deserialize)]
struct RawProof {
    pi_a: Vec<String>,
    pi_b: Vec<Vec<String>>,
    pi_c: Vec<String>,
}

pub(crate) fn parse_proof(raw: &[u8]) -> Result<Groth16Proof> {
    let raw: RawProof = serde_json::from_slice(raw)
        .map_err(|e| Error::ProofGenerationFailed(format!("bad proof json: {e}")))?;

    let coord = |values: &[String], i: usize, what: &str| -> Result<U256> {
        let s = values.get(i).ok_or_else(|| {
            Error::ProofGenerationFailed(format!("proof missing {what}[{i}]"))
        })?;
        parse_numeric(s)
            .map_err(|_| Error::ProofGenerationFailed(format!("bad {what}[{i}]")))
    };

    if raw.pi_b.len() < 2 {
        return Err(Error::ProofGenerationFailed("proof missing pi_b rows".into()));
    }

    Ok(Groth16Proof {
        pi_a: [coord(&raw.pi_a, 0, "pi_a")?, coord(&raw.pi_a, 1, "pi_a")?],
        pi_b: [
            [
                coord(&raw.pi_b[0], 0, "pi_b[0]")?,
                coord(&raw.pi_b[0], 1, "pi_b[0]")?,
            ],
            [
                coord(&raw.pi_b[1], 0, "pi_b[1]")?,
                coord(&raw.pi_b[1], 1, "pi_b[1]")?,
            ],
        ],
        pi_c: [coord(&raw.pi_c, 0, "pi_c")?, coord(&raw.pi_c, 1, "pi_c")?],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_snarkjs_proof() {
        let json = br#"{
            "pi_a": ["11", "22", "1"],
            "pi_b": [["33", "44"], ["55", "66"], ["1", "0"]],
            "pi_c": ["77", "88", "1"],
            "protocol": "groth16",
            "curve": "bn128"
        }"#;
        let proof = parse_proof(json).unwrap();
        assert_eq!(proof.pi_a, [U256::from(11u64), U256::from(22u64)]);
        assert_eq!(proof.pi_b[0], [U256::from(33u64), U256::from(44u64)]);
        assert_eq!(proof.pi_b[1], [U256::from(55u64), U256::from(66u64)]);
        assert_eq!(proof.pi_c, [U256::from(77u64), U256::from(88u64)]);
    }

    #[test]
    fn test_parse_rejects_short_proof() {
        let json = br#"{"pi_a": ["1"], "pi_b": [["1","2"],["3","4"]], "pi_c": ["5","6"]}"#;
        assert!(matches!(
            parse_proof(json),
            Err(Error::ProofGenerationFailed(_))
        ));
    }
}
