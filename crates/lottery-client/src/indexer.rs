//! http client for the lottery indexer
//!
//! one client per chain, owned by the caller; endpoints return heterogeneous
//! json arrays whose numbers arrive as json numbers, decimal strings or hex
//! strings depending on magnitude, so parsing goes through [`NumOrText`]

use std::time::Duration;

use alloy_primitives::U256;
use serde::Deserialize;
use tracing::debug;

use lottery_core::bigint::{hex_to_u256, u256_to_hex};

use crate::error::{Error, Result};

/// indexer endpoint configuration
#[derive(Clone, Debug)]
pub struct IndexerConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl IndexerConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// lottery indexer client for one chain
#[derive(Clone, Debug)]
pub struct IndexerClient {
    chain: u64,
    base_url: String,
    http: reqwest::Client,
}

/// a leaf as reported by the direct lookup endpoint
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BetInfo {
    pub index: u64,
    pub rand: U256,
    pub next_index: u64,
}

/// head of the append-only tree
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LastLeaf {
    pub next_index: u64,
    pub block_number: u64,
    pub last_root: U256,
    pub last_leaf: U256,
}

/// tolerant wire-number representation
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum NumOrText {
    Num(u64),
    Text(String),
}

impl NumOrText {
    pub(crate) fn to_u256(&self) -> Result<U256> {
        match self {
            NumOrText::Num(n) => Ok(U256::from(*n)),
            NumOrText::Text(s) => parse_numeric(s),
        }
    }

    fn to_u64(&self) -> Result<u64> {
        let value = self.to_u256()?;
        u64::try_from(value)
            .map_err(|_| Error::InvalidResponse("index exceeds u64".into()))
    }
}

/// parse a decimal or `0x`-hex numeric string
pub(crate) fn parse_numeric(s: &str) -> Result<U256> {
    if s.starts_with("0x") || s.starts_with("0X") {
        return Ok(hex_to_u256(s)?);
    }
    U256::from_str_radix(s, 10)
        .map_err(|_| Error::InvalidResponse(format!("not a number: {s}")))
}

impl IndexerClient {
    pub fn new(chain: u64, config: IndexerConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            chain,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn chain(&self) -> u64 {
        self.chain
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// direct lookup by commitment lookup key
    ///
    /// NOTICE: the server learns which leaf the caller wants; prefer the
    /// decoy-batch path when the bet index is known
    pub async fn find_bet(&self, lookup_key: U256) -> Result<BetInfo> {
        let raw: Vec<NumOrText> = self
            .http
            .get(self.url("/lottery/leaf-pro"))
            .query(&[("hash", u256_to_hex(lookup_key))])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if raw.len() < 3 {
            return Err(Error::InvalidResponse(format!(
                "leaf-pro returned {} fields, expected 3",
                raw.len()
            )));
        }
        Ok(BetInfo {
            index: raw[0].to_u64()?,
            rand: raw[1].to_u256()?,
            next_index: raw[2].to_u64()?,
        })
    }

    /// batched lookup by tree indices; returns (index, rand) pairs
    pub async fn find_bets(&self, indices: &[u64]) -> Result<Vec<(u64, U256)>> {
        let mut query: Vec<(String, String)> =
            vec![("chain".into(), self.chain.to_string())];
        for index in indices {
            query.push(("indices[]".into(), index.to_string()));
        }
        let raw: Vec<Vec<NumOrText>> = self
            .http
            .get(self.url("/lottery/leaves"))
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(requested = indices.len(), returned = raw.len(), "leaves fetched");
        raw.into_iter()
            .map(|row| {
                if row.len() < 2 {
                    return Err(Error::InvalidResponse(
                        "leaves row shorter than (index, rand)".into(),
                    ));
                }
                Ok((row[0].to_u64()?, row[1].to_u256()?))
            })
            .collect()
    }

    /// head of the tree: next free index plus the latest root/leaf
    pub async fn last_leaf(&self) -> Result<LastLeaf> {
        let raw: Vec<NumOrText> = self
            .http
            .get(self.url("/lottery/last-leaf"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if raw.len() < 4 {
            return Err(Error::InvalidResponse(format!(
                "last-leaf returned {} fields, expected 4",
                raw.len()
            )));
        }
        Ok(LastLeaf {
            next_index: raw[0].to_u64()?,
            block_number: raw[1].to_u64()?,
            last_root: raw[2].to_u256()?,
            last_leaf: raw[3].to_u256()?,
        })
    }

    /// merkle inclusion path for a leaf: 32 siblings with the root appended
    pub async fn proof_path(
        &self,
        index: u64,
        next_index: Option<u64>,
    ) -> Result<Vec<U256>> {
        let mut query: Vec<(String, String)> =
            vec![("index".into(), index.to_string())];
        if let Some(next) = next_index {
            query.push(("nextIndex".into(), next.to_string()));
        }
        let raw: Vec<NumOrText> = self
            .http
            .get(self.url("/lottery/proof-path"))
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        raw.iter().map(NumOrText::to_u256).collect()
    }

    /// synthetic (index, rand) pairs for the simulation engine, served as
    /// `"index,rand"` hex csv lines
    pub async fn rand_range(
        &self,
        last_index: u64,
        num_rand: usize,
    ) -> Result<Vec<(U256, U256)>> {
        let raw: Vec<String> = self
            .http
            .get(self.url("/lottery/rand-range"))
            .query(&[
                ("lastIndex", last_index.to_string()),
                ("numRand", num_rand.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        raw.iter()
            .map(|line| {
                let (index, rand) = line.split_once(',').ok_or_else(|| {
                    Error::InvalidResponse("rand-range line missing comma".into())
                })?;
                Ok((parse_numeric(index.trim())?, parse_numeric(rand.trim())?))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_or_text_parsing() {
        let n: NumOrText = serde_json::from_str("7").unwrap();
        assert_eq!(n.to_u256().unwrap(), U256::from(7u64));
        let s: NumOrText = serde_json::from_str("\"0x10\"").unwrap();
        assert_eq!(s.to_u256().unwrap(), U256::from(16u64));
        let d: NumOrText = serde_json::from_str("\"1234\"").unwrap();
        assert_eq!(d.to_u256().unwrap(), U256::from(1234u64));
        let bad: NumOrText = serde_json::from_str("\"xyz\"").unwrap();
        assert!(bad.to_u256().is_err());
    }

    #[test]
    fn test_heterogeneous_row_shape() {
        let rows: Vec<Vec<NumOrText>> =
            serde_json::from_str(r#"[[12, "0xff", 13], ["14", 0, 15]]"#).unwrap();
        assert_eq!(rows[0][1].to_u256().unwrap(), U256::from(255u64));
        assert_eq!(rows[1][0].to_u64().unwrap(), 14);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client =
            IndexerClient::new(8453, IndexerConfig::new("http://indexer.local/v1/"))
                .unwrap();
        assert_eq!(client.url("/lottery/last-leaf"), "http://indexer.local/v1/lottery/last-leaf");
    }
}
