//! bet resolution with the decoy-batch privacy strategy
//!
//! fetching a single leaf by commitment hash tells the indexer exactly which
//! bet the caller owns. when the bet index is known, the client instead asks
//! for a batch of indices where all but one are random decoys: the server
//! cannot tell which leaf was wanted, and every returned pair is cached for
//! reuse by later resolutions

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use alloy_primitives::U256;
use rand::Rng;
use tracing::{debug, info};

use lottery_core::bigint::u256_to_hex;

use crate::cache::{CachedLeaf, LeafStore};
use crate::error::{Error, Result};
use crate::indexer::{IndexerClient, IndexerConfig};

/// decoy batch size per real target
pub const DEFAULT_DECOY_TRIES: usize = 5;

/// everything resolution needs to know about one chain: the indexer client
/// and the shared leaf cache. explicitly injected, never a singleton
#[derive(Clone, Debug)]
pub struct NetworkContext {
    pub indexer: IndexerClient,
    pub leaves: Arc<LeafStore>,
}

impl NetworkContext {
    pub fn new(chain: u64, config: IndexerConfig) -> Result<Self> {
        Ok(Self {
            indexer: IndexerClient::new(chain, config)?,
            leaves: Arc::new(LeafStore::new()),
        })
    }

    pub fn chain(&self) -> u64 {
        self.indexer.chain()
    }
}

/// a bet whose index and randomness are known
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedBet {
    pub index: u64,
    pub rand: U256,
    /// tree head at lookup time; only the direct path learns it
    pub next_index: Option<u64>,
}

/// reject bets the chain has not finished with yet; both conditions are
/// retriable after the next epoch closes
pub fn check_bet(lookup_key: U256, index: u64, rand: U256) -> Result<()> {
    if index == 0 {
        return Err(Error::BetNotFound {
            lookup: u256_to_hex(lookup_key),
        });
    }
    if rand.is_zero() {
        return Err(Error::BetStillProcessing { index });
    }
    Ok(())
}

/// batch-resolve `indices`, hiding each behind `tries - 1` random decoys
///
/// decoys are drawn uniformly from the current tree, skipping indices the
/// cache already holds (the caller's own bets must not serve as decoys for
/// each other). the real target replaces a random slot so its position in
/// the batch carries no signal. returns (index, rand) per requested index,
/// `(0, 0)` when the indexer does not know the leaf
pub async fn find_bets_safe(
    ctx: &NetworkContext,
    indices: &[u64],
    tries: usize,
) -> Result<HashMap<u64, (u64, U256)>> {
    let mut unique: Vec<u64> = Vec::new();
    for &index in indices {
        if !unique.contains(&index) {
            unique.push(index);
        }
    }

    let last_index = ctx.indexer.last_leaf().await?.next_index;
    let known = ctx.leaves.known_indices(ctx.chain()).await;

    let batch = build_decoy_batch(&unique, last_index, &known, tries);
    debug!(targets = unique.len(), batch = batch.len(), "decoy batch assembled");

    let results = ctx.indexer.find_bets(&batch).await?;
    ctx.leaves
        .patch(
            ctx.chain(),
            results.iter().map(|&(index, rand)| CachedLeaf { index, rand }),
        )
        .await;

    Ok(unique
        .iter()
        .map(|&index| {
            let found = results
                .iter()
                .find(|(i, _)| *i == index)
                .copied()
                .unwrap_or((0, U256::ZERO));
            (index, found)
        })
        .collect::<HashMap<_, _>>())
}

/// decoy selection, separated from I/O so it can be tested directly
fn build_decoy_batch(
    targets: &[u64],
    last_index: u64,
    known: &HashSet<u64>,
    tries: usize,
) -> Vec<u64> {
    let mut rng = rand::thread_rng();
    let mut batch: Vec<u64> = Vec::new();
    for &target in targets {
        let mut picks: Vec<u64> = Vec::new();
        while picks.len() < tries {
            let candidate = rng.gen_range(0..=last_index);
            if !known.contains(&candidate) && !picks.contains(&candidate) {
                picks.push(candidate);
            }
            if known.len() + picks.len() >= last_index as usize + 1 {
                break;
            }
        }
        // the real target rides along at a random slot
        if !picks.contains(&target) {
            if picks.is_empty() {
                picks.push(target);
            } else {
                let slot = rng.gen_range(0..picks.len());
                picks[slot] = target;
            }
        }
        batch.extend(picks);
    }
    let mut seen = HashSet::new();
    batch.retain(|index| seen.insert(*index));
    batch
}

/// single-index form of [`find_bets_safe`]
pub async fn find_bet_safe(
    ctx: &NetworkContext,
    index: u64,
    tries: usize,
) -> Result<(u64, U256)> {
    let mut results = find_bets_safe(ctx, &[index], tries).await?;
    Ok(results.remove(&index).unwrap_or((0, U256::ZERO)))
}

/// resolve a ticket's bet
///
/// with a manual index the decoy-batch path is used; without one the client
/// falls back to direct lookup by hash, which is weaker privacy and kept
/// only as an explicit trade-off for callers that never saw their bet mined
pub async fn resolve_bet(
    ctx: &NetworkContext,
    lookup_key: U256,
    manual_index: Option<u64>,
) -> Result<ResolvedBet> {
    match manual_index {
        Some(index) => {
            // cache hit skips the network round-trip entirely
            if let Some(hit) = ctx.leaves.get(ctx.chain(), index).await {
                if !hit.rand.is_zero() {
                    debug!(index, "bet resolved from cache");
                    return Ok(ResolvedBet {
                        index,
                        rand: hit.rand,
                        next_index: None,
                    });
                }
            }
            let (found_index, rand) =
                find_bet_safe(ctx, index, DEFAULT_DECOY_TRIES).await?;
            check_bet(lookup_key, found_index, rand)?;
            info!(index = found_index, "bet resolved via decoy batch");
            Ok(ResolvedBet {
                index: found_index,
                rand,
                next_index: None,
            })
        }
        None => {
            let bet = ctx.indexer.find_bet(lookup_key).await?;
            if bet.index > 0 {
                ctx.leaves
                    .patch(
                        ctx.chain(),
                        [CachedLeaf { index: bet.index, rand: bet.rand }],
                    )
                    .await;
            }
            check_bet(lookup_key, bet.index, bet.rand)?;
            info!(index = bet.index, "bet resolved via direct lookup");
            Ok(ResolvedBet {
                index: bet.index,
                rand: bet.rand,
                next_index: Some(bet.next_index),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_bet_states() {
        let key = U256::from(77u64);
        assert!(matches!(
            check_bet(key, 0, U256::ZERO),
            Err(Error::BetNotFound { .. })
        ));
        assert!(matches!(
            check_bet(key, 12, U256::ZERO),
            Err(Error::BetStillProcessing { index: 12 })
        ));
        assert!(check_bet(key, 12, U256::from(1u64)).is_ok());
    }

    #[test]
    fn test_decoy_batch_contains_target() {
        let known = HashSet::new();
        for _ in 0..50 {
            let batch = build_decoy_batch(&[42], 1000, &known, 5);
            assert!(batch.contains(&42));
            assert!(batch.len() <= 5);
            assert!(batch.iter().all(|&i| i <= 1000));
        }
    }

    #[test]
    fn test_decoy_batch_skips_known_indices() {
        let known: HashSet<u64> = (0..=10).filter(|&i| i != 4).collect();
        let batch = build_decoy_batch(&[4], 10, &known, 5);
        assert!(batch.contains(&4));
        for index in &batch {
            assert!(*index == 4 || !known.contains(index));
        }
    }

    #[test]
    fn test_decoy_batch_tiny_tree() {
        // tree of one leaf: the batch degenerates to just the target
        let batch = build_decoy_batch(&[0], 0, &HashSet::new(), 5);
        assert_eq!(batch, vec![0]);
    }

    #[test]
    fn test_decoy_batch_dedups_across_targets() {
        let batch = build_decoy_batch(&[3, 3, 7], 1_000_000, &HashSet::new(), 5);
        let mut seen = HashSet::new();
        assert!(batch.iter().all(|i| seen.insert(*i)));
        assert!(batch.contains(&3) && batch.contains(&7));
    }
}
