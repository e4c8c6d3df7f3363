//! local leaf cache with change notifications
//!
//! maps (chain, index) to the revealed randomness. last write wins: once the
//! oracle reveals a rand it never changes, so concurrent writers cannot
//! disagree. every mutation is broadcast so dashboards can refresh without
//! polling

use std::collections::{HashMap, HashSet};

use alloy_primitives::U256;
use tokio::sync::{broadcast, RwLock};

/// a cached (index, rand) pair
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CachedLeaf {
    pub index: u64,
    pub rand: U256,
}

/// cache mutation event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LeafUpdate {
    pub chain: u64,
    pub index: u64,
    pub rand: U256,
}

/// shared leaf store
#[derive(Debug)]
pub struct LeafStore {
    leaves: RwLock<HashMap<(u64, u64), CachedLeaf>>,
    updates: broadcast::Sender<LeafUpdate>,
}

impl LeafStore {
    pub fn new() -> Self {
        let (updates, _) = broadcast::channel(256);
        Self {
            leaves: RwLock::new(HashMap::new()),
            updates,
        }
    }

    /// subscribe to cache mutations
    pub fn subscribe(&self) -> broadcast::Receiver<LeafUpdate> {
        self.updates.subscribe()
    }

    pub async fn get(&self, chain: u64, index: u64) -> Option<CachedLeaf> {
        self.leaves.read().await.get(&(chain, index)).copied()
    }

    /// indices already cached for a chain; used to keep decoy draws disjoint
    /// from the caller's own bets
    pub async fn known_indices(&self, chain: u64) -> HashSet<u64> {
        self.leaves
            .read()
            .await
            .keys()
            .filter(|(c, _)| *c == chain)
            .map(|(_, index)| *index)
            .collect()
    }

    /// insert or overwrite a batch, notifying subscribers per leaf
    pub async fn patch(&self, chain: u64, leaves: impl IntoIterator<Item = CachedLeaf>) {
        let mut guard = self.leaves.write().await;
        for leaf in leaves {
            guard.insert((chain, leaf.index), leaf);
            let _ = self.updates.send(LeafUpdate {
                chain,
                index: leaf.index,
                rand: leaf.rand,
            });
        }
    }

    pub async fn len(&self) -> usize {
        self.leaves.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.leaves.read().await.is_empty()
    }
}

impl Default for LeafStore {
    fn default() -> Self {
        Self::new()
    }
}
