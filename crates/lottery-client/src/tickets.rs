//! bounded-concurrency multi-ticket resolution
//!
//! the dashboard path: evaluate many stored tickets against the local leaf
//! cache. resolution is a small bounded pool rather than a task per ticket;
//! completion order is not submission order, so outcomes carry their ticket

use alloy_primitives::U256;
use futures::stream::{self, StreamExt};
use tracing::warn;

use lottery_core::{compute_dice, compute_reward, Resolution, Ticket};

use crate::error::Result;
use crate::resolve::NetworkContext;

/// default pool width
pub const DEFAULT_CONCURRENCY: usize = 2;

/// a ticket queued for resolution
#[derive(Clone, Copy, Debug)]
pub struct TicketJob {
    pub ticket: Ticket,
    /// tree index if the bet transaction is known
    pub index: Option<u64>,
    /// revealed randomness if the caller already holds it
    pub rand: Option<U256>,
}

/// resolution outcome, correlated by ticket identity
#[derive(Clone, Copy, Debug)]
pub struct TicketOutcome {
    pub ticket: Ticket,
    pub index: u64,
    pub resolution: Resolution,
}

/// resolve many tickets with bounded concurrency
///
/// a ticket that fails to evaluate is skipped with a warning rather than
/// failing the whole batch
pub async fn process_tickets(
    ctx: &NetworkContext,
    jobs: Vec<TicketJob>,
    concurrency: usize,
) -> Vec<TicketOutcome> {
    let concurrency = concurrency.max(1);
    stream::iter(jobs.into_iter().map(|job| async move {
        match resolve_ticket(ctx, &job).await {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                warn!(index = job.index, %err, "skipping ticket");
                None
            }
        }
    }))
    .buffer_unordered(concurrency)
    .filter_map(|outcome| async move { outcome })
    .collect()
    .await
}

async fn resolve_ticket(ctx: &NetworkContext, job: &TicketJob) -> Result<TicketOutcome> {
    let Some(index) = job.index.filter(|&i| i > 0) else {
        return Ok(TicketOutcome {
            ticket: job.ticket,
            index: 0,
            resolution: Resolution::Pending,
        });
    };

    // caller-provided rand wins, then the cache; no network here — the
    // decoy-batch resolution path is what fills the cache
    let rand = match job.rand.filter(|r| !r.is_zero()) {
        Some(rand) => Some(rand),
        None => ctx
            .leaves
            .get(ctx.chain(), index)
            .await
            .map(|leaf| leaf.rand)
            .filter(|r| !r.is_zero()),
    };
    let Some(rand) = rand else {
        return Ok(TicketOutcome {
            ticket: job.ticket,
            index,
            resolution: Resolution::Pending,
        });
    };

    let dice = compute_dice(job.ticket.secret, rand, U256::from(index))?;
    let reward = compute_reward(job.ticket.power, dice)?;
    Ok(TicketOutcome {
        ticket: job.ticket,
        index,
        resolution: Resolution::Resolved(reward),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CachedLeaf;
    use crate::indexer::IndexerConfig;

    fn test_ctx() -> NetworkContext {
        NetworkContext::new(8453, IndexerConfig::new("http://indexer.invalid")).unwrap()
    }

    fn job(secret: u64, power: u8, index: Option<u64>, rand: Option<u64>) -> TicketJob {
        TicketJob {
            ticket: Ticket::new(U256::from(secret), power).unwrap(),
            index,
            rand: rand.map(U256::from),
        }
    }

    #[tokio::test]
    async fn test_unknown_index_is_pending() {
        let ctx = test_ctx();
        let outcomes = process_tickets(&ctx, vec![job(1, 0, None, None)], 2).await;
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].resolution, Resolution::Pending);
        assert_eq!(outcomes[0].resolution.status(), "Waiting");
    }

    #[tokio::test]
    async fn test_unrevealed_rand_is_pending() {
        let ctx = test_ctx();
        ctx.leaves
            .patch(8453, [CachedLeaf { index: 5, rand: U256::ZERO }])
            .await;
        let outcomes = process_tickets(&ctx, vec![job(1, 0, Some(5), None)], 2).await;
        assert_eq!(outcomes[0].resolution, Resolution::Pending);
    }

    #[tokio::test]
    async fn test_cached_rand_resolves() {
        let ctx = test_ctx();
        ctx.leaves
            .patch(8453, [CachedLeaf { index: 5, rand: U256::from(77u64) }])
            .await;
        let outcomes = process_tickets(&ctx, vec![job(1, 3, Some(5), None)], 2).await;
        assert_eq!(outcomes.len(), 1);
        let Resolution::Resolved(reward) = outcomes[0].resolution else {
            panic!("expected resolved");
        };
        // same inputs through the shared engine
        let dice = compute_dice(U256::from(1u64), U256::from(77u64), U256::from(5u64)).unwrap();
        assert_eq!(reward, compute_reward(3, dice).unwrap());
    }

    #[tokio::test]
    async fn test_batch_correlates_by_ticket() {
        let ctx = test_ctx();
        ctx.leaves
            .patch(
                8453,
                (1..=6u64).map(|i| CachedLeaf { index: i, rand: U256::from(1000 + i) }),
            )
            .await;
        let jobs: Vec<TicketJob> =
            (1..=6u64).map(|i| job(i, (i % 23) as u8, Some(i), None)).collect();
        let outcomes = process_tickets(&ctx, jobs, 2).await;
        assert_eq!(outcomes.len(), 6);
        for outcome in outcomes {
            // each outcome matches an independent recomputation for its own ticket
            let dice = compute_dice(
                outcome.ticket.secret,
                U256::from(1000 + outcome.index),
                U256::from(outcome.index),
            )
            .unwrap();
            let expected = compute_reward(outcome.ticket.power, dice).unwrap();
            assert_eq!(outcome.resolution, Resolution::Resolved(expected));
        }
    }
}
