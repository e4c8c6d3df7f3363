//! shielded lottery client
//!
//! the async shell around `lottery-core`: indexer access, decoy-batch bet
//! resolution, the withdrawal proof pipeline, witness encoding, what-if
//! simulation and bounded multi-ticket processing
//!
//! # claim pipeline
//!
//! ```text
//! ticket hex ─▶ parse ─▶ lookup key ─▶ resolve (decoy batch | direct)
//!                                          │
//!                          dice ◀── (secret, rand, index)
//!                            │
//!                 reward bits + nullifier
//!                            │
//!            merkle path ─▶ circuit input ─▶ external prover
//!                                                  │
//!                                        abi witness (480 bytes)
//! ```
//!
//! retriable conditions (`BetNotFound`, `BetStillProcessing`) mean the chain
//! has not finished with the bet; everything else is fatal for the attempt

pub mod cache;
pub mod error;
pub mod indexer;
pub mod prover;
pub mod resolve;
pub mod simulate;
pub mod tickets;
pub mod withdraw;
pub mod witness;

pub use cache::{CachedLeaf, LeafStore, LeafUpdate};
pub use error::{Error, Result};
pub use indexer::{BetInfo, IndexerClient, IndexerConfig, LastLeaf};
pub use prover::{SnarkjsProver, WithdrawProver};
pub use resolve::{
    find_bet_safe, find_bets_safe, resolve_bet, NetworkContext, ResolvedBet,
    DEFAULT_DECOY_TRIES,
};
pub use simulate::{simulate, PowerStats, DEFAULT_DRAWS, MAX_DRAWS};
pub use tickets::{process_tickets, TicketJob, TicketOutcome, DEFAULT_CONCURRENCY};
pub use withdraw::{
    build_withdrawal, validate_path, CircuitInput, Withdrawal, WithdrawRequest,
    PATH_ELEMENTS,
};
pub use witness::{encode_witness, witness_hex, Groth16Proof, PublicSignals};
