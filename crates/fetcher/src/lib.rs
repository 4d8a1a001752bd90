//! Read-only data access for the Agbero bond program.
//!
//! Wraps a Solana JSON-RPC endpoint and exposes program-scoped queries:
//! bond account listings, program account metadata, recent transaction
//! activity, and a composed stats snapshot. A companion module anchors
//! fetcher-side actions on-chain via memo transactions.

pub mod activity_log;
pub mod config;
pub mod decode;
pub mod fetcher;
pub mod rpc;

// Re-export key types
pub use activity_log::{ActivityLogger, ActivityStats};
pub use config::{FetcherConfig, Network, AGBERO_PROGRAM_ID};
pub use decode::{BondAccountData, BondDecoder, DecodeError, LengthOnlyDecoder};
pub use fetcher::{
    ActivityRecord, BondRecord, DataFetcher, FetcherStats, ProgramInfo, DEFAULT_ACTIVITY_LIMIT,
};
pub use rpc::{LedgerError, LedgerRpc, SolanaLedger, TxOutcome};
