//! Program-scoped read queries against the Agbero bond program.
//!
//! Every public query swallows its own faults: callers always get a
//! collection or a sentinel record back, never an error. Faults are logged at
//! the point of occurrence.

use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use tracing::{info, warn};

use crate::config::FetcherConfig;
use crate::decode::{BondDecoder, LengthOnlyDecoder};
use crate::rpc::{LedgerError, LedgerRpc, SolanaLedger};

/// Signatures inspected by `get_recent_activity` when the caller has no
/// preference.
pub const DEFAULT_ACTIVITY_LIMIT: usize = 10;

/// One bond account, as listed by [`DataFetcher::fetch_all_bonds`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BondRecord {
    /// Positional id (`bond-<n>`, 1-based over the node's ordering). Not a
    /// stable key across calls.
    pub id: String,
    /// Base58 address of the bond account.
    pub address: String,
    pub balance: u64,
    pub data_size: usize,
    pub exists: bool,
}

/// Metadata of the program account itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramInfo {
    pub exists: bool,
    pub executable: bool,
    pub lamports: u64,
    pub data_size: usize,
    pub owner: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProgramInfo {
    fn missing(error: impl Into<String>) -> Self {
        Self {
            exists: false,
            executable: false,
            lamports: 0,
            data_size: 0,
            owner: String::new(),
            error: Some(error.into()),
        }
    }
}

/// One recent transaction touching the program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub signature: String,
    /// Block time in unix seconds, when the node reports one.
    pub timestamp: Option<i64>,
    pub slot: u64,
    pub success: bool,
    pub fee: u64,
}

/// Composed snapshot returned by [`DataFetcher::get_stats`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherStats {
    pub total_bonds: usize,
    pub program_info: ProgramInfo,
    pub network: String,
    /// RFC 3339 capture time.
    pub timestamp: String,
}

/// Read-only client bound to one program on one cluster.
pub struct DataFetcher {
    program_id: Pubkey,
    network: String,
    ledger: Box<dyn LedgerRpc>,
    decoder: Box<dyn BondDecoder>,
}

impl DataFetcher {
    /// Connect to the cluster named by `config`. Fails only on an
    /// unparseable program id.
    pub fn new(config: &FetcherConfig) -> Result<Self, LedgerError> {
        let ledger = SolanaLedger::new(config);
        Self::with_backend(config, Box::new(ledger), Box::new(LengthOnlyDecoder))
    }

    /// Constructor with injected backends, for embedders and tests.
    pub fn with_backend(
        config: &FetcherConfig,
        ledger: Box<dyn LedgerRpc>,
        decoder: Box<dyn BondDecoder>,
    ) -> Result<Self, LedgerError> {
        let program_id = Pubkey::from_str(&config.program_id)
            .map_err(|e| LedgerError::InvalidPubkey(e.to_string()))?;
        Ok(Self {
            program_id,
            network: config.network.to_string(),
            ledger,
            decoder,
        })
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    /// All bond accounts owned by the program, in node order. An RPC failure
    /// yields an empty listing; an entry that fails to decode is dropped
    /// without touching the rest of the batch.
    pub fn fetch_all_bonds(&self) -> Vec<BondRecord> {
        info!(program = %self.program_id, "fetching bond accounts");
        let accounts = match self.ledger.program_accounts(&self.program_id) {
            Ok(accounts) => accounts,
            Err(e) => {
                warn!(error = %e, "bond account listing failed");
                return Vec::new();
            }
        };
        info!(count = accounts.len(), "found bond accounts");

        accounts
            .iter()
            .enumerate()
            .filter_map(|(index, (pubkey, account))| {
                match self.decoder.decode(&account.data) {
                    Ok(data) => Some(BondRecord {
                        // Ids number the node's ordering; a dropped entry
                        // leaves a gap rather than renumbering its successors.
                        id: format!("bond-{}", index + 1),
                        address: pubkey.to_string(),
                        balance: data.balance,
                        data_size: data.data_size,
                        exists: data.exists,
                    }),
                    Err(e) => {
                        warn!(address = %pubkey, error = %e, "skipping undecodable bond account");
                        None
                    }
                }
            })
            .collect()
    }

    /// Metadata of the program account itself. Absence and transport faults
    /// both come back as `exists: false` sentinels carrying a message.
    pub fn get_program_info(&self) -> ProgramInfo {
        match self.ledger.account(&self.program_id) {
            Ok(Some(account)) => ProgramInfo {
                exists: true,
                executable: account.executable,
                lamports: account.lamports,
                data_size: account.data.len(),
                owner: account.owner.to_string(),
                error: None,
            },
            Ok(None) => ProgramInfo::missing("Program not found"),
            Err(e) => {
                warn!(error = %e, "program info lookup failed");
                ProgramInfo::missing(e.to_string())
            }
        }
    }

    /// Up to `limit` recent transactions touching the program, newest first.
    /// Detail fetches run one at a time; a signature whose transaction cannot
    /// be fetched is skipped, and a failed listing call yields an empty vec.
    pub fn get_recent_activity(&self, limit: usize) -> Vec<ActivityRecord> {
        let signatures = match self.ledger.signatures_for(&self.program_id, limit) {
            Ok(signatures) => signatures,
            Err(e) => {
                warn!(error = %e, "signature listing failed");
                return Vec::new();
            }
        };

        let mut activities = Vec::with_capacity(signatures.len());
        for sig_info in &signatures {
            let signature = match sig_info.signature.parse::<Signature>() {
                Ok(signature) => signature,
                Err(e) => {
                    warn!(signature = %sig_info.signature, error = %e, "skipping unparseable signature");
                    continue;
                }
            };
            match self.ledger.transaction(&signature) {
                Ok(outcome) => activities.push(ActivityRecord {
                    signature: sig_info.signature.clone(),
                    timestamp: sig_info.block_time,
                    slot: sig_info.slot,
                    success: outcome.succeeded,
                    fee: outcome.fee,
                }),
                Err(e) => {
                    warn!(signature = %sig_info.signature, error = %e, "skipping transaction detail");
                }
            }
        }
        activities
    }

    /// Snapshot composed from a bond listing and a program info lookup, run
    /// back to back.
    pub fn get_stats(&self) -> FetcherStats {
        let bonds = self.fetch_all_bonds();
        let program_info = self.get_program_info();

        FetcherStats {
            total_bonds: bonds.len(),
            program_info,
            network: self.network.clone(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}
