//! RPC seam between the fetcher and a Solana node.
//!
//! Every remote call is funneled through [`LedgerRpc`], so the public query
//! methods pattern-match on typed results to build their sentinels and tests
//! can substitute an in-memory ledger for the real endpoint.

use solana_account_decoder::UiAccountEncoding;
use solana_client::rpc_client::{GetConfirmedSignaturesForAddress2Config, RpcClient};
use solana_client::rpc_config::{
    RpcAccountInfoConfig, RpcProgramAccountsConfig, RpcTransactionConfig,
};
use solana_client::rpc_response::RpcConfirmedTransactionStatusWithSignature;
use solana_sdk::account::Account;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_transaction_status::UiTransactionEncoding;
use thiserror::Error;

use crate::config::FetcherConfig;

/// Ledger access errors
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("RPC error: {0}")]
    Rpc(String),
    #[error("Invalid pubkey: {0}")]
    InvalidPubkey(String),
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
    #[error("Keypair error: {0}")]
    Keypair(String),
}

/// The facts the fetcher needs from a fetched transaction.
#[derive(Debug, Clone, Copy)]
pub struct TxOutcome {
    pub fee: u64,
    /// True iff the transaction's reported error field is null.
    pub succeeded: bool,
}

/// Read-side RPC surface the fetcher depends on.
pub trait LedgerRpc: Send + Sync {
    /// Accounts owned by `program`, in node order.
    fn program_accounts(&self, program: &Pubkey) -> Result<Vec<(Pubkey, Account)>, LedgerError>;

    /// Account lookup; absence is `Ok(None)`, not an error.
    fn account(&self, pubkey: &Pubkey) -> Result<Option<Account>, LedgerError>;

    /// Up to `limit` most recent signatures for `address`, newest first.
    fn signatures_for(
        &self,
        address: &Pubkey,
        limit: usize,
    ) -> Result<Vec<RpcConfirmedTransactionStatusWithSignature>, LedgerError>;

    /// Outcome of a confirmed transaction. A transaction the node cannot
    /// return (absent or unreachable) surfaces as `Err`.
    fn transaction(&self, signature: &Signature) -> Result<TxOutcome, LedgerError>;
}

/// [`LedgerRpc`] over a live Solana JSON-RPC endpoint.
pub struct SolanaLedger {
    client: RpcClient,
    commitment: CommitmentConfig,
}

impl SolanaLedger {
    /// Connect to the endpoint named by `config`. The handle is reused for
    /// every subsequent call.
    pub fn new(config: &FetcherConfig) -> Self {
        let client = RpcClient::new_with_commitment(config.endpoint(), config.commitment);
        Self {
            client,
            commitment: config.commitment,
        }
    }
}

impl LedgerRpc for SolanaLedger {
    fn program_accounts(&self, program: &Pubkey) -> Result<Vec<(Pubkey, Account)>, LedgerError> {
        let config = RpcProgramAccountsConfig {
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(self.commitment),
                ..RpcAccountInfoConfig::default()
            },
            ..RpcProgramAccountsConfig::default()
        };
        self.client
            .get_program_accounts_with_config(program, config)
            .map_err(|e| LedgerError::Rpc(e.to_string()))
    }

    fn account(&self, pubkey: &Pubkey) -> Result<Option<Account>, LedgerError> {
        self.client
            .get_account_with_commitment(pubkey, self.commitment)
            .map(|response| response.value)
            .map_err(|e| LedgerError::Rpc(e.to_string()))
    }

    fn signatures_for(
        &self,
        address: &Pubkey,
        limit: usize,
    ) -> Result<Vec<RpcConfirmedTransactionStatusWithSignature>, LedgerError> {
        let config = GetConfirmedSignaturesForAddress2Config {
            before: None,
            until: None,
            limit: Some(limit),
            commitment: Some(self.commitment),
        };
        self.client
            .get_signatures_for_address_with_config(address, config)
            .map_err(|e| LedgerError::Rpc(e.to_string()))
    }

    fn transaction(&self, signature: &Signature) -> Result<TxOutcome, LedgerError> {
        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::Json),
            commitment: Some(self.commitment),
            max_supported_transaction_version: Some(0),
        };
        let tx = self
            .client
            .get_transaction_with_config(signature, config)
            .map_err(|e| LedgerError::Rpc(e.to_string()))?;

        // A transaction without meta carries neither fee nor status; treat it
        // like one the node could not return.
        let meta = tx
            .transaction
            .meta
            .ok_or_else(|| LedgerError::Rpc(format!("no meta for transaction {}", signature)))?;
        Ok(TxOutcome {
            fee: meta.fee,
            succeeded: meta.err.is_none(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LedgerError::Rpc("connection refused".to_string());
        assert_eq!(format!("{}", err), "RPC error: connection refused");

        let err = LedgerError::InvalidPubkey("bad length".to_string());
        assert!(format!("{}", err).contains("Invalid pubkey"));
    }

    #[test]
    fn test_ledger_construction() {
        let ledger = SolanaLedger::new(&FetcherConfig::default());
        assert_eq!(ledger.commitment, CommitmentConfig::confirmed());
    }
}
