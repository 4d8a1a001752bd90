//! On-chain activity logging via the SPL Memo program.
//!
//! Every logged action is hashed, signed, and anchored on the cluster as a
//! memo transaction, leaving a verifiable record of what the fetcher-side
//! tooling actually did.

use std::path::Path;
use std::str::FromStr;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use solana_client::rpc_client::RpcClient;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{read_keypair_file, Keypair, Signer};
use solana_sdk::transaction::Transaction;
use tracing::warn;

use crate::config::FetcherConfig;
use crate::rpc::LedgerError;

/// SPL Memo program.
const MEMO_PROGRAM_ID: &str = "MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr";

/// Counters over a logger's lifetime.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityStats {
    pub total_activities: u64,
    pub agent: String,
    pub validator: String,
    pub network: String,
}

/// Anchors fetcher-side actions on-chain, one memo transaction per action.
pub struct ActivityLogger {
    client: RpcClient,
    payer: Keypair,
    network: String,
    sequence: u64,
}

impl ActivityLogger {
    /// Load the payer keypair and connect to the configured cluster.
    pub fn new(config: &FetcherConfig, keypair_path: &Path) -> Result<Self, LedgerError> {
        let payer =
            read_keypair_file(keypair_path).map_err(|e| LedgerError::Keypair(e.to_string()))?;
        let client = RpcClient::new_with_commitment(config.endpoint(), config.commitment);
        Ok(Self {
            client,
            payer,
            network: config.network.to_string(),
            sequence: 0,
        })
    }

    /// Hash, sign, and anchor one action. A send failure degrades to a
    /// `local-<hash>` marker so the caller keeps a trail either way.
    pub fn log_activity(&mut self, action: &str, data: serde_json::Value) -> String {
        self.sequence += 1;
        let timestamp = Utc::now().to_rfc3339();
        let payload = json!({
            "agent": "agbero",
            "action": action,
            "data": data,
            "timestamp": timestamp,
            "sequence": self.sequence,
        });
        let payload_hash = Self::hash_payload(&payload);
        let memo = format!("AGBERO:{}:{}:{}", action, payload_hash, timestamp);

        match self.submit_memo(&memo) {
            Ok(signature) => signature,
            Err(e) => {
                warn!(action = action, error = %e, "activity not anchored on-chain");
                format!("local-{}", payload_hash)
            }
        }
    }

    pub fn log_bond_created(
        &mut self,
        bond_id: &str,
        principal: &str,
        collateral_sol: f64,
    ) -> String {
        self.log_activity(
            "bond_created",
            json!({
                "bond_id": bond_id,
                "principal": principal,
                "collateral_sol": collateral_sol,
            }),
        )
    }

    pub fn log_verification_vote(
        &mut self,
        bond_id: &str,
        approve: bool,
        confidence: f64,
    ) -> String {
        self.log_activity(
            "verification_vote",
            json!({
                "bond_id": bond_id,
                "approve": approve,
                "confidence": confidence,
                "validator": self.payer.pubkey().to_string(),
            }),
        )
    }

    pub fn log_bond_finalized(&mut self, bond_id: &str, outcome: &str, stake_sol: f64) -> String {
        self.log_activity(
            "bond_finalized",
            json!({
                "bond_id": bond_id,
                "outcome": outcome,
                "stake_amount_sol": stake_sol,
            }),
        )
    }

    pub fn stats(&self) -> ActivityStats {
        ActivityStats {
            total_activities: self.sequence,
            agent: "agbero".to_string(),
            validator: self.payer.pubkey().to_string(),
            network: self.network.clone(),
        }
    }

    fn submit_memo(&self, memo: &str) -> Result<String, LedgerError> {
        let memo_program = Pubkey::from_str(MEMO_PROGRAM_ID)
            .map_err(|e| LedgerError::InvalidPubkey(e.to_string()))?;
        let instruction = Instruction {
            program_id: memo_program,
            accounts: vec![AccountMeta::new_readonly(self.payer.pubkey(), true)],
            data: memo.as_bytes().to_vec(),
        };

        let recent_blockhash = self
            .client
            .get_latest_blockhash()
            .map_err(|e| LedgerError::Rpc(e.to_string()))?;
        let message = Message::new(&[instruction], Some(&self.payer.pubkey()));
        let mut transaction = Transaction::new_unsigned(message);
        transaction.sign(&[&self.payer], recent_blockhash);

        self.client
            .send_and_confirm_transaction(&transaction)
            .map(|sig| sig.to_string())
            .map_err(|e| LedgerError::Rpc(e.to_string()))
    }

    /// First 16 hex chars of the payload's SHA-256.
    fn hash_payload(payload: &serde_json::Value) -> String {
        let mut hasher = Sha256::new();
        hasher.update(payload.to_string().as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        digest[..16].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_hash_is_short_hex() {
        let hash = ActivityLogger::hash_payload(&json!({"action": "startup"}));
        assert_eq!(hash.len(), 16);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_payload_hash_is_deterministic() {
        let payload = json!({"action": "bond_created", "sequence": 3});
        assert_eq!(
            ActivityLogger::hash_payload(&payload),
            ActivityLogger::hash_payload(&payload)
        );
        assert_ne!(
            ActivityLogger::hash_payload(&payload),
            ActivityLogger::hash_payload(&json!({"action": "bond_created", "sequence": 4}))
        );
    }

    #[test]
    fn test_memo_program_id_parses() {
        assert!(Pubkey::from_str(MEMO_PROGRAM_ID).is_ok());
    }
}
