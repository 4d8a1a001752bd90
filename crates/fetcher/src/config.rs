//! Fetcher configuration.
//!
//! The program identity and target cluster are ordinary configuration values
//! handed to the client constructor, so embedders and tests can point the
//! fetcher at alternate programs or endpoints without touching globals.

use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use solana_sdk::commitment_config::CommitmentConfig;

/// The deployed Agbero bond program.
pub const AGBERO_PROGRAM_ID: &str = "CjgZCZi8j4Hh4M5sctFN866w7Wg7Dn6N1JPYVRWFxGhT";

/// Named Solana clusters the fetcher can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Devnet,
    Testnet,
    Localnet,
}

impl Network {
    /// Public RPC endpoint for the cluster.
    pub fn rpc_url(&self) -> &'static str {
        match self {
            Network::Mainnet => "https://api.mainnet-beta.solana.com",
            Network::Devnet => "https://api.devnet.solana.com",
            Network::Testnet => "https://api.testnet.solana.com",
            Network::Localnet => "http://127.0.0.1:8899",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Network::Mainnet => "mainnet",
            Network::Devnet => "devnet",
            Network::Testnet => "testnet",
            Network::Localnet => "localnet",
        };
        f.write_str(name)
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "mainnet-beta" => Ok(Network::Mainnet),
            "devnet" => Ok(Network::Devnet),
            "testnet" => Ok(Network::Testnet),
            "localnet" | "localhost" => Ok(Network::Localnet),
            other => Err(format!("unknown network: {}", other)),
        }
    }
}

/// Configuration for [`DataFetcher`](crate::fetcher::DataFetcher).
///
/// The program id is carried as a base58 string and parsed at client
/// construction, which is the one place a bad value can be rejected.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Base58 public key of the program whose accounts are queried.
    pub program_id: String,
    /// Target cluster; also names the snapshot's `network` field.
    pub network: Network,
    /// Commitment level applied to every query.
    pub commitment: CommitmentConfig,
    /// Explicit endpoint override; defaults to the cluster's public RPC.
    pub rpc_url: Option<String>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            program_id: AGBERO_PROGRAM_ID.to_string(),
            network: Network::Devnet,
            commitment: CommitmentConfig::confirmed(),
            rpc_url: None,
        }
    }
}

impl FetcherConfig {
    /// Default configuration with environment overrides applied
    /// (`AGBERO_PROGRAM_ID`, `AGBERO_NETWORK`, `SOLANA_RPC_URL`).
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(program_id) = env::var("AGBERO_PROGRAM_ID") {
            config.program_id = program_id;
        }
        if let Ok(network) = env::var("AGBERO_NETWORK") {
            if let Ok(network) = network.parse() {
                config.network = network;
            }
        }
        config.rpc_url = env::var("SOLANA_RPC_URL").ok();
        config
    }

    /// Endpoint the client will connect to.
    pub fn endpoint(&self) -> String {
        self.rpc_url
            .clone()
            .unwrap_or_else(|| self.network.rpc_url().to_string())
    }
}
