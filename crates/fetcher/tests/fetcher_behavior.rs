//! Behavior tests for the public query surface.
//!
//! A fake in-memory ledger stands in for the RPC endpoint so every
//! swallow-and-log path can be driven deterministically.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use agbero_fetcher::config::FetcherConfig;
use agbero_fetcher::decode::{BondAccountData, BondDecoder, DecodeError, LengthOnlyDecoder};
use agbero_fetcher::fetcher::DataFetcher;
use agbero_fetcher::rpc::{LedgerError, LedgerRpc, TxOutcome};
use solana_client::rpc_response::RpcConfirmedTransactionStatusWithSignature;
use solana_sdk::account::Account;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;

#[derive(Default)]
struct FakeLedger {
    accounts: Vec<(Pubkey, Account)>,
    program_account: Option<Account>,
    signatures: Vec<RpcConfirmedTransactionStatusWithSignature>,
    outcomes: HashMap<Signature, TxOutcome>,
    fail_listing: bool,
    fail_account: bool,
    fail_signatures: bool,
    detail_calls: Arc<AtomicUsize>,
}

impl LedgerRpc for FakeLedger {
    fn program_accounts(&self, _program: &Pubkey) -> Result<Vec<(Pubkey, Account)>, LedgerError> {
        if self.fail_listing {
            return Err(LedgerError::Rpc("node unavailable".to_string()));
        }
        Ok(self.accounts.clone())
    }

    fn account(&self, _pubkey: &Pubkey) -> Result<Option<Account>, LedgerError> {
        if self.fail_account {
            return Err(LedgerError::Rpc("node unavailable".to_string()));
        }
        Ok(self.program_account.clone())
    }

    fn signatures_for(
        &self,
        _address: &Pubkey,
        limit: usize,
    ) -> Result<Vec<RpcConfirmedTransactionStatusWithSignature>, LedgerError> {
        if self.fail_signatures {
            return Err(LedgerError::Rpc("node unavailable".to_string()));
        }
        Ok(self.signatures.iter().take(limit).cloned().collect())
    }

    fn transaction(&self, signature: &Signature) -> Result<TxOutcome, LedgerError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.outcomes
            .get(signature)
            .copied()
            .ok_or_else(|| LedgerError::Rpc("transaction not found".to_string()))
    }
}

/// Fails on a marker byte so the batch-skip path can be driven; the
/// placeholder decoder itself never fails.
struct MarkerDecoder;

impl BondDecoder for MarkerDecoder {
    fn decode(&self, data: &[u8]) -> Result<BondAccountData, DecodeError> {
        if data.first() == Some(&0xFF) {
            return Err(DecodeError::Truncated(data.len()));
        }
        LengthOnlyDecoder.decode(data)
    }
}

fn bond_account(data: Vec<u8>) -> Account {
    Account {
        lamports: 1_000_000,
        data,
        owner: Pubkey::new_unique(),
        executable: false,
        rent_epoch: 0,
    }
}

fn signature_entry(
    signature: &Signature,
    slot: u64,
    block_time: Option<i64>,
) -> RpcConfirmedTransactionStatusWithSignature {
    RpcConfirmedTransactionStatusWithSignature {
        signature: signature.to_string(),
        slot,
        err: None,
        memo: None,
        block_time,
        confirmation_status: None,
    }
}

fn fetcher_over(ledger: FakeLedger) -> DataFetcher {
    DataFetcher::with_backend(
        &FetcherConfig::default(),
        Box::new(ledger),
        Box::new(LengthOnlyDecoder),
    )
    .unwrap()
}

#[test]
fn rpc_failure_yields_empty_bond_listing() {
    let fetcher = fetcher_over(FakeLedger {
        fail_listing: true,
        ..FakeLedger::default()
    });
    assert!(fetcher.fetch_all_bonds().is_empty());
}

#[test]
fn rpc_failure_yields_program_info_sentinel() {
    let fetcher = fetcher_over(FakeLedger {
        fail_account: true,
        ..FakeLedger::default()
    });
    let info = fetcher.get_program_info();
    assert!(!info.exists);
    let message = info.error.expect("sentinel carries the fault message");
    assert!(!message.is_empty());
}

#[test]
fn missing_program_reports_not_found() {
    let fetcher = fetcher_over(FakeLedger::default());
    let info = fetcher.get_program_info();
    assert!(!info.exists);
    assert_eq!(info.error.as_deref(), Some("Program not found"));
}

#[test]
fn program_info_maps_account_metadata() {
    let owner = Pubkey::new_unique();
    let fetcher = fetcher_over(FakeLedger {
        program_account: Some(Account {
            lamports: 5_000_000,
            data: vec![0u8; 36],
            owner,
            executable: true,
            rent_epoch: 200,
        }),
        ..FakeLedger::default()
    });

    let info = fetcher.get_program_info();
    assert!(info.exists);
    assert!(info.executable);
    assert_eq!(info.lamports, 5_000_000);
    assert_eq!(info.data_size, 36);
    assert_eq!(info.owner, owner.to_string());
    assert!(info.error.is_none());
}

#[test]
fn bonds_map_in_node_order_with_positional_ids() {
    let keys: Vec<Pubkey> = (0..3).map(|_| Pubkey::new_unique()).collect();
    let fetcher = fetcher_over(FakeLedger {
        accounts: vec![
            (keys[0], bond_account(vec![1u8; 10])),
            (keys[1], bond_account(vec![])),
            (keys[2], bond_account(vec![2u8; 5])),
        ],
        ..FakeLedger::default()
    });

    let bonds = fetcher.fetch_all_bonds();
    assert_eq!(bonds.len(), 3);
    for (n, (bond, key)) in bonds.iter().zip(&keys).enumerate() {
        assert_eq!(bond.id, format!("bond-{}", n + 1));
        assert_eq!(bond.address, key.to_string());
        assert_eq!(bond.balance, 0);
        assert!(bond.exists);
    }
    assert_eq!(bonds[0].data_size, 10);
    assert_eq!(bonds[1].data_size, 0);
    assert_eq!(bonds[2].data_size, 5);
}

#[test]
fn decode_failure_drops_entry_and_leaves_numbering_gap() {
    let keys: Vec<Pubkey> = (0..3).map(|_| Pubkey::new_unique()).collect();
    let ledger = FakeLedger {
        accounts: vec![
            (keys[0], bond_account(vec![1u8; 10])),
            (keys[1], bond_account(vec![0xFF, 0, 0])),
            (keys[2], bond_account(vec![2u8; 5])),
        ],
        ..FakeLedger::default()
    };
    let fetcher = DataFetcher::with_backend(
        &FetcherConfig::default(),
        Box::new(ledger),
        Box::new(MarkerDecoder),
    )
    .unwrap();

    let bonds = fetcher.fetch_all_bonds();
    assert_eq!(bonds.len(), 2);
    assert_eq!(bonds[0].id, "bond-1");
    assert_eq!(bonds[0].address, keys[0].to_string());
    assert_eq!(bonds[1].id, "bond-3");
    assert_eq!(bonds[1].address, keys[2].to_string());
}

#[test]
fn zero_limit_issues_no_detail_calls() {
    let signature = Signature::new_unique();
    let detail_calls = Arc::new(AtomicUsize::new(0));
    let fetcher = fetcher_over(FakeLedger {
        signatures: vec![signature_entry(&signature, 100, Some(1_700_000_000))],
        detail_calls: detail_calls.clone(),
        ..FakeLedger::default()
    });

    assert!(fetcher.get_recent_activity(0).is_empty());
    assert_eq!(detail_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn activity_records_combine_listing_and_outcome() {
    let first = Signature::new_unique();
    let second = Signature::new_unique();
    let mut outcomes = HashMap::new();
    outcomes.insert(
        first,
        TxOutcome {
            fee: 5_000,
            succeeded: true,
        },
    );
    outcomes.insert(
        second,
        TxOutcome {
            fee: 10_000,
            succeeded: true,
        },
    );

    let fetcher = fetcher_over(FakeLedger {
        signatures: vec![
            signature_entry(&first, 210, Some(1_700_000_050)),
            signature_entry(&second, 200, None),
        ],
        outcomes,
        ..FakeLedger::default()
    });

    let activity = fetcher.get_recent_activity(2);
    assert_eq!(activity.len(), 2);

    // Newest first, exactly as the listing returned them.
    assert_eq!(activity[0].signature, first.to_string());
    assert_eq!(activity[0].slot, 210);
    assert_eq!(activity[0].timestamp, Some(1_700_000_050));
    assert_eq!(activity[0].fee, 5_000);
    assert!(activity[0].success);

    assert_eq!(activity[1].signature, second.to_string());
    assert_eq!(activity[1].timestamp, None);
    assert!(activity[1].success);
}

#[test]
fn failed_detail_fetch_skips_that_signature() {
    let resolvable = Signature::new_unique();
    let unresolvable = Signature::new_unique();
    let mut outcomes = HashMap::new();
    outcomes.insert(
        resolvable,
        TxOutcome {
            fee: 5_000,
            succeeded: false,
        },
    );

    let fetcher = fetcher_over(FakeLedger {
        signatures: vec![
            signature_entry(&unresolvable, 301, Some(1_700_000_100)),
            signature_entry(&resolvable, 300, Some(1_700_000_090)),
        ],
        outcomes,
        ..FakeLedger::default()
    });

    let activity = fetcher.get_recent_activity(10);
    assert_eq!(activity.len(), 1);
    assert_eq!(activity[0].signature, resolvable.to_string());
    assert!(!activity[0].success);
}

#[test]
fn failed_signature_listing_yields_empty_activity() {
    let fetcher = fetcher_over(FakeLedger {
        fail_signatures: true,
        ..FakeLedger::default()
    });
    assert!(fetcher.get_recent_activity(10).is_empty());
}

#[test]
fn stats_total_matches_bond_listing() {
    let accounts: Vec<(Pubkey, Account)> = (0..4)
        .map(|n| (Pubkey::new_unique(), bond_account(vec![0u8; n])))
        .collect();
    let program_account = Some(bond_account(vec![0u8; 36]));

    let fetcher = fetcher_over(FakeLedger {
        accounts: accounts.clone(),
        program_account: program_account.clone(),
        ..FakeLedger::default()
    });
    let stats = fetcher.get_stats();

    let independent = fetcher_over(FakeLedger {
        accounts,
        program_account,
        ..FakeLedger::default()
    });
    assert_eq!(stats.total_bonds, independent.fetch_all_bonds().len());
    assert_eq!(stats.network, "devnet");
    assert!(stats.program_info.exists);
    assert!(chrono::DateTime::parse_from_rfc3339(&stats.timestamp).is_ok());
}
