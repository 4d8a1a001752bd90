use std::collections::HashSet;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;

use agbero_fetcher::config::{FetcherConfig, Network};
use agbero_fetcher::fetcher::{DataFetcher, ProgramInfo, DEFAULT_ACTIVITY_LIMIT};

#[derive(Parser)]
#[command(name = "agbero-fetcher")]
#[command(about = "Real-time on-chain data fetcher for the Agbero bond program")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Target cluster
    #[arg(
        long,
        global = true,
        env = "AGBERO_NETWORK",
        default_value = "devnet",
        value_name = "CLUSTER"
    )]
    network: Network,

    /// Program to query
    #[arg(long, global = true, env = "AGBERO_PROGRAM_ID", value_name = "PUBKEY")]
    program_id: Option<String>,

    /// Explicit RPC endpoint override
    #[arg(long, global = true, env = "SOLANA_RPC_URL", value_name = "URL")]
    rpc_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List every bond account owned by the program
    Bonds,
    /// Show the program account's metadata
    Info,
    /// Show recent transactions touching the program
    Activity {
        /// How many recent signatures to inspect
        #[arg(long, default_value_t = DEFAULT_ACTIVITY_LIMIT)]
        limit: usize,
    },
    /// Composed snapshot: bond count, program info, network, timestamp
    Stats {
        /// Emit the snapshot as pretty JSON
        #[arg(long)]
        json: bool,
    },
    /// Poll for new program activity until Ctrl-C
    Watch {
        /// Poll interval in seconds
        #[arg(long, default_value_t = 5)]
        interval: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .init();

    let cli = Cli::parse();

    let mut config = FetcherConfig {
        network: cli.network,
        rpc_url: cli.rpc_url,
        ..FetcherConfig::default()
    };
    if let Some(program_id) = cli.program_id {
        config.program_id = program_id;
    }

    let fetcher = DataFetcher::new(&config)?;

    match cli.command {
        None => run_overview(&fetcher),
        Some(Commands::Bonds) => run_bonds(&fetcher),
        Some(Commands::Info) => run_info(&fetcher),
        Some(Commands::Activity { limit }) => run_activity(&fetcher, limit),
        Some(Commands::Stats { json }) => run_stats(&fetcher, json)?,
        Some(Commands::Watch { interval }) => run_watch(&fetcher, interval).await,
    }

    Ok(())
}

/// The default sequence: program check, bond count, five most recent
/// transactions with truncated signatures and success marks.
fn run_overview(fetcher: &DataFetcher) {
    println!("{}", "🛡️  Agbero Real-Time Data Fetcher".bold());
    println!();

    println!("{}", "1️⃣  Checking program...".bright_black());
    let info = fetcher.get_program_info();
    print_program_info(&info);

    println!();
    println!("{}", "2️⃣  Fetching bonds...".bright_black());
    let bonds = fetcher.fetch_all_bonds();
    println!("Found {} bonds", bonds.len());

    println!();
    println!("{}", "3️⃣  Fetching recent activity...".bright_black());
    let activity = fetcher.get_recent_activity(5);
    println!("Found {} recent transactions", activity.len());
    for record in &activity {
        let mark = if record.success { "✅" } else { "❌" };
        println!(
            "  - {}... ({})",
            truncate_signature(&record.signature),
            mark
        );
    }

    println!();
    println!("{}", "✅ Data fetch complete".bright_green());
}

fn run_bonds(fetcher: &DataFetcher) {
    let bonds = fetcher.fetch_all_bonds();
    println!("{}", format!("--- BOND ACCOUNTS ({}) ---", bonds.len()).bold());
    for bond in &bonds {
        println!("{:10} {}  {} bytes", bond.id, bond.address, bond.data_size);
    }
}

fn run_info(fetcher: &DataFetcher) {
    println!("{}", "--- PROGRAM INFO ---".bold());
    println!("Program: {}", fetcher.program_id());
    print_program_info(&fetcher.get_program_info());
}

fn run_activity(fetcher: &DataFetcher, limit: usize) {
    let activity = fetcher.get_recent_activity(limit);
    println!(
        "{}",
        format!("--- RECENT ACTIVITY ({}) ---", activity.len()).bold()
    );
    for record in &activity {
        let mark = if record.success { "✅" } else { "❌" };
        let when = record
            .timestamp
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{} slot {:>10}  {}...  fee {} lamports  time {}",
            mark,
            record.slot,
            truncate_signature(&record.signature),
            record.fee,
            when
        );
    }
}

fn run_stats(fetcher: &DataFetcher, json: bool) -> Result<()> {
    let stats = fetcher.get_stats();
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }
    println!("{}", "--- AGBERO SNAPSHOT ---".bold());
    println!("Network:     {}", stats.network);
    println!("Total bonds: {}", stats.total_bonds);
    println!("Captured:    {}", stats.timestamp);
    print_program_info(&stats.program_info);
    Ok(())
}

/// Poll the signature listing and print entries not seen before.
async fn run_watch(fetcher: &DataFetcher, interval: u64) {
    println!(
        "{}",
        format!(
            "Watching {} for new activity (Ctrl-C to stop)...",
            fetcher.program_id()
        )
        .bright_black()
    );
    let mut seen: HashSet<String> = HashSet::new();
    let mut ticker = tokio::time::interval(Duration::from_secs(interval.max(1)));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                for record in fetcher.get_recent_activity(DEFAULT_ACTIVITY_LIMIT) {
                    if seen.insert(record.signature.clone()) {
                        let mark = if record.success { "✅" } else { "❌" };
                        println!("{} slot {:>10}  {}", mark, record.slot, record.signature);
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                println!("{}", "Watch stopped".bright_black());
                break;
            }
        }
    }
}

fn print_program_info(info: &ProgramInfo) {
    if !info.exists {
        let message = info.error.as_deref().unwrap_or("unknown");
        println!("{} {}", "✗".bright_red(), message);
        return;
    }
    println!("Executable: {}", info.executable);
    println!(
        "Balance:    {:.4} SOL",
        info.lamports as f64 / 1_000_000_000.0
    );
    println!("Data:       {} bytes", info.data_size);
    println!("Owner:      {}", info.owner);
}

fn truncate_signature(signature: &str) -> &str {
    &signature[..signature.len().min(20)]
}
