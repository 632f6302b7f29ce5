//! ika-dash: fetch and watch Ika network objects from the command line
//!
//! Reads dWallets, presigns, encrypted key shares and partial signatures
//! from a fullnode, waits for them to reach a lifecycle state, and lists
//! the dWallet capabilities an address owns.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ika_dash::batch::{BatchItem, BatchQuery, BatchSummary, looks_like_object_id, parse_ids};
use ika_dash::caps::list_dwallet_caps;
use ika_dash::client::{BatchSupport, IkaClient, check_kind};
use ika_dash::config::{FileConfig, validate_interval_ms};
use ika_dash::wait::{UNKNOWN_STATE, WatchConfig, WatchError};
use ika_dash::watcher::{WatchRequest, fetch_resource, watch_resource};
use ika_dash_common::{Network, ResourceKind, WatchStatus, format_ms, progress_percent};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Process exit codes; each watch outcome gets its own
mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const FATAL: i32 = 1;
    pub const TIMEOUT: i32 = 2;
    pub const CANCELLED: i32 = 130;
}

#[derive(Parser, Debug)]
#[command(name = "ika-dash")]
#[command(about = "Fetch and watch Ika network objects")]
#[command(version)]
struct Args {
    /// Network to query (mainnet, testnet, devnet)
    #[arg(long, global = true, env = "IKA_DASH_NETWORK")]
    network: Option<Network>,

    /// JSON-RPC endpoint (overrides the network's public fullnode)
    #[arg(long, global = true, env = "IKA_DASH_RPC_URL")]
    rpc_url: Option<String>,

    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Arguments for the watch command (extracted to reduce enum size)
#[derive(clap::Args, Debug)]
struct WatchArgs {
    /// Kind of object (dwallet, presign, encrypted-share, partial-signature)
    kind: ResourceKind,

    /// Object id
    id: String,

    /// State to wait for (default depends on the kind)
    #[arg(long)]
    expected_state: Option<String>,

    /// Time budget in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Delay between attempts in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch one object and print it
    Get {
        /// Kind of object
        kind: ResourceKind,

        /// Object id
        id: String,
    },

    /// Poll an object until it reaches a state
    Watch(Box<WatchArgs>),

    /// List the dWallet capabilities owned by an address
    Caps {
        /// Owner address
        owner: String,

        /// Coordinator package id; without it every owned object is scanned
        #[arg(long, env = "IKA_DASH_PACKAGE")]
        package: Option<String>,
    },

    /// Fetch many objects at once
    Batch {
        /// Kind of object
        #[arg(long, default_value = "dwallet")]
        kind: ResourceKind,

        /// Ids per request
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Send one request per id instead of batch requests
        #[arg(long)]
        per_item: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Object ids, separated by spaces or commas
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    match run().await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            print_error(&e);
            std::process::exit(exit_code::FATAL);
        }
    }
}

/// Print error in a user-friendly way
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();
    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }
}

async fn run() -> Result<i32> {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    let file = match &args.config {
        Some(path) => FileConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => FileConfig::default(),
    };

    let mut client_config = file.client_config(args.network);
    if let Some(url) = args.rpc_url {
        client_config.rpc_url = url;
    }
    if let Command::Batch {
        chunk_size,
        per_item,
        ..
    } = &args.command
    {
        if let Some(chunk_size) = chunk_size {
            client_config.chunk_size = *chunk_size;
        }
        if *per_item {
            client_config.batch_support = BatchSupport::PerItem;
        }
    }

    let client = IkaClient::new(client_config).context("Failed to create client")?;
    info!(
        network = %client.network(),
        ika_network = %client.network().ika_network(),
        rpc_url = %client.config().rpc_url,
        "Using network"
    );

    match args.command {
        Command::Get { kind, id } => handle_get(&client, kind, &id).await,
        Command::Watch(watch_args) => handle_watch(&client, &file, *watch_args).await,
        Command::Caps { owner, package } => {
            let package = package.or_else(|| file.dwallet_package.clone());
            handle_caps(&client, &owner, package.as_deref()).await
        }
        Command::Batch {
            kind, format, ids, ..
        } => handle_batch(&client, kind, &ids, format).await,
    }
}

/// Handle the get command
async fn handle_get(client: &IkaClient, kind: ResourceKind, id: &str) -> Result<i32> {
    let snapshot = fetch_resource(client, kind, id)
        .await
        .with_context(|| format!("Failed to fetch {} {id}", kind.display_name()))?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(exit_code::SUCCESS)
}

/// Handle the watch command
async fn handle_watch(client: &IkaClient, file: &FileConfig, args: WatchArgs) -> Result<i32> {
    let mut config = file.watch_config(WatchConfig::for_kind(args.kind));
    if let Some(ms) = args.timeout_ms {
        config.timeout = Duration::from_millis(ms);
    }
    if let Some(ms) = args.interval_ms {
        validate_interval_ms(ms)?;
        config.interval = Duration::from_millis(ms);
    }
    config.validate()?;

    let mut request = WatchRequest::new(args.kind, args.id).with_config(config);
    if let Some(state) = args.expected_state {
        request = request.with_expected_state(state);
    }

    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, cancelling watch");
                cancel.cancel();
            }
        })
    };

    println!(
        "Watching {} {} for state {} (timeout {}, interval {})",
        request.kind.display_name(),
        request.id,
        request.expected_state,
        format_ms(config.timeout.as_millis()),
        format_ms(config.interval.as_millis()),
    );

    let started = Instant::now();
    let timeout_ms = config.timeout.as_millis();
    let report = watch_resource(
        client,
        &request,
        file.retry_policy(),
        Some(cancel),
        |attempt| {
            let elapsed = started.elapsed().as_millis();
            println!(
                "  [{}] attempt {:>3}  state {:<32} {:>8}  {:>5.1}%",
                WatchStatus::Polling.label(&request.expected_state),
                attempt.number,
                attempt.state.as_deref().unwrap_or(UNKNOWN_STATE),
                format_ms(elapsed),
                progress_percent(elapsed, timeout_ms),
            );
        },
    )
    .await;
    interrupt.abort();

    let status = report.outcome.status();
    let elapsed = format_ms(report.elapsed.as_millis());
    let attempts = report.attempts;

    match report.outcome.into_result(&request.expected_state) {
        Ok(snapshot) => {
            println!(
                "\n\x1b[1;32m{}\x1b[0m after {attempts} attempts ({elapsed})",
                status.label(&request.expected_state)
            );
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            Ok(exit_code::SUCCESS)
        }
        Err(e @ WatchError::Timeout { .. }) => {
            println!("\n\x1b[1;33m{}:\x1b[0m {e}", status.label(&request.expected_state));
            println!("Gave up after {attempts} attempts ({elapsed}); try a longer --timeout-ms");
            Ok(exit_code::TIMEOUT)
        }
        Err(WatchError::Cancelled) => {
            println!(
                "\n\x1b[2m{}\x1b[0m after {attempts} attempts ({elapsed})",
                status.label(&request.expected_state)
            );
            Ok(exit_code::CANCELLED)
        }
        Err(WatchError::Fatal(e)) => {
            println!(
                "\n\x1b[1;31m{}:\x1b[0m {e}",
                status.label(&request.expected_state)
            );
            Ok(exit_code::FATAL)
        }
    }
}

/// Handle the caps command
async fn handle_caps(client: &IkaClient, owner: &str, package: Option<&str>) -> Result<i32> {
    if !looks_like_object_id(owner) {
        warn!(owner = %owner, "Owner does not look like an address");
    }
    if package.is_none() {
        info!("No coordinator package given, scanning all owned objects");
    }

    let caps = list_dwallet_caps(client, owner, package)
        .await
        .with_context(|| format!("Failed to list dWallet caps of {owner}"))?;
    info!(owner = %owner, count = caps.len(), "Fetched dWallet caps");
    println!("{}", serde_json::to_string_pretty(&caps)?);
    Ok(exit_code::SUCCESS)
}

/// Handle the batch command
async fn handle_batch(
    client: &IkaClient,
    kind: ResourceKind,
    raw_ids: &[String],
    format: OutputFormat,
) -> Result<i32> {
    let ids = parse_ids(&raw_ids.join(" "));
    for id in ids.iter().filter(|id| !looks_like_object_id(id)) {
        warn!(id = %id, "Id does not look like an object id");
    }

    let items: Vec<BatchItem> = BatchQuery::new(client)
        .with_chunk_size(client.config().chunk_size)
        .run(&ids)
        .await
        .into_iter()
        .map(|item| {
            let result = item
                .result
                .and_then(|snapshot| check_kind(kind, &item.id, &snapshot).map(|_| snapshot));
            BatchItem {
                id: item.id,
                result,
            }
        })
        .collect();
    let summary = BatchSummary::from_items(&items);

    match format {
        OutputFormat::Json => {
            let json_items: Vec<_> = items.iter().map(BatchItem::to_json).collect();
            println!("{}", serde_json::to_string_pretty(&json_items)?);
        }
        OutputFormat::Table => {
            println!("{:<24} {:<6} {:<40}", "ID", "OK", "STATE / ERROR");
            println!("{}", "-".repeat(72));
            for item in &items {
                let detail = match &item.result {
                    Ok(snapshot) => ika_dash_common::extract_state(snapshot)
                        .unwrap_or_else(|| UNKNOWN_STATE.to_string()),
                    Err(e) => e.message().to_string(),
                };
                println!(
                    "{:<24} {:<6} {:<40}",
                    shorten(&item.id, 24),
                    if item.is_ok() { "yes" } else { "no" },
                    detail,
                );
            }
            println!(
                "\nTotal: {} ({} ok, {} failed)",
                summary.total, summary.ok, summary.failed
            );
        }
    }

    Ok(if summary.failed == 0 {
        exit_code::SUCCESS
    } else {
        exit_code::FATAL
    })
}

fn shorten(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let head: String = s.chars().take(width - 3).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}
