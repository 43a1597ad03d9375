use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use cn_chain::ChainReader;
use cn_core::{Block, RawBlock, Transaction};
use cn_seria::{from_bytes_counted, DecodeLimits};

#[derive(Parser, Debug)]
#[command(name = "cn-cli", about = "Inspect and verify exported chain files")]
struct Cli {
    /// Largest single decode-side allocation, in bytes
    #[arg(long, default_value_t = cn_seria::decoder::DEFAULT_MAX_ALLOCATION)]
    max_allocation: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Summarise a blocks.bin / blockindexes.bin pair
    Inspect {
        /// Directory holding the exported pair
        data_dir: PathBuf,

        /// Emit the summary as JSON instead of text
        #[arg(long)]
        json: bool,

        /// Stop after this many records
        #[arg(long)]
        limit: Option<u64>,
    },

    /// Decode every record, block and transaction, verifying wire shape
    Check {
        /// Directory holding the exported pair
        data_dir: PathBuf,

        /// Stop after this many records
        #[arg(long)]
        limit: Option<u64>,
    },
}

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
struct ChainStats {
    records: u64,
    tip_height: Option<u64>,
    record_bytes: u64,
    largest_record_bytes: u64,
    transaction_blobs: u64,
    transaction_bytes: u64,
}

impl ChainStats {
    fn accumulate(&mut self, height: u64, raw: &RawBlock) {
        let record_bytes =
            raw.block.len() + raw.transactions.iter().map(Vec::len).sum::<usize>();
        self.records += 1;
        self.tip_height = Some(height);
        self.record_bytes += record_bytes as u64;
        self.largest_record_bytes = self.largest_record_bytes.max(record_bytes as u64);
        self.transaction_blobs += raw.transactions.len() as u64;
        self.transaction_bytes += raw.transactions.iter().map(Vec::len).sum::<usize>() as u64;
    }
}

/// One record that failed verification.
#[derive(Debug, Serialize, PartialEq, Eq)]
struct CheckFailure {
    height: u64,
    detail: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let limits = DecodeLimits {
        max_allocation: cli.max_allocation,
        ..DecodeLimits::default()
    };

    match cli.command {
        Commands::Inspect {
            data_dir,
            json,
            limit,
        } => {
            let mut reader = ChainReader::open(&data_dir, limits)
                .with_context(|| format!("opening chain files in {}", data_dir.display()))?;
            let stats = gather_stats(&mut reader, limit)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                render_stats(&stats);
            }
        }
        Commands::Check { data_dir, limit } => {
            let mut reader = ChainReader::open(&data_dir, limits)
                .with_context(|| format!("opening chain files in {}", data_dir.display()))?;
            let (checked, failures) = run_check(&mut reader, limit)?;
            info!(checked, failures = failures.len(), "check finished");
            if !failures.is_empty() {
                for failure in &failures {
                    eprintln!("height {}: {}", failure.height, failure.detail);
                }
                anyhow::bail!("{} of {} records failed verification", failures.len(), checked);
            }
            println!("{checked} records verified");
        }
    }
    Ok(())
}

fn gather_stats(reader: &mut ChainReader, limit: Option<u64>) -> Result<ChainStats> {
    let mut stats = ChainStats::default();
    for result in reader.iter().take(clamp_limit(limit)) {
        let (height, raw) = result?;
        stats.accumulate(height, &raw);
    }
    Ok(stats)
}

fn run_check(
    reader: &mut ChainReader,
    limit: Option<u64>,
) -> Result<(u64, Vec<CheckFailure>)> {
    let limits = DecodeLimits::default();
    let mut checked = 0u64;
    let mut failures = Vec::new();
    for result in reader.iter().take(clamp_limit(limit)) {
        let (height, raw) = match result {
            Ok(pair) => pair,
            Err(err) => {
                failures.push(CheckFailure {
                    height: checked,
                    detail: err.to_string(),
                });
                checked += 1;
                continue;
            }
        };
        if let Err(detail) = verify_record(&raw, &limits) {
            failures.push(CheckFailure { height, detail });
        }
        checked += 1;
    }
    Ok((checked, failures))
}

/// Re-decode the block and every transaction blob of one record, holding
/// them to the exact-length invariant.
fn verify_record(raw: &RawBlock, limits: &DecodeLimits) -> Result<(), String> {
    let (_, consumed) = from_bytes_counted::<Block>(&raw.block, limits)
        .map_err(|err| format!("block: {err}"))?;
    if consumed != raw.block.len() {
        return Err(format!(
            "block: {} trailing bytes",
            raw.block.len() - consumed
        ));
    }
    for (index, blob) in raw.transactions.iter().enumerate() {
        let (_, consumed) = from_bytes_counted::<Transaction>(blob, limits)
            .map_err(|err| format!("transaction {index}: {err}"))?;
        if consumed != blob.len() {
            return Err(format!(
                "transaction {index}: {} trailing bytes",
                blob.len() - consumed
            ));
        }
    }
    Ok(())
}

fn clamp_limit(limit: Option<u64>) -> usize {
    limit.map_or(usize::MAX, |value| value as usize)
}

fn render_stats(stats: &ChainStats) {
    println!("Records          : {}", stats.records);
    match stats.tip_height {
        Some(tip) => println!("Height range     : 0..={tip}"),
        None => println!("Height range     : <empty>"),
    }
    println!("Record bytes     : {}", stats.record_bytes);
    println!("Largest record   : {}", stats.largest_record_bytes);
    println!("Transaction blobs: {}", stats.transaction_blobs);
    println!("Transaction bytes: {}", stats.transaction_bytes);
}
