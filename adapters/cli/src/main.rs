#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that resolves Starhold battles from fleet files.

mod report_transfer;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use starhold_battle::{simulate, BattleRules};
use starhold_core::{BattleReport, FleetInput, LocationId, PlayerId};

use crate::report_transfer::ReportTransfer;

/// Entry point for the Starhold command-line interface.
#[derive(Debug, Parser)]
#[command(name = "starhold", about = "Deterministic battle resolution for Starhold fleets")]
struct Cli {
    /// Operation to perform.
    #[command(subcommand)]
    command: CliCommand,
}

/// Operations exposed by the command-line interface.
#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Resolves a battle between two fleets described as JSON files and
    /// prints the persistence payload on stdout.
    Resolve {
        /// Path to the attacking fleet description.
        #[arg(long)]
        attacker: PathBuf,
        /// Path to the defending fleet description.
        #[arg(long)]
        defender: PathBuf,
        /// Round cap overriding the default of 50.
        #[arg(long)]
        max_rounds: Option<u32>,
    },
    /// Encodes a battle report JSON file into a single-line transfer string.
    Encode {
        /// Path to the battle report JSON file.
        report: PathBuf,
    },
    /// Decodes a transfer string back into battle report JSON.
    Decode {
        /// Transfer string produced by `encode`.
        transfer: String,
    },
}

/// Record shape handed to the external persistence collaborator once a
/// battle has been resolved.
#[derive(Debug, Serialize)]
struct PersistencePayload {
    /// Player that launched the attack.
    attacker_user_id: PlayerId,
    /// Player that defended against it.
    defender_user_id: PlayerId,
    /// Location the attacking fleet departed from.
    attacker_location_id: LocationId,
    /// Location the defending fleet guarded.
    defender_location_id: LocationId,
    /// The full battle report in its plain-record form.
    payload: BattleReport,
}

fn main() -> anyhow::Result<()> {
    match Cli::parse().command {
        CliCommand::Resolve {
            attacker,
            defender,
            max_rounds,
        } => resolve(&attacker, &defender, max_rounds),
        CliCommand::Encode { report } => encode(&report),
        CliCommand::Decode { transfer } => decode(&transfer),
    }
}

fn resolve(
    attacker_path: &Path,
    defender_path: &Path,
    max_rounds: Option<u32>,
) -> anyhow::Result<()> {
    let attacker = load_fleet(attacker_path)?;
    let defender = load_fleet(defender_path)?;
    let rules = max_rounds.map_or_else(BattleRules::default, BattleRules::new);

    let report = simulate(&attacker, &defender, rules);
    let payload = PersistencePayload {
        attacker_user_id: attacker.owner,
        defender_user_id: defender.owner,
        attacker_location_id: attacker.origin,
        defender_location_id: defender.origin,
        payload: report,
    };

    let rendered =
        serde_json::to_string_pretty(&payload).context("rendering the persistence payload")?;
    println!("{rendered}");
    Ok(())
}

fn encode(report_path: &Path) -> anyhow::Result<()> {
    let text = fs::read_to_string(report_path)
        .with_context(|| format!("reading report file {}", report_path.display()))?;
    let report: BattleReport = serde_json::from_str(&text)
        .with_context(|| format!("parsing report file {}", report_path.display()))?;

    println!("{}", ReportTransfer { report }.encode());
    Ok(())
}

fn decode(transfer: &str) -> anyhow::Result<()> {
    let decoded = ReportTransfer::decode(transfer).context("decoding the transfer string")?;
    let rendered =
        serde_json::to_string_pretty(&decoded.report).context("rendering the decoded report")?;
    println!("{rendered}");
    Ok(())
}

fn load_fleet(path: &Path) -> anyhow::Result<FleetInput> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading fleet file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing fleet file {}", path.display()))
}
