//! Scripted network scenario
//!
//! Places a small cluster of crates, moves items in directly and through a
//! binding, runs the frame clock, removes the middle crate and prints what is
//! left. Records from earlier runs are loaded first when a save directory is
//! configured.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use serde_json::json;
use std::path::PathBuf;

use storage_core::{
    ItemId, ItemVariant, NodeId, NodeSummary, Position, StorageNode, TransferMode,
};
use storage_runtime::{DroppedItem, Host, RuntimeConfig};

/// A row of three crates with a fourth on top of the west end.
const LAYOUT: [Position; 4] = [
    Position::new(0, 0, 0),
    Position::new(1, 0, 0),
    Position::new(2, 0, 0),
    Position::new(0, 1, 0),
];

const TORCH: ItemId = ItemId(50);
const PICKAXE: ItemId = ItemId(257);
const POWER_CELL: ItemId = ItemId(300);
const ORE: ItemId = ItemId(15);

/// Run a scripted scenario and print node summaries
#[derive(Parser, Debug)]
pub struct Demo {
    /// Persist node records under this directory
    /// If not provided, uses STORAGE_SAVE_DIR or keeps records in memory
    #[arg(short, long, value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Frames to run after the transfers
    #[arg(long, default_value_t = RuntimeConfig::DEFAULT_MAINTENANCE_INTERVAL)]
    frames: u32,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum OutputFormat {
    /// Status popup text per node
    Text,
    /// Full JSON output
    Json,
}

struct Report {
    restored: usize,
    summaries: Vec<NodeSummary>,
    drops: Vec<DroppedItem>,
}

impl Demo {
    pub fn execute(self) -> Result<()> {
        let mut config = RuntimeConfig::from_env();
        if let Some(dir) = self.dir {
            config.save_dir = Some(dir);
        }

        let mut host = Host::builder()
            .config(config)
            .build()
            .context("Failed to build storage host")?;
        let report = run_scenario(&mut host, self.frames)?;

        match self.format {
            OutputFormat::Text => print_text(&report),
            OutputFormat::Json => print_json(&report)?,
        }

        Ok(())
    }
}

fn run_scenario(host: &mut Host, frames: u32) -> Result<Report> {
    let restored = host
        .load_saved()
        .context("Failed to load saved node records")?
        .len();

    let mut nodes = Vec::with_capacity(LAYOUT.len());
    for position in LAYOUT {
        let node = match host.node_at(position) {
            Some(node) => node,
            None => host.place(position)?,
        };
        nodes.push(node);
    }

    let torch = ItemVariant::single(TORCH);
    offer(host, nodes[0], &torch)?;
    offer(host, nodes[0], &ItemVariant::durability(PICKAXE, 120, 250))?;
    // The east crate holds no ore yet, so the stack opens its first bin.
    offer(host, nodes[2], &ItemVariant::plain_stack(ORE, 8))?;

    let binding = host.network_mut().bind(nodes[1])?;
    for item in [ItemVariant::charged(POWER_CELL, 80), torch.clone()] {
        let accepted = host
            .network_mut()
            .give_via(binding, &item, 1, TransferMode::Commit)?;
        tracing::info!(%item, accepted, "fed through binding");
    }

    host.advance(frames)?;

    host.remove(LAYOUT[1])?;
    if let Err(err) = host
        .network_mut()
        .give_via(binding, &torch, 1, TransferMode::DryRun)
    {
        tracing::info!(%err, "binding detached with its node");
    }
    host.advance(1)?;

    let ids: Vec<NodeId> = host.network().nodes().map(StorageNode::id).collect();
    let summaries = ids
        .into_iter()
        .map(|node| host.summary(node))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Report {
        restored,
        summaries,
        drops: host.drops_mut().take_all(),
    })
}

fn offer(host: &mut Host, node: NodeId, item: &ItemVariant) -> Result<()> {
    let amount = item.amount();
    if host.give(node, item, amount, TransferMode::DryRun)? {
        host.give(node, item, amount, TransferMode::Commit)?;
        tracing::info!(%node, %item, "stored");
    } else {
        tracing::info!(%node, %item, "rejected");
    }
    Ok(())
}

fn print_text(report: &Report) {
    println!("{}", style("=== Storage Network ===").bold().green());
    println!(
        "{} {}",
        style("Restored nodes:").bold().cyan(),
        report.restored
    );

    for summary in &report.summaries {
        println!();
        println!("{}", style(summary.node).bold().yellow());
        for line in summary.to_string().lines() {
            println!("  {line}");
        }
    }

    println!();
    println!("{}", style("Dropped items:").bold().yellow());
    if report.drops.is_empty() {
        println!("  (none)");
    }
    for drop in &report.drops {
        println!("  {} at {}", drop.item, drop.position);
    }
}

fn print_json(report: &Report) -> Result<()> {
    let drops: Vec<_> = report
        .drops
        .iter()
        .map(|drop| json!({ "item": drop.item, "position": drop.position }))
        .collect();
    let output = json!({
        "restored": report.restored,
        "nodes": report.summaries,
        "drops": drops,
    });

    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("Failed to serialize report")?
    );
    Ok(())
}
