//! Read and inspect node records from the persistence layer
//!
//! Decodes `node_{x}_{y}_{z}.bin` records and displays their bins.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::path::PathBuf;

use storage_core::{ItemVariant, Position, codec};
use storage_runtime::{FileNodeRepository, NodeRepository};

use crate::dirs;

/// Decode and inspect one saved node record
#[derive(Parser, Debug)]
pub struct Inspect {
    /// Cell of the node (x y z)
    #[arg(value_name = "X", allow_negative_numbers = true)]
    x: i32,

    #[arg(value_name = "Y", allow_negative_numbers = true)]
    y: i32,

    #[arg(value_name = "Z", allow_negative_numbers = true)]
    z: i32,

    /// Custom record directory (defaults to STORAGE_SAVE_DIR or the platform data directory)
    #[arg(short, long, value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum OutputFormat {
    /// One line per bin
    Summary,
    /// Full JSON output
    Json,
    /// Pretty-printed debug format
    Debug,
}

impl Inspect {
    pub fn execute(self) -> Result<()> {
        let dir = dirs::save_dir(self.dir);
        let position = Position::new(self.x, self.y, self.z);

        let repo = FileNodeRepository::new(&dir)
            .with_context(|| format!("Failed to open record directory: {}", dir.display()))?;
        let Some(bytes) = repo.load(position)? else {
            anyhow::bail!(
                "No record for cell {position}\n\nHint: run `storage-cli list --dir {}`",
                dir.display()
            );
        };

        let items = codec::decode(&bytes)
            .with_context(|| format!("Failed to decode record for cell {position}"))?;

        println!("{} {}", style("Cell:").bold().cyan(), position);
        println!("{} {} bytes", style("Record Size:").bold().cyan(), bytes.len());
        if let Some(version) = record_version(&bytes) {
            println!("{} {}", style("Format Version:").bold().cyan(), version);
        }
        println!();

        match self.format {
            OutputFormat::Summary => print_summary(&items),
            OutputFormat::Json => print_json(&items)?,
            OutputFormat::Debug => println!("{items:#?}"),
        }

        Ok(())
    }
}

fn record_version(bytes: &[u8]) -> Option<i32> {
    let header: [u8; 4] = bytes.get(..4)?.try_into().ok()?;
    Some(i32::from_le_bytes(header))
}

fn print_summary(items: &[ItemVariant]) {
    println!("{}", style("=== Bins ===").bold().green());
    if items.is_empty() {
        println!("  (empty)");
    }
    let total: u64 = items.iter().map(|item| u64::from(item.amount())).sum();
    for (index, item) in items.iter().enumerate() {
        println!("  [{index}] {item}");
    }
    println!();
    println!("{} {}", style("Items:").bold().yellow(), total);
}

fn print_json(items: &[ItemVariant]) -> Result<()> {
    let json = serde_json::to_string_pretty(items).context("Failed to serialize bins to JSON")?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_comes_from_the_little_endian_header() {
        assert_eq!(record_version(&[4, 0, 0, 0, 0, 0, 0, 0]), Some(4));
        assert_eq!(record_version(&[4, 0]), None);
    }
}
