//! List saved node records

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::path::PathBuf;

use storage_core::codec;
use storage_runtime::{FileNodeRepository, NodeRepository};

use crate::dirs;

/// List saved node records
#[derive(Parser, Debug)]
pub struct List {
    /// Custom record directory (defaults to STORAGE_SAVE_DIR or the platform data directory)
    #[arg(short, long, value_name = "DIR")]
    dir: Option<PathBuf>,
}

impl List {
    pub fn execute(self) -> Result<()> {
        let dir = dirs::save_dir(self.dir);
        if !dir.exists() {
            println!("No records in {}", dir.display());
            return Ok(());
        }

        let repo = FileNodeRepository::new(&dir)
            .with_context(|| format!("Failed to open record directory: {}", dir.display()))?;
        let positions = repo.list_positions()?;

        println!(
            "{} {}",
            style("Record Directory:").bold().cyan(),
            dir.display()
        );
        println!();

        for position in &positions {
            let Some(bytes) = repo.load(*position)? else {
                continue;
            };
            match codec::decode(&bytes) {
                Ok(items) => println!(
                    "  {}  {} bins, {} bytes",
                    style(position).bold(),
                    items.len(),
                    bytes.len()
                ),
                Err(err) => println!(
                    "  {}  {} {}",
                    style(position).bold(),
                    style("unreadable:").red(),
                    err
                ),
            }
        }

        println!();
        println!("{} {}", style("Total:").bold().yellow(), positions.len());
        Ok(())
    }
}
