//! Delete saved node records
//!
//! Safety: prompts for confirmation before deletion unless `--yes` is given.

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use std::io::{self, Write};
use std::path::PathBuf;

use storage_runtime::{FileNodeRepository, NodeRepository};

use crate::dirs;

/// Delete saved node records
#[derive(Parser, Debug)]
pub struct Clean {
    /// Custom record directory (defaults to STORAGE_SAVE_DIR or the platform data directory)
    #[arg(short, long, value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Skip confirmation prompt (dangerous!)
    #[arg(short = 'y', long)]
    yes: bool,
}

impl Clean {
    pub fn execute(self) -> Result<()> {
        let dir = dirs::save_dir(self.dir);
        if !dir.exists() {
            println!("Nothing to clean in {}", dir.display());
            return Ok(());
        }

        let repo = FileNodeRepository::new(&dir)
            .with_context(|| format!("Failed to open record directory: {}", dir.display()))?;
        let positions = repo.list_positions()?;
        if positions.is_empty() {
            println!("Nothing to clean in {}", dir.display());
            return Ok(());
        }

        println!(
            "{} {} records in {}",
            style("About to delete").bold().yellow(),
            positions.len(),
            dir.display()
        );

        if !self.yes && !confirm()? {
            println!("Aborted.");
            return Ok(());
        }

        for position in &positions {
            repo.delete(*position)?;
        }

        println!(
            "{} Deleted {} records",
            style("✓").green().bold(),
            positions.len()
        );
        Ok(())
    }
}

fn confirm() -> Result<bool> {
    print!("Continue? [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
