//! Result rendering for the terminal

use std::path::Path;

use colored::Colorize;
use treesync_core::Reconciliation;

use crate::error::Result;

pub fn print_json(result: &Reconciliation) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

pub fn print_human(variant: &str, target: &Path, check: bool, result: &Reconciliation) {
    let mode = if check { " (check)" } else { "" };
    println!(
        "{} {} {}{}",
        "=>".blue().bold(),
        variant,
        target.display().to_string().yellow(),
        mode.cyan()
    );

    if result.failed {
        println!("{} Reconciliation failed:", "ERROR".red().bold());
    } else if result.changed {
        println!("{} Target updated:", "OK".green().bold());
    } else {
        println!("{} Already converged. No changes needed.", "OK".green().bold());
    }

    let last = result.messages.len().saturating_sub(1);
    for (i, msg) in result.messages.iter().enumerate() {
        if result.failed && i == last {
            println!("   {} {}", "!".red(), msg);
        } else {
            println!("   {} {}", "+".green(), msg);
        }
    }

    if !result.diff.is_empty() {
        println!();
        for record in &result.diff {
            print_unified(&record.unified());
        }
    }
}

fn print_unified(text: &str) {
    for line in text.lines() {
        if line.starts_with("+++") || line.starts_with("---") {
            println!("{}", line.bold());
        } else if line.starts_with('+') {
            println!("{}", line.green());
        } else if line.starts_with('-') {
            println!("{}", line.red());
        } else if line.starts_with("@@") {
            println!("{}", line.cyan());
        } else {
            println!("{}", line);
        }
    }
}
