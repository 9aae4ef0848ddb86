//! Interactive prompts for the cleanup and restore flows.
//!
//! The engine code never reads stdin directly: it talks to a [`Prompter`],
//! and the production implementation wraps any `BufRead`. Tests feed a
//! `Cursor` with scripted responses and get identical blocking semantics.
//!
//! Input policy differs per prompt on purpose:
//! - backup selection re-prompts until the input is a valid number,
//! - confirmation treats anything but an explicit yes as decline,
//! - the conflict choice is one-shot: unrecognized input cancels outright
//!   (a safety-biased decision, never an assumed default action).
//!
//! A closed or errored input stream is always an implicit decline/cancel,
//! never a crash.

use std::io::{self, BufRead, Write};
use std::path::Path;

use colored::Colorize;

use crate::backups::Backup;
use crate::restore::Conflict;

/// Operator decision when a restore would overwrite conflicting entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictChoice {
    /// Proceed without any backup.
    NoBackup,
    /// Back up only the conflicting items.
    Selective,
    /// Back up the entire kubeconfig.
    Full,
    /// Abort the restore before anything is overwritten.
    Cancel,
}

/// Capability interface for the blocking interactive decisions.
pub trait Prompter {
    /// Present the backup list and return the chosen index, or `None` when
    /// the operator cancels (explicitly or by closing the input stream).
    fn select_backup(&mut self, backups: &[Backup]) -> Option<usize>;

    /// Ask for explicit confirmation before overwriting the kubeconfig.
    fn confirm_restore(&mut self, backup_name: &str, kubeconfig_path: &Path) -> bool;

    /// Ask for confirmation before removing contexts (interactive cleanup).
    fn confirm_removal(&mut self, count: usize) -> bool;

    /// Present conflicts and ask how much to back up before overwriting.
    fn conflict_choice(&mut self, conflicts: &[Conflict]) -> ConflictChoice;
}

/// Production prompter: writes menus to stdout, reads answers line by line.
#[derive(Debug)]
pub struct StdioPrompter<R> {
    reader: R,
}

impl StdioPrompter<io::BufReader<io::Stdin>> {
    /// Prompter over the process's standard input.
    pub fn stdin() -> Self {
        Self::new(io::BufReader::new(io::stdin()))
    }
}

impl<R: BufRead> StdioPrompter<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Read one line; `None` on EOF or read error.
    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }
}

impl<R: BufRead> Prompter for StdioPrompter<R> {
    fn select_backup(&mut self, backups: &[Backup]) -> Option<usize> {
        let max = backups.len();
        loop {
            print!("Select backup to restore (1-{max}, or 0 to cancel): ");
            let _ = io::stdout().flush();

            let input = self.read_line()?;
            let Ok(selection) = input.parse::<usize>() else {
                println!("Please enter a valid number");
                continue;
            };

            if selection == 0 {
                return None;
            }
            if selection > max {
                println!("Please enter a number between 1 and {max} (or 0 to cancel)");
                continue;
            }
            return Some(selection - 1);
        }
    }

    fn confirm_restore(&mut self, backup_name: &str, kubeconfig_path: &Path) -> bool {
        println!(
            "This will restore {} from backup {backup_name}.",
            kubeconfig_path.display()
        );
        print!("Are you sure you want to continue? (y/N): ");
        let _ = io::stdout().flush();

        match self.read_line() {
            Some(response) => {
                let response = response.to_lowercase();
                response == "y" || response == "yes"
            }
            None => false,
        }
    }

    fn confirm_removal(&mut self, count: usize) -> bool {
        print!("Are you sure you want to remove {count} context(s)? (y/N): ");
        let _ = io::stdout().flush();

        match self.read_line() {
            Some(response) => {
                let response = response.to_lowercase();
                response == "y" || response == "yes"
            }
            None => false,
        }
    }

    fn conflict_choice(&mut self, conflicts: &[Conflict]) -> ConflictChoice {
        println!(
            "{} Restoring this backup would overwrite {} existing items:",
            "Warning:".yellow().bold(),
            conflicts.len()
        );
        for conflict in conflicts {
            println!("  - {conflict}");
        }
        println!();
        println!("Backup options:");
        println!("  1. No backup - proceed anyway ({})", "n".cyan());
        println!("  2. Selective backup - backup only conflicting items ({})", "s".cyan());
        println!("  3. Full backup - backup entire kubeconfig ({})", "f".cyan());
        println!("  4. Cancel restore ({})", "c".cyan());
        print!("Choose (n/s/f/c): ");
        let _ = io::stdout().flush();

        let Some(response) = self.read_line() else {
            return ConflictChoice::Cancel;
        };

        match response.to_lowercase().as_str() {
            "n" | "no" => ConflictChoice::NoBackup,
            "s" | "selective" => ConflictChoice::Selective,
            "f" | "full" => ConflictChoice::Full,
            "c" | "cancel" => ConflictChoice::Cancel,
            other => {
                println!("Invalid choice '{other}', defaulting to cancel");
                ConflictChoice::Cancel
            }
        }
    }
}
