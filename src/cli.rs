//! CLI argument parsing.
//!
//! The default invocation (no subcommand) runs the cleanup flow; `restore`
//! runs the backup restore flow. Path flags default lazily so `--help`
//! never needs a home directory.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config;

/// Clean up Kubernetes contexts from your kubeconfig.
///
/// Removes contexts that are not whitelisted in the ignore file, optionally
/// keeping contexts whose cluster still answers an authentication probe. A
/// timestamped backup is written before any modification.
#[derive(Parser, Debug)]
#[command(name = "kubectx-manager")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run (omit to run cleanup)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Show what would be removed without making changes
    #[arg(long, short = 'd')]
    pub dry_run: bool,

    /// Probe cluster reachability before removing non-whitelisted contexts
    #[arg(long, short = 'a')]
    pub auth_check: bool,

    /// Ask for confirmation before removing contexts
    #[arg(long, short = 'i')]
    pub interactive: bool,

    /// Path to the whitelist config file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Path to the kubeconfig file
    #[arg(long, short = 'k', env = "KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    /// Enable verbose (debug) logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Restore the kubeconfig from a previously created backup
    #[command(name = "restore")]
    Restore(RestoreArgs),
}

/// Arguments for the restore subcommand.
#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// Path to the kubeconfig file
    #[arg(long, short = 'k', env = "KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    /// Skip backing up the current kubeconfig before restoring
    #[arg(long)]
    pub no_backup: bool,

    /// Keep the backup file after a successful restore
    #[arg(long)]
    pub keep_backup: bool,
}

impl Cli {
    /// Whitelist config path, defaulting to `~/.kubectx-manager_ignore`.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(config::default_config_path)
    }

    /// Kubeconfig path, defaulting to `~/.kube/config`.
    pub fn kubeconfig_path(&self) -> PathBuf {
        self.kubeconfig
            .clone()
            .unwrap_or_else(config::default_kubeconfig_path)
    }
}

impl RestoreArgs {
    /// Kubeconfig path, defaulting to `~/.kube/config`.
    pub fn kubeconfig_path(&self) -> PathBuf {
        self.kubeconfig
            .clone()
            .unwrap_or_else(config::default_kubeconfig_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_args_parses_to_cleanup_defaults() {
        let cli = Cli::try_parse_from(["kubectx-manager"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.dry_run);
        assert!(!cli.auth_check);
        assert!(!cli.interactive);
        assert!(!cli.verbose);
        assert!(!cli.quiet);
    }

    #[test]
    fn short_flags_parse() {
        let cli = Cli::try_parse_from(["kubectx-manager", "-d", "-a", "-i", "-v"]).unwrap();
        assert!(cli.dry_run);
        assert!(cli.auth_check);
        assert!(cli.interactive);
        assert!(cli.verbose);
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["kubectx-manager", "-v", "-q"]).is_err());
    }

    #[test]
    fn explicit_paths_override_defaults() {
        let cli = Cli::try_parse_from([
            "kubectx-manager",
            "--config",
            "/tmp/ignore",
            "--kubeconfig",
            "/tmp/kc",
        ])
        .unwrap();
        assert_eq!(cli.config_path(), PathBuf::from("/tmp/ignore"));
        assert_eq!(cli.kubeconfig_path(), PathBuf::from("/tmp/kc"));
    }

    #[test]
    fn restore_subcommand_parses_flags() {
        let cli = Cli::try_parse_from([
            "kubectx-manager",
            "restore",
            "--no-backup",
            "--keep-backup",
            "-k",
            "/tmp/kc",
        ])
        .unwrap();
        let Some(Command::Restore(args)) = cli.command else {
            panic!("expected restore subcommand");
        };
        assert!(args.no_backup);
        assert!(args.keep_backup);
        assert_eq!(args.kubeconfig_path(), PathBuf::from("/tmp/kc"));
    }

    #[test]
    fn global_verbose_works_after_subcommand() {
        let cli = Cli::try_parse_from(["kubectx-manager", "restore", "-v"]).unwrap();
        assert!(cli.verbose);
    }
}
