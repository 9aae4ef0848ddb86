//! Cleanup orchestration: decide which contexts go, then remove them.
//!
//! The keep/remove policy is two ordered gates: a whitelist match always
//! keeps a context (no network traffic spent on it), and the optional auth
//! check can rescue a non-whitelisted context whose cluster still answers.
//! With the auth check off, every non-whitelisted context is removed.

use std::collections::HashSet;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::auth::AuthValidator;
use crate::config::Whitelist;
use crate::error::Result;
use crate::kubeconfig::{self, Kubeconfig};
use crate::prompt::Prompter;

/// Options for one cleanup invocation.
#[derive(Debug, Clone)]
pub struct CleanupOptions {
    /// Path to the whitelist config file.
    pub config: PathBuf,
    /// Path to the kubeconfig file to clean.
    pub kubeconfig: PathBuf,
    /// Report what would be removed without writing anything.
    pub dry_run: bool,
    /// Probe cluster reachability before removing non-whitelisted contexts.
    pub auth_check: bool,
    /// Ask for confirmation before removing.
    pub interactive: bool,
}

/// Compute the contexts to remove, in kubeconfig declaration order.
pub fn find_contexts_to_remove(
    config: &Kubeconfig,
    whitelist: &Whitelist,
    auth_check: bool,
    validator: &dyn AuthValidator,
) -> Vec<String> {
    let mut to_remove = Vec::new();

    for name in config.context_names() {
        if whitelist.matches(&name) {
            debug!("Context '{name}' is whitelisted, keeping");
            continue;
        }

        if auth_check {
            debug!("Checking authentication for context '{name}'");
            if validator.is_auth_valid(config, &name) {
                info!("Context '{name}' has valid authentication, keeping");
                continue;
            }
            info!("Context '{name}' has invalid or expired authentication");
        }

        to_remove.push(name);
    }

    to_remove
}

/// Run the cleanup flow end to end.
///
/// The backup is written before the removal set is computed, so a cleanup
/// that ends up removing nothing still leaves a backup behind. Dry-run
/// writes neither backup nor kubeconfig.
pub fn run_cleanup(options: &CleanupOptions, prompter: &mut dyn Prompter) -> Result<()> {
    debug!("Starting kubectx-manager...");
    debug!("Config file: {}", options.config.display());
    debug!("Kubeconfig file: {}", options.kubeconfig.display());

    let whitelist = Whitelist::load(&options.config)?;
    debug!("Loaded {} whitelist patterns", whitelist.patterns().len());

    let mut config = Kubeconfig::load(&options.kubeconfig)?;
    debug!("Found {} contexts in kubeconfig", config.contexts.len());

    if !options.dry_run {
        let backup_path = kubeconfig::create_backup(&options.kubeconfig)?;
        info!("Created backup: {}", backup_path.display());
    }

    let to_remove = find_contexts_to_remove(
        &config,
        &whitelist,
        options.auth_check,
        &crate::auth::NetworkProber,
    );

    if to_remove.is_empty() {
        info!("No contexts to remove");
        return Ok(());
    }

    info!("Contexts to remove:");
    for name in &to_remove {
        info!("  - {name}");
    }

    if options.dry_run {
        info!("Dry-run mode: no changes made");
        return Ok(());
    }

    if options.interactive && !prompter.confirm_removal(to_remove.len()) {
        info!("Cleanup canceled");
        return Ok(());
    }

    let names: HashSet<String> = to_remove.iter().cloned().collect();
    config.remove_contexts(&names);
    config.save(&options.kubeconfig)?;

    info!("Removed {} context(s)", to_remove.len());
    Ok(())
}
