//! Merge-aware restore engine.
//!
//! Restoring a backup is an unconditional full overwrite of the live
//! kubeconfig — never a field-by-field merge. All conflict handling happens
//! *before* the overwrite, by deciding whether and how much of the live
//! state to back up first:
//!
//! - if either document cannot be loaded for analysis, a full backup is
//!   forced (never skip the backup when analysis itself is impossible),
//! - if the documents share no diverging names, the backup is skipped,
//! - otherwise the operator picks: no backup, selective backup of the
//!   conflicting items, full backup, or cancel.
//!
//! Silent data loss must be impossible by construction: ambiguous input at
//! the conflict prompt cancels the restore, and the consumed backup is only
//! deleted after the overwrite has succeeded.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, info, warn};

use crate::backups::find_backups;
use crate::error::{Error, Result};
use crate::kubeconfig::{self, BACKUP_TIME_FORMAT, Kubeconfig};
use crate::prompt::{ConflictChoice, Prompter};

/// Options for one restore invocation.
#[derive(Debug, Clone)]
pub struct RestoreOptions {
    /// Path to the kubeconfig file to restore.
    pub kubeconfig: PathBuf,
    /// Skip creating a backup of the current kubeconfig before restoring.
    pub no_backup: bool,
    /// Keep the backup file after a successful restore instead of deleting it.
    pub keep_backup: bool,
}

/// A same-named entity present in both the live and backup documents with
/// differing content.
///
/// Conflicts carry their rendered description (`<kind> '<name>' (<reason>)`)
/// and are parsed back into kind + name by the selective-backup builder.
/// They are ephemeral: computed fresh per restore attempt, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    description: String,
}

/// The entity kind a conflict refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    Context,
    Cluster,
    User,
}

impl Conflict {
    /// A context present in both documents with a different
    /// cluster/user/namespace triple.
    pub fn context(name: &str) -> Self {
        Self {
            description: format!("context '{name}' (different configuration)"),
        }
    }

    /// A cluster present in both documents with different connection fields.
    pub fn cluster(name: &str) -> Self {
        Self {
            description: format!("cluster '{name}' (different server/auth)"),
        }
    }

    /// A user present in both documents with different credential fields.
    pub fn user(name: &str) -> Self {
        Self {
            description: format!("user '{name}' (different credentials)"),
        }
    }

    /// The entity kind, parsed from the description.
    pub fn kind(&self) -> Option<ConflictKind> {
        match self.description.split_whitespace().next()? {
            "context" => Some(ConflictKind::Context),
            "cluster" => Some(ConflictKind::Cluster),
            "user" => Some(ConflictKind::User),
            _ => None,
        }
    }

    /// The entity name, parsed from between the quotes in the description.
    pub fn name(&self) -> Option<&str> {
        let start = self.description.find('\'')? + 1;
        let end = start + self.description[start..].find('\'')?;
        Some(&self.description[start..end])
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// Outcome of the pre-restore backup decision procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupDecision {
    /// No backup needed.
    Skip { reason: &'static str },
    /// Back up the entire live kubeconfig.
    Full { reason: &'static str },
    /// Back up only the conflicting items and their references.
    Selective { conflicts: Vec<Conflict> },
    /// Abort the restore before any overwrite.
    Cancel,
}

/// Run the restore flow end to end.
///
/// Early exits (no backups found, cancellation at any prompt) are normal
/// successful outcomes, not errors.
pub fn run_restore(options: &RestoreOptions, prompter: &mut dyn Prompter) -> Result<()> {
    let kubeconfig_path = &options.kubeconfig;
    debug!("Starting kubeconfig restore...");
    debug!("Kubeconfig file: {}", kubeconfig_path.display());

    let backups = find_backups(kubeconfig_path)?;
    if backups.is_empty() {
        info!("No backups found for {}", kubeconfig_path.display());
        return Ok(());
    }

    info!("Available backups:");
    for (i, backup) in backups.iter().enumerate() {
        info!("  {}. {} ({})", i + 1, backup.name, backup.display_time());
    }

    let Some(index) = prompter.select_backup(&backups) else {
        info!("Restore canceled");
        return Ok(());
    };
    let selected = &backups[index];
    info!("Selected backup: {}", selected.name);

    if !prompter.confirm_restore(&selected.name, kubeconfig_path) {
        info!("Restore canceled");
        return Ok(());
    }

    if options.no_backup {
        info!("Skipping backup (--no-backup flag specified)");
    } else {
        match backup_decision(kubeconfig_path, &selected.path, prompter) {
            BackupDecision::Cancel => {
                info!("Restore canceled");
                return Ok(());
            }
            BackupDecision::Skip { reason } => {
                info!("Skipping backup: {reason}");
            }
            BackupDecision::Full { reason } => {
                debug!("Creating backup: {reason}");
                let backup_path = kubeconfig::create_backup(kubeconfig_path)?;
                info!(
                    "Created full backup of current kubeconfig: {}",
                    backup_path.display()
                );
            }
            BackupDecision::Selective { conflicts } => {
                let backup_path = create_selective_backup(kubeconfig_path, &conflicts)?;
                info!(
                    "Created selective backup of conflicting items: {}",
                    backup_path.display()
                );
            }
        }
    }

    restore_from_backup(&selected.path, kubeconfig_path)?;
    info!("Successfully restored kubeconfig from {}", selected.name);

    if options.keep_backup {
        info!("Backup file preserved: {}", selected.name);
    } else {
        debug!("Cleaning up backup file: {}", selected.path.display());
        match fs::remove_file(&selected.path) {
            Ok(()) => info!("Removed backup file: {}", selected.name),
            Err(err) => {
                // The restore itself already succeeded; deletion failure is
                // not fatal.
                warn!("Failed to remove backup file {}: {err}", selected.path.display());
                warn!("You may want to manually remove it");
            }
        }
    }

    Ok(())
}

/// Decide whether (and how much) to back up before overwriting.
///
/// A load failure on either side forces a full backup: the safety property
/// (never lose data) outranks completing quickly.
pub fn backup_decision(
    current_path: &Path,
    backup_path: &Path,
    prompter: &mut dyn Prompter,
) -> BackupDecision {
    let current = match Kubeconfig::load(current_path) {
        Ok(config) => config,
        Err(err) => {
            debug!("Could not load current kubeconfig: {err}");
            return BackupDecision::Full {
                reason: "could not load current kubeconfig for analysis",
            };
        }
    };

    let backup = match Kubeconfig::load(backup_path) {
        Ok(config) => config,
        Err(err) => {
            debug!("Could not load backup kubeconfig: {err}");
            return BackupDecision::Full {
                reason: "could not load backup kubeconfig for analysis",
            };
        }
    };

    let conflicts = analyze_restore_conflicts(&current, &backup);
    if conflicts.is_empty() {
        return BackupDecision::Skip {
            reason: "no conflicts detected - backup contexts can be safely merged",
        };
    }

    debug!("Found {} potential conflicts", conflicts.len());

    match prompter.conflict_choice(&conflicts) {
        ConflictChoice::NoBackup => BackupDecision::Skip {
            reason: "user chose to proceed without backup",
        },
        ConflictChoice::Selective => BackupDecision::Selective { conflicts },
        ConflictChoice::Full => BackupDecision::Full {
            reason: "user chose full backup",
        },
        ConflictChoice::Cancel => BackupDecision::Cancel,
    }
}

/// Compare the two documents and report every same-named entity whose
/// content diverges.
///
/// Entities present on only one side never conflict: a conflict requires a
/// name collision with field divergence. Comparison is flat field equality
/// per kind, in backup list order (contexts, then clusters, then users).
pub fn analyze_restore_conflicts(current: &Kubeconfig, backup: &Kubeconfig) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    for named in &backup.contexts {
        if let Some(existing) = current.context(&named.name) {
            if *existing != named.context {
                debug!("Context conflict: {}", named.name);
                conflicts.push(Conflict::context(&named.name));
            }
        }
    }

    for named in &backup.clusters {
        if let Some(existing) = current.cluster(&named.name) {
            if *existing != named.cluster {
                debug!("Cluster conflict: {}", named.name);
                conflicts.push(Conflict::cluster(&named.name));
            }
        }
    }

    for named in &backup.users {
        if let Some(existing) = current.user(&named.name) {
            if *existing != named.user {
                debug!("User conflict: {}", named.name);
                conflicts.push(Conflict::user(&named.name));
            }
        }
    }

    conflicts
}

/// Build the minimal document containing exactly the conflicting entities
/// plus the one-hop closure: a conflicting context pulls in its referenced
/// cluster and user even when those were not independently flagged.
pub fn build_selective_document(current: &Kubeconfig, conflicts: &[Conflict]) -> Kubeconfig {
    let mut context_names: HashSet<&str> = HashSet::new();
    let mut cluster_names: HashSet<String> = HashSet::new();
    let mut user_names: HashSet<String> = HashSet::new();

    for conflict in conflicts {
        let (Some(kind), Some(name)) = (conflict.kind(), conflict.name()) else {
            continue;
        };
        match kind {
            ConflictKind::Context => {
                context_names.insert(name);
                if let Some(context) = current.context(name) {
                    cluster_names.insert(context.cluster.clone());
                    user_names.insert(context.user.clone());
                }
            }
            ConflictKind::Cluster => {
                cluster_names.insert(name.to_string());
            }
            ConflictKind::User => {
                user_names.insert(name.to_string());
            }
        }
    }

    let mut selective = Kubeconfig {
        api_version: current.api_version.clone(),
        kind: current.kind.clone(),
        contexts: current
            .contexts
            .iter()
            .filter(|c| context_names.contains(c.name.as_str()))
            .cloned()
            .collect(),
        clusters: current
            .clusters
            .iter()
            .filter(|c| cluster_names.contains(&c.name))
            .cloned()
            .collect(),
        users: current
            .users
            .iter()
            .filter(|u| user_names.contains(&u.name))
            .cloned()
            .collect(),
        ..Kubeconfig::default()
    };
    selective.rebuild_index();
    selective
}

/// Persist a selective backup next to the kubeconfig.
///
/// The `.selective-backup.<timestamp>` suffix deliberately fails the backup
/// catalog's prefix match, so this file is never offered as a restore
/// candidate.
pub fn create_selective_backup(
    kubeconfig_path: &Path,
    conflicts: &[Conflict],
) -> Result<PathBuf> {
    let current = Kubeconfig::load(kubeconfig_path)?;
    let selective = build_selective_document(&current, conflicts);

    let timestamp = Local::now().format(BACKUP_TIME_FORMAT);
    let backup_path =
        kubeconfig::append_suffix(kubeconfig_path, &format!(".selective-backup.{timestamp}"));

    selective.save(&backup_path)?;
    debug!(
        "Created selective backup with {} contexts, {} clusters, {} users",
        selective.contexts.len(),
        selective.clusters.len(),
        selective.users.len()
    );

    Ok(backup_path)
}

/// Copy the backup's raw bytes over the live kubeconfig, owner-only mode.
pub fn restore_from_backup(backup_path: &Path, kubeconfig_path: &Path) -> Result<()> {
    let wrap = |source| Error::Restore {
        path: kubeconfig_path.to_path_buf(),
        source,
    };

    let data = fs::read(backup_path).map_err(wrap)?;
    fs::write(kubeconfig_path, data).map_err(wrap)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(kubeconfig_path, fs::Permissions::from_mode(0o600)).map_err(wrap)?;
    }

    Ok(())
}
