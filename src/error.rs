//! Error types for kubectx-manager.
//!
//! One crate-wide enum covering every failure the CLI can surface. Network
//! probe failures are deliberately absent: an unreachable cluster is an
//! expected outcome and collapses to `false` in the auth module, never to
//! an error.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors that abort the current command.
#[derive(Debug)]
pub enum Error {
    /// The whitelist ignore file could not be read or auto-created.
    /// An absent file is not an error (it triggers template creation).
    ConfigLoad { path: PathBuf, source: io::Error },

    /// A whitelist pattern failed to compile after glob substitution.
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    /// The kubeconfig file could not be read.
    KubeconfigRead { path: PathBuf, source: io::Error },

    /// The kubeconfig file is not deserializable YAML.
    KubeconfigParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// The kubeconfig document could not be serialized for writing.
    KubeconfigSerialize { source: serde_yaml::Error },

    /// The kubeconfig file could not be written.
    KubeconfigWrite { path: PathBuf, source: io::Error },

    /// A full or selective backup could not be created.
    Backup { path: PathBuf, source: io::Error },

    /// The backup directory could not be scanned.
    BackupScan { path: PathBuf, source: io::Error },

    /// Copying a backup over the live kubeconfig failed.
    Restore { path: PathBuf, source: io::Error },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigLoad { path, source } => {
                write!(f, "failed to load config file '{}': {source}", path.display())
            }
            Self::InvalidPattern { pattern, source } => {
                write!(f, "invalid pattern '{pattern}': {source}")
            }
            Self::KubeconfigRead { path, source } => {
                write!(
                    f,
                    "failed to read kubeconfig file '{}': {source}",
                    path.display()
                )
            }
            Self::KubeconfigParse { path, source } => {
                write!(f, "failed to parse kubeconfig '{}': {source}", path.display())
            }
            Self::KubeconfigSerialize { source } => {
                write!(f, "failed to serialize kubeconfig: {source}")
            }
            Self::KubeconfigWrite { path, source } => {
                write!(
                    f,
                    "failed to write kubeconfig '{}': {source}",
                    path.display()
                )
            }
            Self::Backup { path, source } => {
                write!(f, "failed to create backup '{}': {source}", path.display())
            }
            Self::BackupScan { path, source } => {
                write!(
                    f,
                    "failed to scan for backups in '{}': {source}",
                    path.display()
                )
            }
            Self::Restore { path, source } => {
                write!(
                    f,
                    "failed to restore kubeconfig '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ConfigLoad { source, .. }
            | Self::KubeconfigRead { source, .. }
            | Self::KubeconfigWrite { source, .. }
            | Self::Backup { source, .. }
            | Self::BackupScan { source, .. }
            | Self::Restore { source, .. } => Some(source),
            Self::InvalidPattern { source, .. } => Some(source),
            Self::KubeconfigParse { source, .. } | Self::KubeconfigSerialize { source } => {
                Some(source)
            }
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
