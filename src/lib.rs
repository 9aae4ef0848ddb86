#![cfg_attr(not(test), forbid(unsafe_code))]
//! kubectx-manager library.
//!
//! Prunes Kubernetes contexts from a kubeconfig based on a whitelist of glob
//! patterns, with an optional live authentication check, and restores from
//! the timestamped backups it creates along the way.
//!
//! The two entry points are [`cleanup::run_cleanup`] and
//! [`restore::run_restore`]; everything else supports them:
//!
//! - [`config`] — whitelist loading and glob compilation
//! - [`kubeconfig`] — the kubeconfig document model and file I/O
//! - [`auth`] — credential presence and cluster reachability checks
//! - [`backups`] — discovery of existing backup files
//! - [`restore`] — conflict analysis and selective backups
//! - [`prompt`] — interactive confirmation prompts

pub mod auth;
pub mod backups;
pub mod cleanup;
pub mod cli;
pub mod config;
pub mod error;
pub mod kubeconfig;
pub mod logging;
pub mod prompt;
pub mod restore;

pub use cleanup::{CleanupOptions, run_cleanup};
pub use error::{Error, Result};
pub use restore::{RestoreOptions, run_restore};
