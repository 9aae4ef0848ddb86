//! Kubeconfig document model and on-disk store.
//!
//! Mirrors the conventional four-section kubeconfig schema (contexts,
//! clusters, users, current-context) with name-indexed lookup maps derived
//! from the authoritative lists. The lists are the source of truth: every
//! structural mutation ends with [`Kubeconfig::rebuild_index`] so the maps
//! never drift out of sync.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Timestamp format used for backup file name suffixes (fixed width,
/// lexicographically sortable).
pub const BACKUP_TIME_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Owner-only read/write: kubeconfig files carry credential material.
#[cfg(unix)]
const KUBECONFIG_FILE_MODE: u32 = 0o600;

/// Top-level kubeconfig document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Kubeconfig {
    #[serde(rename = "apiVersion", default)]
    pub api_version: String,

    #[serde(default)]
    pub kind: String,

    /// Name of the active context; empty when unset.
    #[serde(default)]
    pub current_context: String,

    /// Opaque preferences block, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<serde_yaml::Value>,

    #[serde(default)]
    pub contexts: Vec<NamedContext>,

    #[serde(default)]
    pub clusters: Vec<NamedCluster>,

    #[serde(default)]
    pub users: Vec<NamedUser>,

    #[serde(skip)]
    pub(crate) context_index: HashMap<String, usize>,

    #[serde(skip)]
    pub(crate) cluster_index: HashMap<String, usize>,

    #[serde(skip)]
    pub(crate) user_index: HashMap<String, usize>,
}

/// A context entry with its name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamedContext {
    pub name: String,
    pub context: Context,
}

/// A (cluster, user, namespace) triple selecting how to connect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Context {
    pub cluster: String,
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// A cluster entry with its name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamedCluster {
    pub name: String,
    pub cluster: Cluster,
}

/// Cluster connection configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Cluster {
    #[serde(default)]
    pub server: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_authority_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_authority: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub insecure_skip_tls_verify: bool,
}

/// A user entry with its name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamedUser {
    pub name: String,
    pub user: User,
}

/// User authentication configuration. The credential fields are mutually
/// non-exclusive; "has credentials" is a derived predicate (see the auth
/// module), not a stored flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_certificate_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_key_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_certificate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_provider: Option<AuthProvider>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec: Option<ExecConfig>,
}

/// Authentication provider descriptor (OIDC, cloud providers, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthProvider {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "std::collections::BTreeMap::is_empty")]
    pub config: std::collections::BTreeMap<String, String>,
}

/// Exec-based credential plugin descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecConfig {
    #[serde(rename = "apiVersion", default)]
    pub api_version: String,
    #[serde(default)]
    pub command: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<ExecEnvVar>,
}

/// Environment variable passed to an exec credential plugin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecEnvVar {
    pub name: String,
    pub value: String,
}

impl Kubeconfig {
    /// Read and parse a kubeconfig file, then build the lookup index.
    ///
    /// A missing file is reported as a read error; callers that want an
    /// empty document must create one themselves.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|source| Error::KubeconfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config: Self =
            serde_yaml::from_str(&data).map_err(|source| Error::KubeconfigParse {
                path: path.to_path_buf(),
                source,
            })?;

        config.rebuild_index();
        Ok(config)
    }

    /// Serialize and write the document with owner-only permissions.
    pub fn save(&self, path: &Path) -> Result<()> {
        let data =
            serde_yaml::to_string(self).map_err(|source| Error::KubeconfigSerialize { source })?;

        let wrap = |source| Error::KubeconfigWrite {
            path: path.to_path_buf(),
            source,
        };

        fs::write(path, data).map_err(wrap)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(KUBECONFIG_FILE_MODE))
                .map_err(wrap)?;
        }

        Ok(())
    }

    /// Rebuild the three name→position maps from the backing lists.
    ///
    /// Must be called after any structural mutation and before any lookup.
    pub fn rebuild_index(&mut self) {
        self.context_index = self
            .contexts
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();
        self.cluster_index = self
            .clusters
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();
        self.user_index = self
            .users
            .iter()
            .enumerate()
            .map(|(i, u)| (u.name.clone(), i))
            .collect();
    }

    /// Context names in document list order.
    pub fn context_names(&self) -> Vec<String> {
        self.contexts.iter().map(|c| c.name.clone()).collect()
    }

    /// Look up a context by name.
    pub fn context(&self, name: &str) -> Option<&Context> {
        self.context_index
            .get(name)
            .map(|&i| &self.contexts[i].context)
    }

    /// Look up a cluster by name.
    pub fn cluster(&self, name: &str) -> Option<&Cluster> {
        self.cluster_index
            .get(name)
            .map(|&i| &self.clusters[i].cluster)
    }

    /// Look up a user by name.
    pub fn user(&self, name: &str) -> Option<&User> {
        self.user_index.get(name).map(|&i| &self.users[i].user)
    }

    /// Remove the named contexts and garbage-collect orphaned clusters and
    /// users no longer referenced by any remaining context.
    ///
    /// If the current context was removed it is cleared, then reset to the
    /// first remaining context (in list order) when one exists. Never fails;
    /// removing names that do not exist is a no-op for those names.
    pub fn remove_contexts(&mut self, names: &HashSet<String>) {
        let mut remaining = Vec::with_capacity(self.contexts.len());
        for named in self.contexts.drain(..) {
            if names.contains(&named.name) {
                if self.current_context == named.name {
                    self.current_context.clear();
                }
            } else {
                remaining.push(named);
            }
        }
        self.contexts = remaining;

        let used_clusters: HashSet<&str> = self
            .contexts
            .iter()
            .map(|c| c.context.cluster.as_str())
            .collect();
        let used_users: HashSet<&str> =
            self.contexts.iter().map(|c| c.context.user.as_str()).collect();

        self.clusters
            .retain(|c| used_clusters.contains(c.name.as_str()));
        self.users.retain(|u| used_users.contains(u.name.as_str()));

        if self.current_context.is_empty() {
            if let Some(first) = self.contexts.first() {
                self.current_context = first.name.clone();
            }
        }

        self.rebuild_index();
    }
}

/// Copy the file byte-for-byte to `<path>.backup.<timestamp>`.
///
/// Returns the backup path. The copy is raw so a restore reproduces the
/// original file exactly, including formatting and comments.
pub fn create_backup(path: &Path) -> Result<PathBuf> {
    let timestamp = Local::now().format(BACKUP_TIME_FORMAT);
    let backup_path = append_suffix(path, &format!(".backup.{timestamp}"));

    fs::copy(path, &backup_path).map_err(|source| Error::Backup {
        path: backup_path.clone(),
        source,
    })?;

    Ok(backup_path)
}

/// Append a suffix to a path's final component.
pub(crate) fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
    name.push_str(suffix);
    path.with_file_name(name)
}
