//! Whitelist configuration for kubectx-manager.
//!
//! The ignore file lists glob patterns for contexts to *keep*. One pattern
//! per line; `#` comments and blank lines are skipped. Patterns support `*`
//! (any run of characters) and `?` (exactly one character), matched
//! case-sensitively against the whole context name.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::{Error, Result};

/// Default ignore file name, resolved under the user's home directory.
pub const DEFAULT_CONFIG_NAME: &str = ".kubectx-manager_ignore";

/// Template written when the ignore file does not exist yet.
const DEFAULT_CONFIG_TEMPLATE: &str = "\
# kubectx-manager ignore file (contexts to keep)
# List context patterns to keep (whitelist)
# Supports glob patterns: * (any characters) and ? (single character)
# Examples:
# production-*
# staging-cluster
# *-important
# my-dev-context

# Add your patterns below (one per line):
";

/// Compiled whitelist loaded from the ignore file.
#[derive(Debug)]
pub struct Whitelist {
    patterns: Vec<String>,
    compiled: Vec<Regex>,
}

impl Whitelist {
    /// Load the ignore file, creating it from the template if absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            create_default_config(path)?;
        }

        let contents = fs::read_to_string(path).map_err(|source| Error::ConfigLoad {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_lines(contents.lines())
    }

    /// Build a whitelist from pre-split pattern lines.
    ///
    /// Comment and blank lines are skipped here as well so callers can feed
    /// raw file content.
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let mut patterns = Vec::new();
        let mut compiled = Vec::new();

        for line in lines {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            compiled.push(compile_pattern(line)?);
            patterns.push(line.to_string());
        }

        Ok(Self { patterns, compiled })
    }

    /// Check whether a context name matches any whitelist pattern.
    ///
    /// An empty whitelist matches nothing.
    pub fn matches(&self, context_name: &str) -> bool {
        self.compiled.iter().any(|re| re.is_match(context_name))
    }

    /// The raw patterns, in file order.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

/// Convert a glob-like pattern into an anchored regex.
///
/// All regex metacharacters are escaped first, then the two glob wildcards
/// are reinterpreted: `*` becomes `.*` and `?` becomes `.`. The result is
/// anchored so the pattern must match the entire context name.
fn compile_pattern(pattern: &str) -> Result<Regex> {
    let escaped = regex::escape(pattern)
        .replace(r"\*", ".*")
        .replace(r"\?", ".");

    let anchored = format!("^{escaped}$");
    Regex::new(&anchored).map_err(|source| Error::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Write the commented template to `path`, creating parent directories.
fn create_default_config(path: &Path) -> Result<()> {
    let wrap = |source| Error::ConfigLoad {
        path: path.to_path_buf(),
        source,
    };

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(wrap)?;
    }
    fs::write(path, DEFAULT_CONFIG_TEMPLATE).map_err(wrap)
}

/// Default ignore file path: `~/.kubectx-manager_ignore`.
pub fn default_config_path() -> PathBuf {
    home_dir().join(DEFAULT_CONFIG_NAME)
}

/// Default kubeconfig path: `~/.kube/config`.
pub fn default_kubeconfig_path() -> PathBuf {
    home_dir().join(".kube").join("config")
}

fn home_dir() -> PathBuf {
    dirs::home_dir()
        .or_else(|| std::env::var_os("HOME").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("/tmp"))
}
