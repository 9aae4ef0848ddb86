//! Shared fixtures for the E2E tests.
//!
//! Builds small but complete kubeconfig documents on disk. Every context
//! gets its own cluster and user so removal and conflict scenarios can be
//! expressed per-name.

use std::fs;
use std::path::{Path, PathBuf};

/// Render a kubeconfig with one cluster/user pair per context name.
///
/// `tokens` overrides the user token for specific context names, which is
/// how the restore tests manufacture credential conflicts.
pub fn kubeconfig_yaml(context_names: &[&str], tokens: &[(&str, &str)]) -> String {
    let token_for = |name: &str| -> String {
        tokens
            .iter()
            .find(|(n, _)| *n == name)
            .map_or_else(|| format!("{name}-token"), |(_, t)| (*t).to_string())
    };

    let mut yaml = String::from("apiVersion: v1\nkind: Config\n");
    yaml.push_str(&format!(
        "current-context: {}\n",
        context_names.first().copied().unwrap_or("")
    ));

    yaml.push_str("clusters:\n");
    for name in context_names {
        yaml.push_str(&format!(
            "- name: {name}-cluster\n  cluster:\n    server: https://{name}.example.com:6443\n"
        ));
    }

    yaml.push_str("contexts:\n");
    for name in context_names {
        yaml.push_str(&format!(
            "- name: {name}\n  context:\n    cluster: {name}-cluster\n    user: {name}-user\n"
        ));
    }

    yaml.push_str("users:\n");
    for name in context_names {
        yaml.push_str(&format!(
            "- name: {name}-user\n  user:\n    token: {}\n",
            token_for(name)
        ));
    }

    yaml
}

/// Write a kubeconfig fixture and return its path.
pub fn write_kubeconfig(dir: &Path, name: &str, context_names: &[&str]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, kubeconfig_yaml(context_names, &[])).unwrap();
    path
}

/// Write a whitelist config file and return its path.
pub fn write_whitelist(dir: &Path, patterns: &[&str]) -> PathBuf {
    let path = dir.join("ignore");
    fs::write(&path, patterns.join("\n")).unwrap();
    path
}

/// Names of contexts currently present in the kubeconfig at `path`.
pub fn context_names_in(path: &Path) -> Vec<String> {
    let content = fs::read_to_string(path).unwrap();
    let doc: serde_yaml::Value = serde_yaml::from_str(&content).unwrap();
    doc.get("contexts")
        .and_then(serde_yaml::Value::as_sequence)
        .map(|contexts| {
            contexts
                .iter()
                .filter_map(|c| c.get("name"))
                .filter_map(serde_yaml::Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Count files in `dir` whose name contains `fragment`.
pub fn files_containing(dir: &Path, fragment: &str) -> usize {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().contains(fragment))
        .count()
}
