//! Storage key derivation

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::RECORD_EXTENSION;

/// Deterministic, lossy identifier for a stored plan
///
/// Derived by lowercasing the project name and replacing spaces with
/// underscores. Characters that cannot appear in a file name are also
/// replaced with underscores, so a key always names a file directly inside
/// the store directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StorageKey(String);

impl StorageKey {
    /// Derive the key for a project name
    pub fn derive(project_name: &str) -> Self {
        let mut key: String = project_name
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| match c {
                ' ' | '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect();

        // Leading dots would hide the record or escape the directory
        if key.starts_with('.') {
            key = key.replacen('.', "_", 1);
        }
        if key.is_empty() {
            key.push('_');
        }
        Self(key)
    }

    /// Wrap a key read back from a record file name
    pub fn from_file_stem(stem: &str) -> Self {
        Self(stem.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Record file name for this key
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.0, RECORD_EXTENSION)
    }

    /// Human-friendly name: underscores become spaces, words title-cased
    pub fn display_name(&self) -> String {
        self.0
            .split('_')
            .filter(|w| !w.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
