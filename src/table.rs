//! Network table files
//!
//! A table is a JSON array of `{"network": "<cidr>", "value": <any>}`
//! entries, stored by default in ~/.config/shrubnet/networks.json. Entries
//! are applied in file order, so a later duplicate network wins.

use crate::parse::parse_network;
use crate::trie::NetTree;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// One network and the value attached to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableEntry {
    /// Network in CIDR notation
    pub network: String,
    /// Arbitrary JSON value returned on a match
    pub value: Value,
}

/// A list of networks persisted as JSON
#[derive(Debug)]
pub struct NetworkTable {
    path: PathBuf,
    entries: Vec<TableEntry>,
}

impl NetworkTable {
    /// Default table location (~/.config/shrubnet/networks.json)
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not find config directory".into()))?
            .join("shrubnet");
        Ok(config_dir.join("networks.json"))
    }

    /// Create a new empty table file, failing if one already exists
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if path.exists() {
            return Err(Error::Config(format!(
                "Table already exists at {}",
                path.display()
            )));
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create table dir: {}", e)))?;
        }

        let table = NetworkTable {
            path,
            entries: Vec::new(),
        };
        table.save()?;
        Ok(table)
    }

    /// Load a table, validating every network in it
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path)?;
        let entries: Vec<TableEntry> = serde_json::from_str(&content)?;

        for entry in &entries {
            parse_network(&entry.network)?;
        }
        debug!(path = %path.display(), count = entries.len(), "loaded network table");

        Ok(NetworkTable { path, entries })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries in file order
    pub fn entries(&self) -> &[TableEntry] {
        &self.entries
    }

    /// Append an entry after validating its network
    pub fn add(&mut self, cidr: &str, value: Value) -> Result<()> {
        let network = parse_network(cidr)?;
        self.entries.push(TableEntry {
            network: network.to_string(),
            value,
        });
        Ok(())
    }

    /// Write the table back to its file.
    ///
    /// The content goes to a temporary file in the same directory which is
    /// then renamed over the table, so readers see the old or the new table,
    /// never a partial one.
    pub fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.entries)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(content.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Build a lookup tree from the entries
    pub fn to_tree(&self) -> Result<NetTree<Value>> {
        self.entries
            .iter()
            .map(|entry| -> Result<_> {
                Ok((parse_network(&entry.network)?, entry.value.clone()))
            })
            .collect()
    }
}
