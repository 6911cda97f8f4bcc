//! Storage sub-configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where a node keeps its persistent stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfiguration {
    /// Root directory under which the blocks, transaction-id, pending and
    /// seen-entity logs are created.
    pub data_dir: PathBuf,
}

impl Default for StorageConfiguration {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
        }
    }
}
