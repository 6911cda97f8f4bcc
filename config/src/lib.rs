//! Layered configuration for a LightChain node: one sub-struct per
//! component, each with `Default` impls holding the protocol's defaults, a
//! JSON file layer, and environment-variable overrides on top.

mod error;
mod ingest;
mod network;
pub mod protocol;
mod storage;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use error::Error;
pub use ingest::IngestConfiguration;
pub use network::NetworkConfiguration;
pub use storage::StorageConfiguration;

/// The aggregate configuration for a node: one field per component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Configuration {
    /// Persistent storage paths.
    pub storage: StorageConfiguration,
    /// Message-bus identity.
    pub network: NetworkConfiguration,
    /// Certificate-verification thresholds.
    pub ingest: IngestConfiguration,
}

impl Configuration {
    /// Load configuration from a JSON file, falling back to defaults for
    /// any field the file omits (`#[serde(default)]` on every sub-struct).
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| Error::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment-variable overrides on top of whatever was loaded
    /// from file. Each variable is optional; an unset variable leaves the
    /// existing value untouched.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(data_dir) = std::env::var("LIGHTCHAIN_STORAGE_DATA_DIR") {
            self.storage.data_dir = data_dir.into();
        }
        if let Ok(node_id) = std::env::var("LIGHTCHAIN_NETWORK_NODE_ID") {
            self.network.node_id = node_id;
        }
        if let Ok(threshold) = std::env::var("LIGHTCHAIN_INGEST_VALIDATOR_THRESHOLD") {
            if let Ok(parsed) = threshold.parse() {
                self.ingest.validator_threshold = parsed;
            } else {
                tracing::warn!(value = %threshold, "ignoring malformed LIGHTCHAIN_INGEST_VALIDATOR_THRESHOLD");
            }
        }
        self
    }
}
