//! Network sub-configuration.

use serde::{Deserialize, Serialize};

/// This node's identity on the message bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfiguration {
    /// This node's id, used to register on the message bus and as the
    /// `unicast` target other nodes address it by.
    pub node_id: String,
}

impl Default for NetworkConfiguration {
    fn default() -> Self {
        Self {
            node_id: "node-1".to_owned(),
        }
    }
}
