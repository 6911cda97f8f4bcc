//! Networking failures.

use crate::NodeId;

/// Failures surfaced by [`crate::Network::register`] and [`crate::Conduit`]
/// operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A second registration landed on a `(node, channel)` pair that
    /// already has an engine. Exclusive per (local node, channel).
    #[error("engine already registered on node {node} channel {channel}")]
    ChannelAlreadyRegistered {
        /// The node the registration was attempted on.
        node: NodeId,
        /// The channel that was already occupied.
        channel: String,
    },
    /// `unicast` targeted a node with no engine registered on the sender's
    /// channel.
    #[error("no engine registered for node {node} on channel {channel}")]
    UnknownPeer {
        /// The node that was addressed.
        node: NodeId,
        /// The channel the send was attempted on.
        channel: String,
    },
}
