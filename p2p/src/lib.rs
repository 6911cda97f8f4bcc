//! Channel-multiplexed peer-to-peer message bus.
//!
//! A [`Network`] hands out a [`Conduit`] per `(node, channel)` registration;
//! [`Hub`] is the in-process variant used to wire nodes together in tests
//! without a real transport.

mod channel;
mod error;
mod hub;
mod network;

pub use channel::{
    BROADCAST_CHANNEL, PROPOSALS_VOTING, PROPOSED_BLOCKS, VALIDATED_BLOCKS, VALIDATED_TRANSACTIONS,
};
pub use error::Error;
pub use hub::{Hub, HubNode};
pub use network::{Conduit, Engine, Network, NodeId};
