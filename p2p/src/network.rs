//! The [`Network`]/[`Conduit`] capability pair and the [`Engine`] callback
//! interface a conduit delivers into.

use std::{fmt, sync::Arc};

use lightchain_crypto::Hash;
use lightchain_data_model::Entity;
use lightchain_merkle::AuthenticatedEntity;

use crate::Error;

/// Identifies a node within the network. Equal by value, so two handles
/// built from the same label name the same node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(String);

impl NodeId {
    /// Build a node id from a label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Anything that can receive entities delivered by a [`Conduit`].
///
/// Kept minimal and independent of the ingest engine's own crate so that
/// `lightchain_p2p` never depends on `lightchain_core`: the engine is a
/// capability this crate consumes, not a concrete type it knows about.
pub trait Engine: Send + Sync {
    /// Handle one delivered entity.
    fn process(&self, entity: Entity);
}

/// Registers engines onto channels and hands back a [`Conduit`] for
/// communicating on that channel.
///
/// `register` is exclusive per `(node, channel)`: a second registration on
/// the same channel at the same node fails.
pub trait Network: Send + Sync {
    /// This network handle's own node id.
    fn id(&self) -> NodeId;

    /// Register `engine` to receive entities delivered on `channel`,
    /// returning a [`Conduit`] for sending on that same channel.
    fn register(&self, engine: Arc<dyn Engine>, channel: &str) -> Result<Conduit, Error>;
}

/// Per-channel send/receive handle returned by [`Network::register`].
///
/// `unicast` is synchronous-to-enqueue: it returns once the transport has
/// accepted the entity, not once the peer has processed it. `put`/`get`
/// operate on a network-wide authenticated DHT shared by every channel.
#[derive(Clone)]
pub struct Conduit {
    pub(crate) node_id: NodeId,
    pub(crate) channel: String,
    pub(crate) routes: crate::hub::Routes,
    pub(crate) dht: crate::hub::Dht,
}

impl Conduit {
    /// Send `entity` to `target` on this conduit's channel. Delivers
    /// exactly once if the send succeeds; fails if no engine is registered
    /// for `(target, channel)`.
    pub fn unicast(&self, entity: Entity, target: &NodeId) -> Result<(), Error> {
        self.routes.unicast(target, &self.channel, entity)
    }

    /// Store `entity` in the shared authenticated DHT, returning its
    /// current authenticated view. Idempotent for the same entity id.
    pub fn put(&self, entity: Entity) -> AuthenticatedEntity<Entity> {
        self.dht.put(entity)
    }

    /// Fetch the current authenticated view of the entity identified by
    /// `id`, or `None` if absent.
    #[must_use]
    pub fn get(&self, id: Hash) -> Option<AuthenticatedEntity<Entity>> {
        self.dht.get(id)
    }

    /// Snapshot of every entity currently stored in the DHT.
    #[must_use]
    pub fn all_entities(&self) -> Vec<Entity> {
        self.dht.all()
    }

    /// This conduit's owning node id.
    #[must_use]
    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    /// This conduit's channel.
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }
}
