//! `Hub`: the in-process network variant used in integration tests.
//!
//! Holds a single shared registry `(NodeId, channel) -> engine` and a
//! single shared authenticated DHT across every node sharing the `Hub`.
//! `unicast` performs a direct call into the target's `process` on the
//! caller's thread rather than going through any real transport.

use std::sync::Arc;

use dashmap::{mapref::entry::Entry, DashMap};
use lightchain_crypto::Hash;
use lightchain_data_model::Entity;
use lightchain_merkle::{AuthenticatedEntity, MerkleSet};

use crate::{Conduit, Engine, Error, Network, NodeId};

type Registry = DashMap<(NodeId, String), Arc<dyn Engine>>;

#[derive(Clone)]
pub(crate) struct Routes(Arc<Registry>);

impl Routes {
    pub(crate) fn unicast(&self, target: &NodeId, channel: &str, entity: Entity) -> Result<(), Error> {
        let key = (target.clone(), channel.to_owned());
        match self.0.get(&key) {
            Some(engine) => {
                engine.process(entity);
                Ok(())
            }
            None => Err(Error::UnknownPeer {
                node: target.clone(),
                channel: channel.to_owned(),
            }),
        }
    }
}

#[derive(Clone)]
pub(crate) struct Dht(Arc<MerkleSet<Entity>>);

impl Dht {
    pub(crate) fn put(&self, entity: Entity) -> AuthenticatedEntity<Entity> {
        self.0.put(entity)
    }

    pub(crate) fn get(&self, id: Hash) -> Option<AuthenticatedEntity<Entity>> {
        self.0.get(id)
    }

    pub(crate) fn all(&self) -> Vec<Entity> {
        self.0.all()
    }
}

/// Shared state backing every [`HubNode`] handle drawn from the same `Hub`.
#[derive(Clone, Default)]
pub struct Hub {
    registry: Arc<Registry>,
    dht: Arc<MerkleSet<Entity>>,
}

impl Hub {
    /// An empty hub with no registrations and an empty DHT.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Obtain a [`Network`] handle for `node_id`, backed by this hub's
    /// shared registry and DHT.
    #[must_use]
    pub fn node(&self, node_id: NodeId) -> HubNode {
        HubNode {
            node_id,
            routes: Routes(Arc::clone(&self.registry)),
            dht: Dht(Arc::clone(&self.dht)),
        }
    }
}

/// One node's [`Network`] view onto a shared [`Hub`].
pub struct HubNode {
    node_id: NodeId,
    routes: Routes,
    dht: Dht,
}

impl Network for HubNode {
    fn id(&self) -> NodeId {
        self.node_id.clone()
    }

    fn register(&self, engine: Arc<dyn Engine>, channel: &str) -> Result<Conduit, Error> {
        let key = (self.node_id.clone(), channel.to_owned());
        match self.routes.0.entry(key) {
            Entry::Occupied(_) => {
                tracing::error!(node = %self.node_id, channel, "duplicate channel registration");
                Err(Error::ChannelAlreadyRegistered {
                    node: self.node_id.clone(),
                    channel: channel.to_owned(),
                })
            }
            Entry::Vacant(slot) => {
                slot.insert(engine);
                Ok(Conduit {
                    node_id: self.node_id.clone(),
                    channel: channel.to_owned(),
                    routes: self.routes.clone(),
                    dht: self.dht.clone(),
                })
            }
        }
    }
}
