//! Cryptographic primitives for LightChain: the hash function `H` (BLAKE2b-256)
//! behind [`Hash`]/[`HashOf`], and the signature scheme `Σ` (Ed25519) behind
//! [`PublicKey`]/[`KeyPair`]/[`SignatureOf`].
//!
//! Algorithm choice is fixed here so the rest of the workspace can treat `H`
//! and `Σ` as black boxes, per the core specification's scope.

mod hash;
mod signature;

pub use hash::{Hash, HashOf, ParseError};
pub use signature::{Error, KeyPair, PrivateKey, PublicKey, Signature, SignatureOf};
