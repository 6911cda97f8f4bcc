//! [`Hash`] and the phantom-typed [`HashOf`] identifier wrapper.

use std::{fmt, hash, marker::PhantomData, str::FromStr};

use blake2::{digest::consts::U32, Blake2b, Digest};
use derive_more::{DebugCustom, Display};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

type Blake2b256 = Blake2b<U32>;

/// Parse error for hex-encoded hashes.
#[derive(Debug, thiserror::Error)]
#[error("failed to parse hash: {0}")]
pub struct ParseError(String);

/// An opaque 32-byte digest, value-equal and totally ordered.
///
/// The chain's hash function: BLAKE2b truncated to 32 bytes.
#[derive(
    DebugCustom, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode,
)]
#[debug(fmt = "{}", "hex::encode(_0)")]
#[display(fmt = "{}", "hex::encode(_0)")]
pub struct Hash(pub [u8; Self::LENGTH]);

impl Hash {
    /// Length of the digest in bytes.
    pub const LENGTH: usize = 32;

    /// All-zero hash, used as the "previous block" link of the genesis block.
    pub const fn zeroed() -> Self {
        Self([0_u8; Self::LENGTH])
    }

    /// Hash an arbitrary byte string.
    #[must_use]
    pub fn new(bytes: impl AsRef<[u8]>) -> Self {
        let mut hasher = Blake2b256::new();
        hasher.update(bytes.as_ref());
        let digest = hasher.finalize();
        let mut out = [0_u8; Self::LENGTH];
        out.copy_from_slice(&digest);
        Self(out)
    }

    /// Attach a type tag, turning this into a [`HashOf<T>`].
    pub const fn typed<T>(self) -> HashOf<T> {
        HashOf(self, PhantomData)
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Hash> for [u8; Hash::LENGTH] {
    fn from(hash: Hash) -> Self {
        hash.0
    }
}

impl From<[u8; Hash::LENGTH]> for Hash {
    fn from(bytes: [u8; Hash::LENGTH]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Hash {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| ParseError(e.to_string()))?;
        let bytes: [u8; Self::LENGTH] = bytes
            .try_into()
            .map_err(|_| ParseError(format!("expected {} bytes", Self::LENGTH)))?;
        Ok(Self(bytes))
    }
}

impl Serialize for Hash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        hex::encode(self.0).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A [`Hash`] tagged at the type level with the kind of entity it identifies.
///
/// Two identifiers of different entity kinds are distinct types even if the
/// underlying bytes coincide, so a block id cannot be passed where a
/// transaction id is expected.
pub struct HashOf<T>(Hash, PhantomData<T>);

impl<T> Encode for HashOf<T> {
    fn size_hint(&self) -> usize {
        self.0.size_hint()
    }

    fn encode_to<O: parity_scale_codec::Output + ?Sized>(&self, dest: &mut O) {
        self.0.encode_to(dest);
    }
}

impl<T> Decode for HashOf<T> {
    fn decode<I: parity_scale_codec::Input>(input: &mut I) -> Result<Self, parity_scale_codec::Error> {
        Hash::decode(input).map(|hash| Self(hash, PhantomData))
    }
}

impl<T> HashOf<T> {
    /// Wrap a pre-computed digest. Prefer [`HashOf::new`] where possible.
    pub const fn from_hash(hash: Hash) -> Self {
        Self(hash, PhantomData)
    }

    /// Erase the type tag.
    pub const fn untyped(self) -> Hash {
        self.0
    }
}

impl<T: Encode> HashOf<T> {
    /// Compute the identifier of `value` as `H(canonical_encode(value))`.
    #[must_use]
    pub fn new(value: &T) -> Self {
        Self(Hash::new(value.encode()), PhantomData)
    }
}

impl<T> Clone for HashOf<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for HashOf<T> {}

impl<T> PartialEq for HashOf<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl<T> Eq for HashOf<T> {}

impl<T> PartialOrd for HashOf<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl<T> Ord for HashOf<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl<T> hash::Hash for HashOf<T> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T> fmt::Debug for HashOf<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl<T> fmt::Display for HashOf<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<T> Serialize for HashOf<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for HashOf<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Hash::deserialize(deserializer).map(|hash| Self(hash, PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_bytes_same_hash() {
        assert_eq!(Hash::new(b"abc"), Hash::new(b"abc"));
        assert_ne!(Hash::new(b"abc"), Hash::new(b"abd"));
    }

    #[test]
    fn display_roundtrips_through_from_str() {
        let hash = Hash::new(b"lightchain");
        let text = hash.to_string();
        assert_eq!(hash, text.parse().unwrap());
    }

    #[test]
    fn typed_hash_compares_by_value() {
        struct Block;
        struct Transaction;
        let h = Hash::new(b"entity");
        let a: HashOf<Block> = h.typed();
        let b: HashOf<Transaction> = h.typed();
        // Same bytes, different phantom type: still equal to the plain hash.
        assert_eq!(a.untyped(), b.untyped());
    }
}
