//! The signature scheme Σ: Ed25519 keypairs, public keys and signatures,
//! plus the phantom-typed [`SignatureOf`] wrapper used to sign canonical
//! encodings of entities.

use std::{cmp::Ordering, fmt, hash, marker::PhantomData};

use ed25519_dalek::{Signer as _, SigningKey, Verifier as _, VerifyingKey};
use parity_scale_codec::{Decode, Encode};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

/// Errors arising from key material or signature verification.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The supplied bytes are not a valid Ed25519 public/private key or signature.
    #[error("malformed key or signature material")]
    Malformed,
    /// Signature did not verify against the given public key and payload.
    #[error("signature verification failed")]
    BadSignature,
}

/// An Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Encode, Decode, Serialize, Deserialize)]
pub struct PublicKey(#[serde(with = "hex::serde")] [u8; 32]);

impl PublicKey {
    /// Verify `signature` over `payload` under this key.
    pub fn verify(&self, payload: &[u8], signature: &Signature) -> Result<(), Error> {
        let key = VerifyingKey::from_bytes(&self.0).map_err(|_| Error::Malformed)?;
        let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
        key.verify(payload, &sig).map_err(|_| Error::BadSignature)
    }

    /// Raw bytes of the public key.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.0))
    }
}

/// An Ed25519 private key. Never serialized; kept only for signing.
#[derive(Clone)]
pub struct PrivateKey(SigningKey);

/// A keypair: the unit a validator uses to sign and a peer uses to verify.
#[derive(Clone)]
pub struct KeyPair {
    public: PublicKey,
    private: PrivateKey,
}

impl KeyPair {
    /// Generate a fresh random keypair.
    #[must_use]
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        let public = PublicKey(signing_key.verifying_key().to_bytes());
        Self {
            public,
            private: PrivateKey(signing_key),
        }
    }

    /// The public half of this keypair.
    pub const fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Sign the canonical encoding of `value`, producing a [`SignatureOf<T>`].
    pub fn sign<T: Encode>(&self, value: &T) -> SignatureOf<T> {
        let payload = value.encode();
        let raw = self.private.0.sign(&payload);
        SignatureOf(Signature(raw.to_bytes()), self.public, PhantomData)
    }
}

/// A raw Ed25519 signature, without a payload-type tag.
#[derive(Clone, Copy, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct Signature(#[serde(with = "hex::serde")] [u8; 64]);

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", hex::encode(self.0))
    }
}

/// A signature known to have been produced over the canonical encoding of
/// some `T`, together with the signer's public key.
///
/// Certificates on a [`Block`](lightchain_data_model) proposal or on a
/// [`ValidatedTransaction`](lightchain_data_model) are collections of these.
#[derive(Clone, Copy, Encode, Decode, Serialize, Deserialize)]
pub struct SignatureOf<T>(Signature, PublicKey, PhantomData<T>);

impl<T> SignatureOf<T> {
    /// The account that produced this signature.
    pub const fn signer(&self) -> &PublicKey {
        &self.1
    }

    /// The raw signature bytes.
    pub const fn raw(&self) -> &Signature {
        &self.0
    }
}

impl<T: Encode> SignatureOf<T> {
    /// Verify this signature against the canonical encoding of `value`.
    pub fn verify(&self, value: &T) -> Result<(), Error> {
        self.1.verify(&value.encode(), &self.0)
    }
}

impl<T> PartialEq for SignatureOf<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 == other.1
    }
}
impl<T> Eq for SignatureOf<T> {}

impl<T> hash::Hash for SignatureOf<T> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.0.0.hash(state);
        self.1.hash(state);
    }
}

impl<T> PartialOrd for SignatureOf<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<T> Ord for SignatureOf<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.1 .0, self.0 .0).cmp(&(other.1 .0, other.0 .0))
    }
}

impl<T> fmt::Debug for SignatureOf<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureOf")
            .field("signer", &self.1)
            .field("signature", &self.0)
            .finish()
    }
}
