//! # Cryptographic Primitives
//!
//! Digest derivation, the fixed-width digest type, and the signature
//! carrier. Everything here is a pure transform over immutable bytes —
//! no I/O, no shared state, no surprises.
//!
//! The asymmetric primitive itself (key generation, signing, verification)
//! is an external collaborator reached through the [`signature`] traits;
//! the ed25519-dalek implementations in that module are the default, not
//! the contract.

pub mod digest;
pub mod hash;
pub mod signature;

pub use digest::{DecodeError, Digest};
pub use hash::{double_sha256, sha256, sha512_half};
pub use signature::{
    Ed25519Signer, Ed25519Verifier, MessageSigner, MessageVerifier, SignatureError,
    SignatureHandle,
};
