//! # Block Capability & Concrete Block
//!
//! The overlay stores anything that behaves like a chain block: it has a
//! self digest, a key Merkle root, a parent pointer, a height, and one
//! canonical binary form. That behavior is the [`ChainBlock`] trait; the
//! concrete [`Block`] here is the minimal record that exercises it.
//!
//! ## Two identifiers, on purpose
//!
//! A block's **key Merkle root** is its chain-link key — SHA-256 over the
//! header fields and the body Merkle root. Its **self digest** is the
//! half-SHA-512 of the full canonical marshal. Different functions over
//! different inputs, so the two index keyspaces can never collide by
//! construction, and a corrupted cross-index shows up as a byte mismatch
//! instead of a silent aliasing bug.
//!
//! ## Canonical form
//!
//! `marshal_binary` is bincode over fixed field order. Marshal then
//! unmarshal reproduces a byte-identical block, and two semantically equal
//! blocks marshal identically — digests are derived from these bytes, so
//! this is a consensus property, not a convenience.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::Digest;

/// Marshal/unmarshal failures for stored records.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("encode failed: {0}")]
    Encode(String),

    #[error("decode failed: {0}")]
    Decode(String),
}

/// The capability the overlay requires of anything it stores as a block.
///
/// Linkage validity (parent pointers, height arithmetic) is the caller's
/// responsibility — the store trusts what it is given.
pub trait ChainBlock: Sized {
    /// Content hash of the block's own canonical marshaled form.
    fn digest(&self) -> Digest;

    /// The canonical chain-link key, distinct from the self digest.
    fn key_mr(&self) -> Digest;

    /// Key Merkle root of the parent block; the zero sentinel for a
    /// chain's first block.
    fn prev_key_mr(&self) -> Digest;

    /// Block height, genesis = 0.
    fn height(&self) -> u32;

    /// The canonical binary form.
    fn marshal_binary(&self) -> Result<Vec<u8>, CodecError>;

    /// Inverse of [`marshal_binary`](Self::marshal_binary); byte-identical
    /// round trip.
    fn unmarshal_binary(data: &[u8]) -> Result<Self, CodecError>;
}

// ---------------------------------------------------------------------------
// Merkle root
// ---------------------------------------------------------------------------

/// Binary Merkle root over a list of entry digests, SHA-256 pairwise.
///
/// Empty input yields the zero sentinel. An odd node at any level is
/// paired with itself. Order-sensitive, as a Merkle tree must be.
pub fn merkle_root(leaves: &[Digest]) -> Digest {
    if leaves.is_empty() {
        return Digest::zero();
    }

    let mut level: Vec<Digest> = leaves.to_vec();
    loop {
        let mut next = Vec::with_capacity((level.len() + 1) / 2);
        for chunk in level.chunks(2) {
            let left = &chunk[0];
            let right = chunk.get(1).unwrap_or(left);
            let mut combined = [0u8; 64];
            combined[..32].copy_from_slice(left.as_bytes());
            combined[32..].copy_from_slice(right.as_bytes());
            next.push(Digest::sha(&combined));
        }
        if next.len() == 1 {
            return next[0];
        }
        level = next;
    }
}

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

/// The minimal immutable block record.
///
/// Carries exactly what chain linkage and anchoring need: the height, the
/// parent's key Merkle root, a timestamp, and a body of entry digests.
/// Both identifiers are derived on demand from content — nothing stored
/// in the record can drift from the bytes that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block height, genesis = 0.
    pub height: u32,
    /// Key Merkle root of the previous block; zero sentinel at genesis.
    pub prev_key_mr: Digest,
    /// Unix timestamp (seconds) the block was assembled.
    pub timestamp: u64,
    /// Entry digests making up the block body. Minute markers live in
    /// this space alongside ordinary entry hashes.
    pub entries: Vec<Digest>,
}

impl Block {
    /// Construct a chain-first block: height 0, zero parent pointer.
    pub fn genesis(timestamp: u64, entries: Vec<Digest>) -> Self {
        Block {
            height: 0,
            prev_key_mr: Digest::zero(),
            timestamp,
            entries,
        }
    }

    /// Construct the next block after `parent`, maintaining the linkage
    /// invariant: `height = parent.height + 1`, `prev_key_mr =
    /// parent.key_mr()`.
    pub fn new(parent: &Block, timestamp: u64, entries: Vec<Digest>) -> Self {
        Block {
            height: parent.height + 1,
            prev_key_mr: parent.key_mr(),
            timestamp,
            entries,
        }
    }

    /// Merkle root of the block body; zero for an empty body.
    pub fn body_mr(&self) -> Digest {
        merkle_root(&self.entries)
    }

    /// Fixed-order header bytes the key Merkle root is derived from.
    fn header_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(4 + 32 + 8 + 32);
        buf.extend_from_slice(&self.height.to_be_bytes());
        buf.extend_from_slice(self.prev_key_mr.as_bytes());
        buf.extend_from_slice(&self.timestamp.to_be_bytes());
        buf.extend_from_slice(self.body_mr().as_bytes());
        buf
    }
}

impl ChainBlock for Block {
    fn digest(&self) -> Digest {
        // Serialization of this struct is infallible in practice; an
        // impossible failure hashes the empty payload rather than
        // panicking inside a digest derivation.
        Digest::sha512_half(&bincode::serialize(self).unwrap_or_default())
    }

    fn key_mr(&self) -> Digest {
        Digest::sha(&self.header_bytes())
    }

    fn prev_key_mr(&self) -> Digest {
        self.prev_key_mr
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn marshal_binary(&self) -> Result<Vec<u8>, CodecError> {
        bincode::serialize(self).map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn unmarshal_binary(data: &[u8]) -> Result<Self, CodecError> {
        bincode::deserialize(data).map_err(|e| CodecError::Decode(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
