//! # Store Configuration & Constants
//!
//! Every fixed width and well-known key name in Vaultchain lives here.
//! These values are part of the on-disk format: changing a bucket name or
//! a digest width after data has been written orphans that data, so treat
//! edits to this file as format migrations, not refactors.

// ---------------------------------------------------------------------------
// Fixed Widths
// ---------------------------------------------------------------------------

/// Digest width in bytes. SHA-256 output size; the half-SHA-512 derivation
/// is truncated to the same width so every identifier in the store is
/// interchangeable at the type level.
pub const DIGEST_LENGTH: usize = 32;

/// Digest width in hex characters. Exactly `2 * DIGEST_LENGTH` — a digest
/// string of any other length is a decode error, never truncated or padded.
pub const DIGEST_HEX_LENGTH: usize = 2 * DIGEST_LENGTH;

/// Ed25519 signature length. Always 64 bytes.
pub const SIGNATURE_LENGTH: usize = 64;

// ---------------------------------------------------------------------------
// Bucket Names
// ---------------------------------------------------------------------------

/// Blocks indexed by their key Merkle root — the canonical chain-link key.
pub const BUCKET_BLOCKS_BY_ROOT: &str = "blocks-by-root";

/// The same blocks indexed by their self digest (content hash).
pub const BUCKET_BLOCKS_BY_DIGEST: &str = "blocks-by-digest";

/// Chain metadata: the head pointer and nothing else, currently.
pub const BUCKET_CHAIN_META: &str = "chain-meta";

/// Anchor records keyed by big-endian block height.
pub const BUCKET_ANCHORS: &str = "anchors";

/// Well-known key in [`BUCKET_CHAIN_META`] holding the key Merkle root of
/// the most recently saved block.
pub const KEY_CHAIN_HEAD: &[u8] = b"chain-head";
