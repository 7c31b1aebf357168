// Copyright (c) 2026 Vaultchain Contributors. MIT License.
// See LICENSE for details.

//! # Vaultchain — Content-Addressed Chain Store
//!
//! The persistence and addressing core of a blockchain node. Vaultchain
//! stores immutable blocks in an embedded key-value store, addresses them
//! by cryptographic digest, links them into a backward-traversable chain,
//! and records anchoring metadata tying chain heights to transactions on
//! an external ledger.
//!
//! The crate deliberately stops at the storage boundary: consensus, wire
//! transport, and the signing primitive live elsewhere. What you get here
//! is the part everyone else depends on being *exactly* right — byte-level
//! digest semantics, canonical serialization, and chain traversal that
//! terminates where it should.
//!
//! ## Architecture
//!
//! - **crypto** — Digest type, hash derivations, and the fixed-size
//!   signature carrier. Pure transforms over immutable bytes.
//! - **storage** — The block-chain overlay over a generic key-value
//!   backend, the block capability trait, and anchor records.
//! - **config** — Every fixed width and well-known key name, in one place.
//!
//! ## Design Rules
//!
//! 1. Absence is `Ok(None)`, never an error. "Not found" and "failed"
//!    are different facts and callers get to tell them apart.
//! 2. One canonical binary form per record. Marshal then unmarshal is
//!    byte-identical, always — digests are derived from these bytes.
//! 3. The head pointer is written last. A crash can lose the newest
//!    block, but it can never point the head at missing indices.

pub mod config;
pub mod crypto;
pub mod storage;
