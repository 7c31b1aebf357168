//! # Storage Module
//!
//! The chain store proper: a generic key-value seam, the block capability,
//! the overlay that indexes blocks and tracks the head, and per-height
//! anchor records.
//!
//! ## Architecture
//!
//! ```text
//! backend.rs — KvStore trait; MemoryStore and SledStore implementations
//! block.rs   — ChainBlock capability, concrete Block, Merkle root
//! overlay.rs — ChainOverlay: dual-index save, head tracking, traversal
//! anchor.rs  — AnchorInfo records keyed by height
//! ```
//!
//! ## Data Flow
//!
//! ```text
//! Block ──save_block_head──▶ blocks-by-root ─┐
//!                            blocks-by-digest ├─ KvStore
//!                            chain-meta(head) ┘
//!          fetch_head ▶ walk prev_key_mr ▶ … ▶ zero sentinel
//! ```
//!
//! Blocks are immutable once written; the head pointer is the only cell
//! that ever changes, and it is always written last.

pub mod anchor;
pub mod backend;
pub mod block;
pub mod overlay;

pub use anchor::AnchorInfo;
pub use backend::{KvStore, MemoryStore, SledStore};
pub use block::{merkle_root, Block, ChainBlock, CodecError};
pub use overlay::{ChainIter, ChainOverlay, StoreError};
