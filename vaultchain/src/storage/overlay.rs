//! # Chain Overlay
//!
//! [`ChainOverlay`] wraps an injected [`KvStore`] and turns it into a
//! content-addressed chain store. Every saved block is registered under
//! two index keys — its key Merkle root and its self digest — and a
//! distinguished head pointer tracks the most recently saved block.
//!
//! ## Write ordering
//!
//! `save_block_head` writes the two indices first and the head pointer
//! last. The backend only guarantees per-key atomicity, so a crash mid-save
//! can leave a block indexed but not headed — which the next save repairs —
//! but it can never advance the head to a block whose indices aren't
//! durable yet.
//!
//! ## Traversal
//!
//! The chain walks backward: head, then each block's `prev_key_mr`, until
//! the zero sentinel. Reaching the sentinel is normal termination. A
//! non-zero pointer that resolves to no stored block is
//! [`StoreError::BrokenChain`] — chain corruption, fatal to that walk.
//!
//! ## Concurrency
//!
//! `save_block_head` mutates the shared head pointer and must be
//! serialized by the caller (one writer per overlay). Reads may interleave
//! freely; a read racing a write observes either the pre- or post-write
//! head, and since blocks are immutable either view is a fully consistent,
//! possibly older, chain.

use std::marker::PhantomData;
use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing::{debug, trace};

use super::anchor::AnchorInfo;
use super::backend::KvStore;
use super::block::{ChainBlock, CodecError};
use crate::config::{
    BUCKET_ANCHORS, BUCKET_BLOCKS_BY_DIGEST, BUCKET_BLOCKS_BY_ROOT, BUCKET_CHAIN_META,
    KEY_CHAIN_HEAD,
};
use crate::crypto::{DecodeError, Digest};

/// Errors surfaced by the overlay and its backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend I/O failure. Not retried at this layer.
    #[error("backend error: {0}")]
    Backend(String),

    /// A stored record failed to marshal or unmarshal.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A stored pointer (head or anchor key) was not a valid digest or
    /// height — the store itself is damaged.
    #[error("corrupt stored pointer: {0}")]
    CorruptPointer(#[from] DecodeError),

    /// A traversal hit a non-zero parent pointer with no stored block.
    #[error("broken chain: parent key merkle root {0} resolves to no stored block")]
    BrokenChain(Digest),

    /// Operation attempted after `close()`.
    #[error("overlay is closed")]
    Closed,
}

impl From<sled::Error> for StoreError {
    fn from(e: sled::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

/// Durable, queryable storage for a backward-linked chain of blocks.
///
/// Generic over the backend and, per operation, over the block type — any
/// [`ChainBlock`] implementor flows through unchanged.
pub struct ChainOverlay<S: KvStore> {
    store: S,
    closed: AtomicBool,
}

impl<S: KvStore> ChainOverlay<S> {
    /// Wrap a backend. The overlay owns it until [`close`](Self::close).
    pub fn new(store: S) -> Self {
        ChainOverlay {
            store,
            closed: AtomicBool::new(false),
        }
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    // -- Block operations ---------------------------------------------------

    /// Persist `block` under both index keys, then move the head to it.
    ///
    /// Does not verify linkage — parent pointers are trusted as given.
    /// Saving the same block again rewrites identical bytes and leaves the
    /// head pointing at it.
    pub fn save_block_head<B: ChainBlock>(&self, block: &B) -> Result<(), StoreError> {
        self.ensure_open()?;

        let data = block.marshal_binary()?;
        let key_mr = block.key_mr();
        let digest = block.digest();

        self.store
            .put(BUCKET_BLOCKS_BY_ROOT, key_mr.as_bytes(), &data)?;
        self.store
            .put(BUCKET_BLOCKS_BY_DIGEST, digest.as_bytes(), &data)?;
        // Head last: a crash before this line loses the head update, never
        // the indices behind it.
        self.store
            .put(BUCKET_CHAIN_META, KEY_CHAIN_HEAD, key_mr.as_bytes())?;

        debug!(height = block.height(), key_mr = %key_mr, "saved block head");
        Ok(())
    }

    /// The block the head pointer references, or `None` if nothing has
    /// ever been saved.
    pub fn fetch_head<B: ChainBlock>(&self) -> Result<Option<B>, StoreError> {
        self.ensure_open()?;
        match self.store.get(BUCKET_CHAIN_META, KEY_CHAIN_HEAD)? {
            Some(bytes) => {
                let root = Digest::from_slice(&bytes)?;
                self.fetch_by_root(&root)
            }
            None => Ok(None),
        }
    }

    /// Exact lookup by key Merkle root. Absent is `Ok(None)`.
    pub fn fetch_by_root<B: ChainBlock>(&self, key_mr: &Digest) -> Result<Option<B>, StoreError> {
        self.ensure_open()?;
        self.store
            .get(BUCKET_BLOCKS_BY_ROOT, key_mr.as_bytes())?
            .map(|bytes| B::unmarshal_binary(&bytes).map_err(StoreError::from))
            .transpose()
    }

    /// Exact lookup by self digest. Absent is `Ok(None)`.
    pub fn fetch_by_digest<B: ChainBlock>(&self, digest: &Digest) -> Result<Option<B>, StoreError> {
        self.ensure_open()?;
        self.store
            .get(BUCKET_BLOCKS_BY_DIGEST, digest.as_bytes())?
            .map(|bytes| B::unmarshal_binary(&bytes).map_err(StoreError::from))
            .transpose()
    }

    /// Lazy backward traversal from the head to the zero sentinel.
    ///
    /// Forward-only and not restartable; call again for a fresh walk. An
    /// empty store yields an empty iterator.
    pub fn iter_from_head<B: ChainBlock>(&self) -> ChainIter<'_, S, B> {
        ChainIter {
            overlay: self,
            state: IterState::Start,
            _block: PhantomData,
        }
    }

    /// Every stored block in chain order, genesis first, head last.
    pub fn fetch_all<B: ChainBlock>(&self) -> Result<Vec<B>, StoreError> {
        let mut blocks: Vec<B> = self.iter_from_head().collect::<Result<_, _>>()?;
        blocks.reverse();
        Ok(blocks)
    }

    // -- Anchor operations --------------------------------------------------

    /// Persist an anchor record, keyed by its big-endian height.
    pub fn save_anchor_info(&self, info: &AnchorInfo) -> Result<(), StoreError> {
        self.ensure_open()?;
        let data = info.marshal_binary()?;
        self.store
            .put(BUCKET_ANCHORS, &info.height.to_be_bytes(), &data)?;
        debug!(height = info.height, confirmed = info.confirmed, "saved anchor info");
        Ok(())
    }

    /// The anchor record for a height, or `None` if never anchored.
    pub fn fetch_anchor_info(&self, height: u32) -> Result<Option<AnchorInfo>, StoreError> {
        self.ensure_open()?;
        self.store
            .get(BUCKET_ANCHORS, &height.to_be_bytes())?
            .map(|bytes| AnchorInfo::unmarshal_binary(&bytes).map_err(StoreError::from))
            .transpose()
    }

    /// All anchor records, ascending by height. Big-endian keys make the
    /// backend's byte order the height order.
    pub fn fetch_all_anchor_infos(&self) -> Result<Vec<AnchorInfo>, StoreError> {
        self.ensure_open()?;
        self.store
            .iterate(BUCKET_ANCHORS)?
            .into_iter()
            .map(|(_, bytes)| AnchorInfo::unmarshal_binary(&bytes).map_err(StoreError::from))
            .collect()
    }

    // -- Lifecycle ----------------------------------------------------------

    /// Release the backend. Every subsequent operation fails with
    /// [`StoreError::Closed`]. Closing twice is a no-op.
    pub fn close(&self) -> Result<(), StoreError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        debug!("closing chain overlay");
        self.store.close()
    }
}

// ---------------------------------------------------------------------------
// ChainIter
// ---------------------------------------------------------------------------

enum IterState {
    /// Next step resolves the head pointer.
    Start,
    /// Next step fetches the block at this key Merkle root.
    At(Digest),
    /// Traversal finished, normally or fatally.
    Done,
}

/// Backward chain iterator: head first, genesis last.
///
/// Yields `Err` at most once — a backend failure or a broken parent
/// pointer ends the walk.
pub struct ChainIter<'a, S: KvStore, B: ChainBlock> {
    overlay: &'a ChainOverlay<S>,
    state: IterState,
    _block: PhantomData<B>,
}

impl<S: KvStore, B: ChainBlock> ChainIter<'_, S, B> {
    fn advance_past(&mut self, block: &B) {
        let parent = block.prev_key_mr();
        self.state = if parent.is_zero() {
            // Zero sentinel: normal termination, not an error.
            IterState::Done
        } else {
            IterState::At(parent)
        };
    }
}

impl<S: KvStore, B: ChainBlock> Iterator for ChainIter<'_, S, B> {
    type Item = Result<B, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        match mem::replace(&mut self.state, IterState::Done) {
            IterState::Start => match self.overlay.fetch_head::<B>() {
                Ok(Some(block)) => {
                    trace!(height = block.height(), "chain walk: head");
                    self.advance_past(&block);
                    Some(Ok(block))
                }
                Ok(None) => None,
                Err(e) => Some(Err(e)),
            },
            IterState::At(root) => match self.overlay.fetch_by_root::<B>(&root) {
                Ok(Some(block)) => {
                    trace!(height = block.height(), key_mr = %root, "chain walk: parent");
                    self.advance_past(&block);
                    Some(Ok(block))
                }
                Ok(None) => Some(Err(StoreError::BrokenChain(root))),
                Err(e) => Some(Err(e)),
            },
            IterState::Done => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
