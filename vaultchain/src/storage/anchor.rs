//! # Anchor Records
//!
//! One [`AnchorInfo`] per chain height, tying a block's digest and Merkle
//! root to the external-ledger transaction that attests to it. Anchor
//! records are produced by an external anchoring process and consumed here
//! as plain values — stored, fetched by height, and eventually flipped to
//! confirmed once the external transaction is verified.
//!
//! Heights are assigned monotonically by the producer; this layer imposes
//! no gap policy of its own.

use serde::{Deserialize, Serialize};

use super::block::CodecError;
use crate::crypto::Digest;

/// Per-height anchoring metadata for the external ledger.
///
/// Digest fields are typed, so the 32-byte width is enforced by
/// construction — there is no setter validation to get wrong. The one
/// piece of behavior is [`confirm`](Self::confirm): a one-way latch from
/// unconfirmed to confirmed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorInfo {
    /// Chain height this record anchors.
    pub height: u32,
    /// Self digest of the block at this height.
    pub block_digest: Digest,
    /// Key Merkle root of the block at this height.
    pub merkle_root: Digest,
    /// Local Unix timestamp (seconds) when the anchor was submitted.
    pub timestamp: i64,
    /// Digest of the anchoring transaction on the external ledger.
    pub anchor_tx_digest: Digest,
    /// Offset of the anchoring transaction within its external block.
    pub anchor_tx_offset: i32,
    /// Height of the external block containing the anchor transaction.
    pub anchor_block_height: i32,
    /// Digest of that external block.
    pub anchor_block_digest: Digest,
    /// Whether the external anchor has been verified. Once true, treated
    /// as immutable by this layer.
    pub confirmed: bool,
}

impl AnchorInfo {
    /// A zero-valued record for the given height, unconfirmed.
    pub fn new(height: u32) -> Self {
        AnchorInfo {
            height,
            block_digest: Digest::zero(),
            merkle_root: Digest::zero(),
            timestamp: 0,
            anchor_tx_digest: Digest::zero(),
            anchor_tx_offset: 0,
            anchor_block_height: 0,
            anchor_block_digest: Digest::zero(),
            confirmed: false,
        }
    }

    /// Latch the record to confirmed. Idempotent; never reverses.
    pub fn confirm(&mut self) {
        self.confirmed = true;
    }

    /// Canonical binary form, same codec as blocks.
    pub fn marshal_binary(&self) -> Result<Vec<u8>, CodecError> {
        bincode::serialize(self).map_err(|e| CodecError::Encode(e.to_string()))
    }

    /// Inverse of [`marshal_binary`](Self::marshal_binary).
    pub fn unmarshal_binary(data: &[u8]) -> Result<Self, CodecError> {
        bincode::deserialize(data).map_err(|e| CodecError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic fixture in the style of the reference helper: every
    /// digest byte set to a height-derived value.
    pub(crate) fn make_anchor(height: u32) -> AnchorInfo {
        let fill = |b: u8| Digest::from([b; 32]);
        let mut info = AnchorInfo::new(height);
        info.block_digest = fill(height as u8);
        info.merkle_root = fill(255 - height as u8);
        info.timestamp = height as i64;
        info.anchor_tx_digest = fill(height as u8);
        info.anchor_tx_offset = height as i32;
        info.anchor_block_height = height as i32;
        info.anchor_block_digest = fill(255 - height as u8);
        info.confirmed = height % 2 == 0;
        info
    }

    #[test]
    fn fresh_record_is_unconfirmed_and_zeroed() {
        let info = AnchorInfo::new(42);
        assert_eq!(info.height, 42);
        assert!(!info.confirmed);
        assert!(info.block_digest.is_zero());
        assert!(info.anchor_tx_digest.is_zero());
        assert_eq!(info.timestamp, 0);
        assert_eq!(info.anchor_tx_offset, 0);
    }

    #[test]
    fn confirm_is_idempotent_one_way() {
        let mut info = AnchorInfo::new(7);
        assert!(!info.confirmed);
        info.confirm();
        assert!(info.confirmed);
        info.confirm();
        assert!(info.confirmed);
    }

    #[test]
    fn marshal_round_trip() {
        let info = make_anchor(9);
        let bytes = info.marshal_binary().unwrap();
        let back = AnchorInfo::unmarshal_binary(&bytes).unwrap();
        assert_eq!(back, info);
        assert_eq!(back.marshal_binary().unwrap(), bytes);
    }

    #[test]
    fn json_form_uses_hex_digests() {
        let info = make_anchor(3);
        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains(&info.block_digest.to_hex()));

        let back: AnchorInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, info);
    }
}
