//! # Signature Carrier & Signing Seam
//!
//! Blocks and anchor transactions are authorized by Ed25519 signatures,
//! but this crate does not *do* asymmetric cryptography — it carries the
//! fixed 64-byte result around and compares it. The actual signing and
//! verification live behind the [`MessageSigner`] / [`MessageVerifier`]
//! traits, with ed25519-dalek implementations provided for callers that
//! don't bring their own.
//!
//! ## Unset vs. set
//!
//! A [`SignatureHandle`] starts unset. Comparing against an unset handle
//! is always "not equal" — never an error, never a panic — and marshaling
//! one is refused. This mirrors how half-built records flow through block
//! assembly: the handle exists before the signature does.

use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use thiserror::Error;

use crate::config::SIGNATURE_LENGTH;

/// Errors from handling fixed-width signature values.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// Input was not exactly [`SIGNATURE_LENGTH`] bytes.
    #[error("invalid signature length: expected 64 bytes, got {0}")]
    InvalidLength(usize),

    /// The handle holds no signature yet.
    #[error("signature is unset")]
    Unset,
}

/// A fixed 64-byte signature value, either unset or set.
///
/// Holds no behavior beyond storage and byte-exact comparison; producing
/// or checking a signature is the signer's and verifier's job.
#[derive(Clone, Copy, Debug, Default)]
pub struct SignatureHandle {
    bytes: Option<[u8; SIGNATURE_LENGTH]>,
}

impl SignatureHandle {
    /// Construct a set handle directly from a 64-byte array.
    pub fn from_bytes(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        SignatureHandle { bytes: Some(bytes) }
    }

    /// Store a signature value. Exactly 64 bytes or nothing.
    pub fn set_signature(&mut self, sig: &[u8]) -> Result<(), SignatureError> {
        let fixed: [u8; SIGNATURE_LENGTH] = sig
            .try_into()
            .map_err(|_| SignatureError::InvalidLength(sig.len()))?;
        self.bytes = Some(fixed);
        Ok(())
    }

    /// Whether a signature has been stored.
    pub fn is_set(&self) -> bool {
        self.bytes.is_some()
    }

    /// The stored 64 bytes, if set.
    pub fn as_bytes(&self) -> Option<&[u8; SIGNATURE_LENGTH]> {
        self.bytes.as_ref()
    }

    /// Marshal the signature to its 64-byte wire form.
    ///
    /// Refuses on an unset handle — there is no canonical encoding of
    /// "no signature" and inventing one invites forged zero signatures.
    pub fn marshal_binary(&self) -> Result<Vec<u8>, SignatureError> {
        self.bytes
            .map(|b| b.to_vec())
            .ok_or(SignatureError::Unset)
    }

    /// Rebuild a handle from its 64-byte wire form. Round-trip identity
    /// with [`marshal_binary`](Self::marshal_binary).
    pub fn unmarshal_binary(data: &[u8]) -> Result<Self, SignatureError> {
        let mut handle = SignatureHandle::default();
        handle.set_signature(data)?;
        Ok(handle)
    }

    /// Byte-exact comparison. False whenever either side is unset.
    pub fn is_equal(&self, other: &SignatureHandle) -> bool {
        match (self.bytes, other.bytes) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Signing seam
// ---------------------------------------------------------------------------

/// Capability to produce a [`SignatureHandle`] over a message from a held
/// private key.
pub trait MessageSigner {
    fn sign_handle(&self, message: &[u8]) -> SignatureHandle;
}

/// Capability to check a [`SignatureHandle`] over a message against a
/// public key. An unset handle never verifies.
pub trait MessageVerifier {
    fn verify_handle(&self, message: &[u8], signature: &SignatureHandle) -> bool;
}

/// Ed25519 signer backed by ed25519-dalek.
pub struct Ed25519Signer {
    signing_key: SigningKey,
}

impl Ed25519Signer {
    /// Generate a fresh signing key from the OS RNG.
    pub fn generate() -> Self {
        Ed25519Signer {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Deterministic construction from a 32-byte seed. Test fixtures and
    /// key-derivation callers use this; everyone else wants `generate`.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Ed25519Signer {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    /// Raw bytes of the public half, for callers shipping it elsewhere.
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// The matching verifier.
    pub fn verifier(&self) -> Ed25519Verifier {
        Ed25519Verifier {
            verifying_key: self.signing_key.verifying_key(),
        }
    }
}

impl MessageSigner for Ed25519Signer {
    fn sign_handle(&self, message: &[u8]) -> SignatureHandle {
        let sig = self.signing_key.sign(message);
        SignatureHandle::from_bytes(sig.to_bytes())
    }
}

/// Ed25519 verifier holding only the public half.
#[derive(Clone)]
pub struct Ed25519Verifier {
    verifying_key: VerifyingKey,
}

impl Ed25519Verifier {
    /// Build a verifier from raw public key bytes. Rejects bytes that are
    /// not a valid curve point.
    pub fn from_public_key_bytes(bytes: &[u8; 32]) -> Option<Self> {
        VerifyingKey::from_bytes(bytes)
            .ok()
            .map(|verifying_key| Ed25519Verifier { verifying_key })
    }
}

impl MessageVerifier for Ed25519Verifier {
    fn verify_handle(&self, message: &[u8], signature: &SignatureHandle) -> bool {
        match signature.as_bytes() {
            Some(bytes) => {
                let sig = DalekSignature::from_bytes(bytes);
                self.verifying_key.verify(message, &sig).is_ok()
            }
            None => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::digest::Digest;

    /// Builds a deterministic 64-byte value out of two digest halves, the
    /// way the reference signature tests seed their fixtures.
    fn synthetic_sig(tag: &str) -> [u8; 64] {
        let first = Digest::sha(format!("sig first half  {tag}").as_bytes());
        let second = Digest::sha(format!("sig second half {tag}").as_bytes());
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(first.as_bytes());
        out[32..].copy_from_slice(second.as_bytes());
        out
    }

    #[test]
    fn set_signature_enforces_width() {
        let mut handle = SignatureHandle::default();
        assert!(matches!(
            handle.set_signature(&[0u8; 63]),
            Err(SignatureError::InvalidLength(63))
        ));
        assert!(matches!(
            handle.set_signature(&[0u8; 65]),
            Err(SignatureError::InvalidLength(65))
        ));
        assert!(!handle.is_set());

        handle.set_signature(&synthetic_sig("one")).unwrap();
        assert!(handle.is_set());
    }

    #[test]
    fn unset_handles_never_compare_equal() {
        let unset = SignatureHandle::default();
        let set = SignatureHandle::from_bytes(synthetic_sig("one"));

        assert!(!unset.is_equal(&set));
        assert!(!set.is_equal(&unset));
        // Even two unset handles are "not equal" — there's nothing to compare.
        assert!(!unset.is_equal(&SignatureHandle::default()));
    }

    #[test]
    fn equality_is_byte_exact() {
        let s1 = SignatureHandle::from_bytes(synthetic_sig("one"));
        let s1_again = SignatureHandle::from_bytes(synthetic_sig("one"));
        let s2 = SignatureHandle::from_bytes(synthetic_sig("two"));

        assert!(s1.is_equal(&s1_again));
        assert!(!s1.is_equal(&s2));
    }

    #[test]
    fn marshal_round_trip() {
        let original = SignatureHandle::from_bytes(synthetic_sig("one"));
        let wire = original.marshal_binary().unwrap();
        assert_eq!(wire.len(), 64);

        let back = SignatureHandle::unmarshal_binary(&wire).unwrap();
        assert!(original.is_equal(&back));
    }

    #[test]
    fn marshal_refuses_unset() {
        let unset = SignatureHandle::default();
        assert!(matches!(unset.marshal_binary(), Err(SignatureError::Unset)));
    }

    #[test]
    fn unmarshal_rejects_wrong_width() {
        assert!(SignatureHandle::unmarshal_binary(&[0u8; 32]).is_err());
        assert!(SignatureHandle::unmarshal_binary(&[]).is_err());
    }

    #[test]
    fn ed25519_sign_and_verify() {
        let signer = Ed25519Signer::generate();
        let verifier = signer.verifier();
        let msg = b"anchor height 421 to the external ledger";

        let sig = signer.sign_handle(msg);
        assert!(sig.is_set());
        assert!(verifier.verify_handle(msg, &sig));
        assert!(!verifier.verify_handle(b"different message", &sig));
    }

    #[test]
    fn ed25519_rejects_wrong_key() {
        let signer = Ed25519Signer::generate();
        let other = Ed25519Signer::generate();
        let msg = b"signed by one, checked by another";

        let sig = signer.sign_handle(msg);
        assert!(!other.verifier().verify_handle(msg, &sig));
    }

    #[test]
    fn ed25519_unset_never_verifies() {
        let signer = Ed25519Signer::generate();
        assert!(!signer
            .verifier()
            .verify_handle(b"anything", &SignatureHandle::default()));
    }

    #[test]
    fn ed25519_deterministic_from_seed() {
        let a = Ed25519Signer::from_seed([7u8; 32]);
        let b = Ed25519Signer::from_seed([7u8; 32]);
        let sig_a = a.sign_handle(b"same message");
        let sig_b = b.sign_handle(b"same message");
        assert!(sig_a.is_equal(&sig_b));
    }

    #[test]
    fn verifier_from_public_key_bytes() {
        let signer = Ed25519Signer::generate();
        let msg = b"wire-format public key";
        let sig = signer.sign_handle(msg);

        let verifier = Ed25519Verifier::from_public_key_bytes(&signer.public_key_bytes())
            .expect("valid public key bytes");
        assert!(verifier.verify_handle(msg, &sig));
    }
}
