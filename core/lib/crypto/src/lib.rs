//! Signing backend behind C1's "signer lookup by key ID" contract (§9).
//! `export-file` assembles bytes and asks a [`Signer`] for a detached
//! ECDSA-P256-SHA256 signature over their digest; it never sees key
//! material directly.

mod signer;

pub use signer::{sha256, EcdsaP256Signer, Signer, SignerError, SignerRegistry};

/// The algorithm identifier the export-file spec (§4.6) requires on every
/// emitted `TEKSignature`.
pub const ECDSA_P256_SHA256_OID: &str = "1.2.840.10045.4.3.2";
