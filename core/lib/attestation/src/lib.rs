//! Device attestation verification (C5, §4.3): derives the Android nonce
//! from a publish request, parses/verifies a SafetyNet JWS attestation
//! against it, and checks the decoded claims against an app's policy.
//!
//! iOS DeviceCheck verification is out of this crate's current scope — the
//! server only ever receives SafetyNet attestations in practice (see
//! `DESIGN.md`); [`tekx_types::DeviceCheckPolicy`] is carried end to end so
//! a verifier can be added here without touching callers.

mod claims;
mod error;
mod jws;
mod nonce;
mod verifier;

pub use claims::SafetyNetClaims;
pub use error::AttestationError;
pub use nonce::{derive_android_nonce, NonceKey};
pub use verifier::{verify_safetynet, VerificationWindow};
