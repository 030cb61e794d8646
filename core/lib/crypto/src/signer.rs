use std::collections::HashMap;

use async_trait::async_trait;
use p256::ecdsa::{signature::Signer as _, Signature, SigningKey};
use sha2::{Digest, Sha256};

#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    #[error("no signer registered for key {0:?}")]
    UnknownKey(String),
    #[error("invalid PEM-encoded signing key: {0}")]
    InvalidKey(#[from] p256::pkcs8::Error),
}

pub fn sha256(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(bytes).into()
}

/// Produces a detached ECDSA-P256-SHA256 signature for a key referenced by
/// opaque ID (mirrors a KMS key reference — the ID never leaks which
/// backend holds the key material).
#[async_trait]
pub trait Signer: Send + Sync {
    async fn sign(&self, signing_key: &str, digest: &[u8; 32]) -> Result<Vec<u8>, SignerError>;
}

/// An in-process signer backed by PEM-encoded PKCS#8 private keys, keyed by
/// the same `signingKey` string a [`tekx_types::SignatureInfo`] carries.
/// Production deployments can swap in a different [`Signer`] that calls out
/// to a real KMS without touching the assembler.
#[derive(Default)]
pub struct SignerRegistry {
    keys: HashMap<String, SigningKey>,
}

impl SignerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_pem(&mut self, signing_key: impl Into<String>, pem: &str) -> Result<(), SignerError> {
        let key = SigningKey::from_pkcs8_pem(pem).map_err(SignerError::InvalidKey)?;
        self.keys.insert(signing_key.into(), key);
        Ok(())
    }
}

#[async_trait]
impl Signer for SignerRegistry {
    async fn sign(&self, signing_key: &str, digest: &[u8; 32]) -> Result<Vec<u8>, SignerError> {
        let key = self
            .keys
            .get(signing_key)
            .ok_or_else(|| SignerError::UnknownKey(signing_key.to_string()))?;
        let signature: Signature = key.sign(digest);
        Ok(signature.to_der().as_bytes().to_vec())
    }
}

/// A single registered key, useful in tests that only exercise one signer.
pub struct EcdsaP256Signer {
    signing_key: String,
    key: SigningKey,
}

impl EcdsaP256Signer {
    pub fn from_pem(signing_key: impl Into<String>, pem: &str) -> Result<Self, SignerError> {
        Ok(Self {
            signing_key: signing_key.into(),
            key: SigningKey::from_pkcs8_pem(pem).map_err(SignerError::InvalidKey)?,
        })
    }
}

#[async_trait]
impl Signer for EcdsaP256Signer {
    async fn sign(&self, signing_key: &str, digest: &[u8; 32]) -> Result<Vec<u8>, SignerError> {
        if signing_key != self.signing_key {
            return Err(SignerError::UnknownKey(signing_key.to_string()));
        }
        let signature: Signature = self.key.sign(digest);
        Ok(signature.to_der().as_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use p256::{
        ecdsa::{signature::Verifier, VerifyingKey},
        pkcs8::{EncodePrivateKey, LineEnding},
    };

    use super::*;

    fn random_key_pem() -> (SigningKey, String) {
        let key = SigningKey::random(&mut rand::thread_rng());
        let pem = key.to_pkcs8_pem(LineEnding::LF).unwrap().to_string();
        (key, pem)
    }

    #[tokio::test]
    async fn signs_and_verifies_with_matching_key() {
        let (key, pem) = random_key_pem();
        let signer = EcdsaP256Signer::from_pem("key-1", &pem).unwrap();
        let digest = sha256(b"export.bin contents");
        let der = signer.sign("key-1", &digest).await.unwrap();

        let verifying_key = VerifyingKey::from(&key);
        let signature = Signature::from_der(&der).unwrap();
        verifying_key.verify(&digest, &signature).unwrap();
    }

    #[tokio::test]
    async fn rejects_unknown_key_id() {
        let (_, pem) = random_key_pem();
        let signer = EcdsaP256Signer::from_pem("key-1", &pem).unwrap();
        let err = signer.sign("key-2", &sha256(b"x")).await.unwrap_err();
        assert!(matches!(err, SignerError::UnknownKey(_)));
    }

    #[tokio::test]
    async fn registry_dispatches_by_key_id() {
        let (_, pem) = random_key_pem();
        let mut registry = SignerRegistry::new();
        registry.insert_pem("key-1", &pem).unwrap();
        let digest = sha256(b"data");
        assert!(registry.sign("key-1", &digest).await.is_ok());
        assert!(registry.sign("missing", &digest).await.is_err());
    }
}
