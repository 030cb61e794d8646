use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine as _,
};
use rsa::{
    pkcs1::DecodeRsaPublicKey, pkcs1v15::VerifyingKey, pkcs8::DecodePublicKey, signature::Verifier,
    RsaPublicKey,
};
use serde::Deserialize;
use sha2::Sha256;
use x509_parser::prelude::*;

use crate::error::AttestationError;

#[derive(Debug, Deserialize)]
struct JwsHeader {
    #[allow(dead_code)]
    alg: String,
    x5c: Vec<String>,
}

/// A parsed-but-unverified compact JWS: the three dot-separated segments
/// plus the decoded certificate chain from the header's `x5c`.
pub struct ParsedJws {
    signing_input: String,
    signature: Vec<u8>,
    payload: Vec<u8>,
    certs_der: Vec<Vec<u8>>,
}

impl ParsedJws {
    pub fn parse(compact: &str) -> Result<Self, AttestationError> {
        let mut parts = compact.split('.');
        let (header_b64, payload_b64, signature_b64) =
            match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some(h), Some(p), Some(s), None) => (h, p, s),
                _ => return Err(AttestationError::MalformedJws("expected 3 dot-separated segments".into())),
            };

        let header_bytes = URL_SAFE_NO_PAD
            .decode(header_b64)
            .map_err(|e| AttestationError::MalformedJws(format!("header base64: {e}")))?;
        let header: JwsHeader = serde_json::from_slice(&header_bytes)
            .map_err(|e| AttestationError::MalformedJws(format!("header json: {e}")))?;
        if header.x5c.is_empty() {
            return Err(AttestationError::MalformedJws("empty x5c chain".into()));
        }

        let certs_der = header
            .x5c
            .iter()
            .map(|c| {
                STANDARD
                    .decode(c)
                    .map_err(|e| AttestationError::MalformedJws(format!("x5c entry base64: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|e| AttestationError::MalformedJws(format!("signature base64: {e}")))?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|e| AttestationError::MalformedJws(format!("payload base64: {e}")))?;

        Ok(Self {
            signing_input: format!("{header_b64}.{payload_b64}"),
            signature,
            payload,
            certs_der,
        })
    }

    /// The leaf certificate's Subject Alternative Name list, lowercased.
    fn leaf_sans(&self) -> Result<Vec<String>, AttestationError> {
        let (_, cert) =
            X509Certificate::from_der(&self.certs_der[0]).map_err(|_| AttestationError::InvalidCertificate)?;
        let mut sans = Vec::new();
        if let Ok(Some(ext)) = cert.subject_alternative_name() {
            for name in &ext.value.general_names {
                if let GeneralName::DNSName(dns) = name {
                    sans.push(dns.to_lowercase());
                }
            }
        }
        Ok(sans)
    }

    /// Confirms the leaf certificate was issued for `hostname` (§4.3: the
    /// chain must resolve to `attest.android.com`).
    pub fn verify_hostname(&self, hostname: &str) -> Result<(), AttestationError> {
        let sans = self.leaf_sans()?;
        if sans.iter().any(|s| s == hostname) {
            Ok(())
        } else {
            Err(AttestationError::UnexpectedHostname)
        }
    }

    /// Verifies the JWS signature against the leaf certificate's RSA public
    /// key, then returns the decoded claims.
    pub fn verify_signature_and_decode<T: for<'de> serde::Deserialize<'de>>(
        &self,
    ) -> Result<T, AttestationError> {
        let (_, cert) =
            X509Certificate::from_der(&self.certs_der[0]).map_err(|_| AttestationError::InvalidCertificate)?;
        let spki_der = cert.public_key().raw;
        let public_key = RsaPublicKey::from_public_key_der(spki_der)
            .or_else(|_| RsaPublicKey::from_pkcs1_der(spki_der))
            .map_err(|_| AttestationError::InvalidCertificate)?;
        let verifying_key = VerifyingKey::<Sha256>::new(public_key);

        let signature = rsa::pkcs1v15::Signature::try_from(self.signature.as_slice())
            .map_err(|_| AttestationError::SignatureInvalid)?;
        verifying_key
            .verify(self.signing_input.as_bytes(), &signature)
            .map_err(|_| AttestationError::SignatureInvalid)?;

        serde_json::from_slice(&self.payload)
            .map_err(|e| AttestationError::MalformedJws(format!("payload claims: {e}")))
    }
}
