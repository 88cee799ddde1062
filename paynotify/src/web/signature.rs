//! Midtrans notification signature verification.
//!
//! Midtrans signs each notification with a SHA-512 digest of
//! `order_id + status_code + gross_amount + server_key`, hex encoded.
//! Reference: https://docs.midtrans.com/docs/https-notification-webhooks#verifying-notification-authenticity

use sha2::{Digest, Sha512};
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::config::ServerKey;

/// Verifies notification signatures against the configured server key.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    server_key: ServerKey,
}

impl SignatureVerifier {
    pub fn new(server_key: ServerKey) -> Self {
        Self { server_key }
    }

    /// Compute the lowercase hex signature Midtrans would send for these fields.
    pub fn sign(&self, order_id: &str, status_code: &str, gross_amount: &str) -> String {
        let mut hasher = Sha512::new();
        hasher.update(order_id.as_bytes());
        hasher.update(status_code.as_bytes());
        hasher.update(gross_amount.as_bytes());
        hasher.update(self.server_key.reveal().as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Verify a notification signature.
    ///
    /// # Returns
    ///
    /// `true` only if every field is present and `signature` matches the
    /// expected digest.
    pub fn verify(
        &self,
        order_id: &str,
        status_code: &str,
        gross_amount: &str,
        signature: &str,
    ) -> bool {
        let key = self.server_key.reveal();
        if key.is_empty()
            || order_id.is_empty()
            || status_code.is_empty()
            || gross_amount.is_empty()
            || signature.is_empty()
        {
            warn!(
                has_server_key = !key.is_empty(),
                has_order_id = !order_id.is_empty(),
                has_status_code = !status_code.is_empty(),
                has_gross_amount = !gross_amount.is_empty(),
                has_signature = !signature.is_empty(),
                "signature_missing_fields"
            );
            return false;
        }

        let expected = self.sign(order_id, status_code, gross_amount);
        let valid: bool = expected.as_bytes().ct_eq(signature.as_bytes()).into();

        if !valid {
            warn!(
                order_id = %order_id,
                expected_length = expected.len(),
                actual_length = signature.len(),
                "signature_mismatch"
            );
        }

        valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier() -> SignatureVerifier {
        SignatureVerifier::new(ServerKey::new("SB-Mid-server-test"))
    }

    fn reference_signature(input: &str) -> String {
        hex::encode(Sha512::digest(input.as_bytes()))
    }

    #[test]
    fn test_sign_matches_concatenated_digest() {
        let signature = verifier().sign("ORD1", "200", "10000.00");
        assert_eq!(
            signature,
            reference_signature("ORD120010000.00SB-Mid-server-test")
        );
        assert_eq!(signature.len(), 128);
        assert_eq!(signature, signature.to_lowercase());
    }

    #[test]
    fn test_verify_valid() {
        let v = verifier();
        let signature = reference_signature("ORD120010000.00SB-Mid-server-test");
        assert!(v.verify("ORD1", "200", "10000.00", &signature));
    }

    #[test]
    fn test_verify_rejects_uppercase_hex() {
        let v = verifier();
        let signature = v.sign("ORD1", "200", "10000.00").to_uppercase();
        assert!(!v.verify("ORD1", "200", "10000.00", &signature));
    }

    #[test]
    fn test_verify_rejects_any_mutated_field() {
        let v = verifier();
        let signature = v.sign("ORD1", "200", "10000.00");

        assert!(!v.verify("ORD2", "200", "10000.00", &signature));
        assert!(!v.verify("ORD1", "201", "10000.00", &signature));
        assert!(!v.verify("ORD1", "200", "10000.01", &signature));
        assert!(!v.verify("ORD1", "200", "10000", &signature));
    }

    #[test]
    fn test_verify_rejects_every_single_byte_flip() {
        let v = verifier();
        let payload = "ORD1";
        let signature = v.sign(payload, "200", "10000.00");

        for i in 0..payload.len() {
            let mut bytes = payload.as_bytes().to_vec();
            bytes[i] ^= 0x01;
            let mutated = String::from_utf8(bytes).unwrap();
            assert!(!v.verify(&mutated, "200", "10000.00", &signature));
        }
    }

    #[test]
    fn test_verify_rejects_other_key() {
        let other = SignatureVerifier::new(ServerKey::new("another-key"));
        let signature = other.sign("ORD1", "200", "10000.00");
        assert!(!verifier().verify("ORD1", "200", "10000.00", &signature));
    }

    #[test]
    fn test_verify_missing_fields() {
        let v = verifier();
        assert!(!v.verify("", "200", "10000", "sig"));
        assert!(!v.verify("ORD1", "", "10000", "sig"));
        assert!(!v.verify("ORD1", "200", "", "sig"));
        assert!(!v.verify("ORD1", "200", "10000", ""));

        let keyless = SignatureVerifier::new(ServerKey::new(""));
        let signature = keyless.sign("ORD1", "200", "10000");
        assert!(!keyless.verify("ORD1", "200", "10000", &signature));
    }

    #[test]
    fn test_verify_rejects_short_signature() {
        assert!(!verifier().verify("ORD1", "200", "10000", "deadbeef"));
    }
}
