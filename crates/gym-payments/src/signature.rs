//! Payment signature verification.
//!
//! The gateway signs every completed checkout with
//! `hex(HMAC-SHA256(key_secret, order_id + "|" + payment_id))`. Recomputing
//! that value with our copy of the secret proves the completion really came
//! from the gateway.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{PaymentError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Verifier for gateway completion signatures.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: String,
}

impl SignatureVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Hex signature the gateway must have produced for this pair.
    pub fn sign(&self, order_id: &str, payment_id: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(order_id.as_bytes());
        mac.update(b"|");
        mac.update(payment_id.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Check a gateway-supplied signature.
    ///
    /// # Errors
    ///
    /// `PaymentError::InvalidSignature` on any mismatch.
    pub fn verify(&self, order_id: &str, payment_id: &str, signature: &str) -> Result<()> {
        let expected = self.sign(order_id, payment_id);
        if constant_time_compare(expected.as_bytes(), signature.as_bytes()) {
            Ok(())
        } else {
            Err(PaymentError::InvalidSignature)
        }
    }
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier").finish_non_exhaustive()
    }
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
