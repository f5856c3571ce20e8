//! Cryptographic utilities for payment callback verification.
//!
//! The payment provider signs callbacks with HMAC-SHA256 over
//! `"{order_id}|{payment_id}"` using the server-held key secret. The
//! signature is the sole fraud barrier: callback payloads are relayed by the
//! client and otherwise untrusted.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute HMAC-SHA256 and return the hex-encoded result.
///
/// # Panics
///
/// This function will never panic in practice. The `expect` call is guarded
/// by the invariant that HMAC-SHA256 accepts keys of any size per RFC 2104.
#[must_use]
pub fn hmac_sha256_hex(secret: &str, message: &str) -> String {
    // INVARIANT: HMAC-SHA256 accepts keys of any size per RFC 2104, so
    // `new_from_slice` only fails if the Hmac implementation is broken.
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC-SHA256 accepts any key size");
    mac.update(message.as_bytes());
    let result = mac.finalize();

    hex::encode(result.into_bytes())
}

/// Constant-time string comparison to prevent timing attacks.
#[must_use]
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

/// Verify a payment callback signature.
///
/// Recomputes `HMAC-SHA256(secret, "{order_id}|{payment_id}")` and compares
/// it against the supplied hex signature in constant time.
#[must_use]
pub fn verify_payment_signature(
    order_id: &str,
    payment_id: &str,
    signature: &str,
    secret: &str,
) -> bool {
    let expected = hmac_sha256_hex(secret, &format!("{order_id}|{payment_id}"));
    constant_time_eq(&expected, signature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hmac_sha256_produces_correct_length() {
        let result = hmac_sha256_hex("key", "order_1|pay_1");
        assert_eq!(result.len(), 64); // SHA256 = 32 bytes = 64 hex chars
    }

    #[test]
    fn hmac_sha256_is_deterministic() {
        assert_eq!(
            hmac_sha256_hex("secret", "message"),
            hmac_sha256_hex("secret", "message")
        );
    }

    #[test]
    fn constant_time_eq_basic() {
        assert!(constant_time_eq("abc", "abc"));
        assert!(constant_time_eq("", ""));
        assert!(!constant_time_eq("abc", "abd"));
        assert!(!constant_time_eq("abc", "ab"));
        assert!(!constant_time_eq("abc", "ABC"));
    }

    #[test]
    fn valid_signature_verifies() {
        let sig = hmac_sha256_hex("secret", "order_1|pay_1");
        assert!(verify_payment_signature("order_1", "pay_1", &sig, "secret"));
    }

    #[test]
    fn tampered_signature_fails_regardless_of_ids() {
        let mut sig = hmac_sha256_hex("secret", "order_1|pay_1");
        // Flip one hex character.
        let last = if sig.ends_with('0') { '1' } else { '0' };
        sig.pop();
        sig.push(last);

        assert!(!verify_payment_signature("order_1", "pay_1", &sig, "secret"));
    }

    #[test]
    fn signature_binds_order_and_payment() {
        let sig = hmac_sha256_hex("secret", "order_1|pay_1");
        assert!(!verify_payment_signature("order_2", "pay_1", &sig, "secret"));
        assert!(!verify_payment_signature("order_1", "pay_2", &sig, "secret"));
        assert!(!verify_payment_signature("order_1", "pay_1", &sig, "other"));
    }
}
