use hmac::{Hmac, Mac};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Checks a webhook delivery's signature header against the raw request body.
///
/// The gateway signs the exact bytes of the POST body with HMAC-SHA512 under the account's secret key and sends the
/// hex digest in the `x-paystack-signature` header. Pure function, no I/O; the comparison is constant-time.
pub fn verify_webhook_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha512::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Produces the hex signature for a payload. Used by tests and local tooling to forge valid deliveries.
pub fn sign_payload(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha512::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}
