/// Generates a fresh payment reference, e.g. `DIGI_4be2a1c09f33d7e8`.
///
/// The reference is the idempotency key for the whole payment lifecycle, so it only has to be unique; it carries
/// no other meaning.
pub fn new_payment_reference() -> String {
    format!("DIGI_{:016x}", rand::random::<u64>())
}

/// Generates a fresh order number, e.g. `DM-58c1f0a2b94d63e7`.
pub fn new_order_number() -> String {
    format!("DM-{:016x}", rand::random::<u64>())
}
