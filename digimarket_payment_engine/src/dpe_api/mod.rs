//! The public API of the payment engine.
//!
//! [`ReconcilerApi`] drives the whole payment lifecycle: order placement, charge initialization, reconciliation of
//! gateway signals against the ledger, cancellations, and refunds.
mod errors;
mod reconciler_api;

pub use errors::ReconcilerError;
pub use reconciler_api::{ReconcileOutcome, Reconciliation, ReconcilerApi, DEFAULT_REFUND_WINDOW_DAYS};
