//! Digimarket Payment Engine
//!
//! The payment engine reconciles payment gateway signals against the marketplace ledger for the Digimarket store.
//! This library contains the core logic; it is HTTP-framework and gateway-provider agnostic.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@sqlite`]). You should never need to access the database directly.
//!    Instead, use the public API provided by the engine. The exception is the data types used in the database,
//!    which are defined in the `db_types` module and are public.
//! 2. The engine's public API ([`ReconcilerApi`]). All payment outcomes flow through its `reconcile` method,
//!    whether they arrive as webhook deliveries or as client-driven verification calls. Backends implement the
//!    traits in the [`mod@traits`] module.
//!
//! The engine also emits events when payments settle, fail, or fulfill orders. A simple hook framework lets you
//! subscribe to these and, for example, send buyer and seller notifications without coupling them to the
//! reconciliation transaction.
mod dpe_api;

pub mod db_types;
pub mod events;
pub mod helpers;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
mod sqlite;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

pub use dpe_api::{ReconcileOutcome, Reconciliation, ReconcilerApi, ReconcilerError, DEFAULT_REFUND_WINDOW_DAYS};
