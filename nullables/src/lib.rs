//! Nullable infrastructure for deterministic testing.
//!
//! All external collaborators of the balloting core (clock, storage, audit
//! trail) are abstracted behind traits. This crate provides test-friendly
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod audit;
pub mod clock;
pub mod store;

pub use audit::NullAuditTrail;
pub use clock::NullClock;
pub use store::{NullEnvironment, NullReadTxn, NullWriteTxn};
