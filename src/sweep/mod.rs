//! Catalog sweeping: find expired items and delete them.
//!
//! - [`enumerator`] walks the full listing, page by page.
//! - [`policy`] decides which listed items are candidates.
//! - [`engine`] runs a cleanup: enumerate, filter, delete sequentially.
//! - [`diagnostics`] is the read-only counterpart (scan and sample).
//! - [`worker`] repeats cleanups on a fixed interval.

pub mod diagnostics;
pub mod engine;
pub mod enumerator;
pub mod policy;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use diagnostics::Diagnostics;
pub use engine::{CleanupEngine, CleanupError, CleanupResult, DeleteFailure};
pub use enumerator::{EnumerationLimits, Listing, enumerate_all};
pub use policy::{Policy, matches};
pub use worker::{PassOutcome, run_pass, start_cleanup_worker};
