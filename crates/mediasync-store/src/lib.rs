//! # mediasync-store
//!
//! Local storage side of mediasync: the flat output directory, the JSON
//! ledger that lets runs skip redundant transcoding, content hashing, and the
//! reconciliation sweep that removes unreferenced assets.

pub mod hash;
pub mod layout;
pub mod ledger;
pub mod reconcile;

pub use hash::{hash_bytes, hash_file};
pub use layout::OutputLayout;
pub use ledger::Ledger;
pub use reconcile::{sweep, LiveSet, SweepMode, SweepReport};
