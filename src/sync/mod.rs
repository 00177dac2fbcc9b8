//! Offline-first synchronization between the remote users API and the
//! local store.
//!
//! A sync pulls the full remote snapshot and merges it into the local
//! database one record at a time:
//!
//! - records the store has never seen are inserted as-is;
//! - records that exist locally keep their local `name`, `email` and
//!   `phone`, take the remote `username`, and have `company`, `address`
//!   and `website` filled in only where the local record has none;
//! - soft-deleted records are left untouched, so a deletion survives any
//!   number of later syncs.
//!
//! A merge never removes records; locally created users simply stay in
//! the store until the remote learns about them.

mod reconciler;

pub use reconciler::Reconciler;
#[allow(unused_imports)]
pub use reconciler::MergeReport;
