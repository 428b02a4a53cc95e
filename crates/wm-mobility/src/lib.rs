//! `wm-mobility` — per-client mobility bookkeeping and scan aggregation.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                            |
//! |------------|---------------------------------------------------------------------|
//! | [`record`] | `MobilityRecord`, `ScanResult`, `ClientState`                       |
//! | [`store`]  | `MobilityStateStore` — `DashMap<ClientMac, Arc<Mutex<MobilityRecord>>>` |
//! | [`scan`]   | `ScanAggregator<A>` — concurrent, time-bounded probes + selection   |
//! | [`error`]  | `MobilityError`, `MobilityResult<T>`                                |
//!
//! # Concurrency model
//!
//! Records are never handed out by value for modification.  Callers either
//! go through [`MobilityStateStore::update`] or hold the record's own lock
//! (obtained from [`MobilityStateStore::get_or_create`]) for the whole
//! read-decide-write sequence.  Distinct clients never share a lock.
//!
//! # Cargo features
//!
//! | Feature   | Effect                                               |
//! |-----------|------------------------------------------------------|
//! | `fx-hash` | FxHash instead of SipHash for the client map.        |

pub mod error;
pub mod record;
pub mod scan;
pub mod store;

#[cfg(test)]
mod tests;

pub use error::{MobilityError, MobilityResult};
pub use record::{ClientState, MobilityRecord, ScanResult};
pub use scan::{ScanAggregator, ScanReport, select_best};
pub use store::{MobilityStateStore, SharedRecord};
