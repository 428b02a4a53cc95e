//! `wm-core` — foundational types for the wireless mobility manager.
//!
//! This crate is a dependency of every other `wm-*` crate.  It has no
//! `wm-*` dependencies and only `thiserror` (plus optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                              |
//! |-------------|-------------------------------------------------------|
//! | [`ids`]     | `ClientMac`, `AgentAddr`, `Channel`                   |
//! | [`signal`]  | `Dbm`, `SignalEvent`                                  |
//! | [`time`]    | `Timestamp` (milliseconds)                            |
//! | [`config`]  | `PolicyConfig` and its defaults                       |
//! | [`error`]   | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod ids;
pub mod signal;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::PolicyConfig;
pub use error::{CoreError, CoreResult};
pub use ids::{AgentAddr, Channel, ClientMac};
pub use signal::{Dbm, SignalEvent};
pub use time::Timestamp;
