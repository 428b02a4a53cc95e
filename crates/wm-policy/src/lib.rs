//! `wm-policy` — the handoff decision policy.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                    |
//! |------------|-------------------------------------------------------------|
//! | [`action`] | `Action`, `Decision`, `HandoffReason`, `Suppression`        |
//! | [`policy`] | `HandoffPolicy` — `needs_scan` + `decide`                   |
//! | [`error`]  | `PolicyError`, `PolicyResult<T>`                            |
//!
//! # Design notes
//!
//! The policy is a pure function of `(event, record, best candidate)`.  It
//! performs no I/O, takes no locks, and never mutates the record it is
//! given; the manager (wm-manager) owns scanning, dispatch, and commit.
//! That keeps every rule unit-testable without any agent network at all.

pub mod action;
pub mod error;
pub mod policy;


pub use action::{Action, Decision, HandoffReason, Suppression};
pub use error::{PolicyError, PolicyResult};
pub use policy::HandoffPolicy;
