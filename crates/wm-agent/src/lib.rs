//! `wm-agent` — the mobility manager's view of the wireless control plane.
//!
//! # Crate layout
//!
//! | Module             | Contents                                                        |
//! |--------------------|-----------------------------------------------------------------|
//! | [`control`]        | `AgentControl`, `ClientRegistry`, `HandoffExecutor`, `TelemetrySource` |
//! | [`subscription`]   | `Subscription`, `ClientPattern`, `Relation`                     |
//! | [`channel_plan`]   | `ChannelPlan` — static agent → channel assignment at startup    |
//! | [`memory`]         | `InMemoryNetwork` — in-process implementation of every trait    |
//! | [`error`]          | `AgentError`, `AgentResult<T>`                                  |
//!
//! Agent discovery, LVAP migration, and the wire protocol to agents live
//! behind these traits; nothing in the decision core depends on how they are
//! implemented.

pub mod channel_plan;
pub mod control;
pub mod error;
pub mod memory;
pub mod subscription;

#[cfg(test)]
mod tests;

pub use channel_plan::ChannelPlan;
pub use control::{AgentControl, ClientHandle, ClientRegistry, HandoffExecutor, TelemetrySource};
pub use error::{AgentError, AgentResult};
pub use memory::InMemoryNetwork;
pub use subscription::{ClientPattern, METRIC_SIGNAL, Relation, Subscription};
