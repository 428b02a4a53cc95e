//! `wm-manager` — the event dispatcher that drives the mobility decision core.
//!
//! # Event pipeline
//!
//! ```text
//! TelemetrySource ──mpsc──► run() ──bounded queue──► client worker ──► on_signal(event)
//!   ① lookup_client            unknown → Discarded (no record); time-bounded
//!   ② get_or_create + lock     held until ⑥; serializes one client
//!   ③ needs_scan? → ScanAggregator::scan (parallel, time-bounded)
//!   ④ HandoffPolicy::decide
//!   ⑤ HandoffExecutor::handoff (+ retries, each time-bounded)
//!   ⑥ commit `applied`, or `retained` if ⑤ failed
//! ```
//!
//! # Crate layout
//!
//! | Module       | Contents                                              |
//! |--------------|-------------------------------------------------------|
//! | [`manager`]  | `MobilityManager`, `Outcome`, `CLIENT_QUEUE_DEPTH`    |
//! | [`builder`]  | `ManagerBuilder` — validates config before building   |
//! | [`observer`] | `ManagerObserver`, `NoopObserver`                     |
//! | [`stats`]    | `ManagerStats`, `StatsSnapshot`                       |
//! | [`error`]    | `ManagerError`, `ManagerResult<T>`                    |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use wm_agent::{ChannelPlan, InMemoryNetwork};
//! use wm_manager::ManagerBuilder;
//!
//! let net     = Arc::new(InMemoryNetwork::new());
//! let manager = Arc::new(ManagerBuilder::for_network(Arc::clone(&net))
//!     .channel_plan(ChannelPlan::lab_default())
//!     .build()?);
//! let task = Arc::clone(&manager).start(net.as_ref()).await?;
//! ```

pub mod builder;
pub mod error;
pub mod manager;
pub mod observer;
pub mod stats;


pub use builder::ManagerBuilder;
pub use error::{ManagerError, ManagerResult};
pub use manager::{CLIENT_QUEUE_DEPTH, MobilityManager, Outcome};
pub use observer::{ManagerObserver, NoopObserver};
pub use stats::{ManagerStats, StatsSnapshot};
