//! Handoff policy configuration.

use std::time::Duration;

use crate::{CoreError, CoreResult};

/// Default dwell time after an assignment before a new handoff is considered.
pub const DEFAULT_HYSTERESIS_MS: u64 = 30_000;

/// Default silence after which a client is treated as idle and force-reassigned.
pub const DEFAULT_IDLE_CLIENT_MS: u64 = 180_000;

/// Default per-probe scan timeout.
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 100;

/// Default bound on a single controller call (client lookup, handoff attempt).
pub const DEFAULT_CONTROLLER_TIMEOUT_MS: u64 = 1_000;

/// Tunables of the handoff decision policy.
///
/// Typically built with `PolicyConfig::default()` and adjusted field by field,
/// or deserialized by the application (with the `serde` feature).  Always
/// pass it through [`validate`](Self::validate) before use; the manager
/// builder does this for you and refuses to start otherwise.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PolicyConfig {
    /// Minimum time (ms) between an assignment and the next signal-driven
    /// handoff.
    pub hysteresis_ms: u64,

    /// A client silent for longer than this (ms) is reassigned on its next
    /// event regardless of hysteresis.  Must exceed `hysteresis_ms`.
    pub idle_client_ms: u64,

    /// How many dB a candidate must beat the serving agent by.  Zero means
    /// "at least as strong".
    pub signal_margin: i32,

    /// Upper bound (ms) on each scan probe.
    pub probe_timeout_ms: u64,

    /// Upper bound (ms) on each controller call: the registry lookup and
    /// every handoff attempt.  A call that overruns counts as failed.
    pub controller_timeout_ms: u64,

    /// Immediate re-dispatches after a failed handoff.
    pub handoff_retries: u32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            hysteresis_ms:         DEFAULT_HYSTERESIS_MS,
            idle_client_ms:        DEFAULT_IDLE_CLIENT_MS,
            signal_margin:         0,
            probe_timeout_ms:      DEFAULT_PROBE_TIMEOUT_MS,
            controller_timeout_ms: DEFAULT_CONTROLLER_TIMEOUT_MS,
            handoff_retries:       1,
        }
    }
}

impl PolicyConfig {
    /// Reject configurations the policy cannot run with.
    ///
    /// # Errors
    ///
    /// [`CoreError::Config`] when the idle threshold does not exceed the
    /// hysteresis threshold, the signal margin is negative, or either
    /// timeout is zero.
    pub fn validate(&self) -> CoreResult<()> {
        if self.idle_client_ms <= self.hysteresis_ms {
            return Err(CoreError::Config(format!(
                "idle_client_ms ({}) must be greater than hysteresis_ms ({})",
                self.idle_client_ms, self.hysteresis_ms
            )));
        }
        if self.signal_margin < 0 {
            return Err(CoreError::Config(format!(
                "signal_margin must not be negative (got {})",
                self.signal_margin
            )));
        }
        if self.probe_timeout_ms == 0 {
            return Err(CoreError::Config("probe_timeout_ms must be non-zero".into()));
        }
        if self.controller_timeout_ms == 0 {
            return Err(CoreError::Config("controller_timeout_ms must be non-zero".into()));
        }
        Ok(())
    }

    #[inline]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    #[inline]
    pub fn controller_timeout(&self) -> Duration {
        Duration::from_millis(self.controller_timeout_ms)
    }
}
