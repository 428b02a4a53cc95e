//! Telemetry time model.
//!
//! Time is an absolute millisecond counter carried by every telemetry event.
//! The decision core never reads a wall clock itself: all hysteresis and
//! idle arithmetic is done on event timestamps, which keeps the policy
//! deterministic and testable.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch (or any fixed origin shared by all
/// events of one deployment).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    /// Current wall-clock time.  Only event sources call this; the policy
    /// works purely on the timestamps it is handed.
    pub fn now() -> Self {
        let ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Timestamp(ms)
    }

    /// Milliseconds elapsed from `earlier` to `self`.
    ///
    /// Saturates at zero for out-of-order events, so a late event never looks
    /// like a very long gap.
    #[inline]
    pub fn since(self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}
