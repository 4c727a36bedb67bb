//! Safety overrides
//!
//! Two independent monitors can force the rover to stop regardless of
//! what the host asked for: the range monitor (obstacle inside the
//! threshold for several consecutive samples) and the link watchdog
//! (no host traffic within the timeout).

pub mod range;
pub mod watchdog;

pub use range::{RangeMonitor, SafetyVerdict};
pub use watchdog::{Watchdog, WatchdogStatus};
