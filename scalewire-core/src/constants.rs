//! Protocol constants

use std::time::Duration;

/// ENQ: asks the scale for its current weight
pub const REQUEST_WEIGHT: u8 = 0x05;

/// Firmware latency between a weight request and a readable reply
pub const SETTLE_TIME: Duration = Duration::from_millis(200);

/// Ceiling for waiting on a stable (non-`IIIII`) reading
pub const STABLE_WAIT: Duration = Duration::from_secs(3);

/// Default delay between background polls (milliseconds)
pub const DEFAULT_MONITOR_DELAY_MS: u64 = 200;

/// Default serial baud rate
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default TCP port for serial-to-ethernet scale adapters
pub const DEFAULT_TCP_PORT: u16 = 9100;

/// Default transport read timeout (milliseconds)
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 500;

/// Default TCP connect timeout (seconds)
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 5;

/// Sentinel field contents, one repeated character per condition
pub mod fields {
    /// Scale not stable
    pub const UNSTABLE: char = 'I';

    /// Negative weight
    pub const NEGATIVE: char = 'N';

    /// Overload
    pub const OVERLOAD: char = 'S';
}
