//! Transport layer for scale links
//!
//! Provides serial and TCP byte streams to the scale.

pub mod error;
pub mod serial;
pub mod tcp;

pub use error::{Error, Result};
pub use serial::SerialTransport;
pub use tcp::TcpTransport;

use async_trait::async_trait;
use bytes::BytesMut;

use scalewire_types::TransportConfig;

/// Transport trait for different link types
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open the link
    async fn open(&mut self) -> Result<()>;

    /// Close the link
    async fn close(&mut self) -> Result<()>;

    /// Check if open
    fn is_connected(&self) -> bool;

    /// Discard anything received but not yet read
    async fn clear_input(&mut self) -> Result<()>;

    /// Send raw bytes
    async fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Read whatever has arrived
    ///
    /// Waits up to the configured read timeout for the first byte. Returns an empty
    /// buffer if nothing arrived.
    async fn read(&mut self) -> Result<BytesMut>;

    /// Get remote address (port name or host:port)
    fn remote_addr(&self) -> String;
}

/// Build an unopened transport for the given settings
pub fn from_config(config: &TransportConfig) -> Box<dyn Transport> {
    match config {
        TransportConfig::Serial(serial) => Box::new(SerialTransport::from_config(serial)),
        TransportConfig::Tcp(tcp) => Box::new(TcpTransport::from_config(tcp)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_serial() {
        let transport = from_config(&TransportConfig::serial("/dev/ttyUSB0"));
        assert_eq!(transport.remote_addr(), "/dev/ttyUSB0");
        assert!(!transport.is_connected());
    }

    #[test]
    fn test_from_config_tcp() {
        let transport = from_config(&TransportConfig::tcp("10.0.0.40", 9100));
        assert_eq!(transport.remote_addr(), "10.0.0.40:9100");
        assert!(!transport.is_connected());
    }
}
