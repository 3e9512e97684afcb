//! Serial transport
//!
//! Most scales hang off an RS-232 or USB-serial port and answer a single ENQ byte
//! with a short text frame.

use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;
use tokio_serial::{ClearBuffer, FlowControl, SerialPort, SerialPortBuilderExt, SerialStream};
use tracing::{debug, trace, warn};

use scalewire_core::constants::DEFAULT_READ_TIMEOUT_MS;
use scalewire_types::config::SerialConfig;

use crate::{error::*, Transport};

/// Serial transport backed by `tokio-serial`
pub struct SerialTransport {
    port_name: String,
    baud_rate: u32,
    read_timeout: Duration,
    port_control: bool,
    stream: Option<SerialStream>,
}

impl SerialTransport {
    /// Create new serial transport (8N1, no handshake)
    pub fn new(port_name: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port_name: port_name.into(),
            baud_rate,
            read_timeout: Duration::from_millis(DEFAULT_READ_TIMEOUT_MS),
            port_control: false,
            stream: None,
        }
    }

    pub fn from_config(config: &SerialConfig) -> Self {
        Self::new(config.port.clone(), config.baud_rate)
            .with_read_timeout(config.read_timeout())
            .with_port_control(config.port_control)
    }

    /// Set read timeout
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Use RTS/CTS handshake
    pub fn with_port_control(mut self, enabled: bool) -> Self {
        self.port_control = enabled;
        self
    }

    fn flow_control(&self) -> FlowControl {
        if self.port_control {
            FlowControl::Hardware
        } else {
            FlowControl::None
        }
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn open(&mut self) -> Result<()> {
        if self.is_connected() {
            return Err(Error::AlreadyConnected);
        }

        debug!(
            "Opening {} at {} baud (flow control: {:?})...",
            self.port_name,
            self.baud_rate,
            self.flow_control()
        );

        let stream = tokio_serial::new(&self.port_name, self.baud_rate)
            .flow_control(self.flow_control())
            .timeout(self.read_timeout)
            .open_native_async()?;

        debug!("Opened {}", self.port_name);

        self.stream = Some(stream);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            debug!("Closing {}...", self.port_name);

            let _ = stream.shutdown().await;
        }

        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn clear_input(&mut self) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        stream.clear(ClearBuffer::Input)?;

        Ok(())
    }

    async fn write(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        trace!("Sending {} bytes: {:02X?}", data.len(), &data[..data.len().min(16)]);

        stream.write_all(data).await?;
        stream.flush().await?;

        Ok(())
    }

    async fn read(&mut self) -> Result<BytesMut> {
        let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

        let mut buf = BytesMut::with_capacity(256);

        match timeout(self.read_timeout, stream.read_buf(&mut buf)).await {
            Ok(result) => {
                let n = result.map_err(Error::Io)?;
                trace!("Received {} bytes: {:02X?}", n, &buf[..n.min(16)]);
            }
            Err(_) => trace!("Nothing received within {:?}", self.read_timeout),
        }

        Ok(buf)
    }

    fn remote_addr(&self) -> String {
        self.port_name.clone()
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        if self.is_connected() {
            warn!("Serial transport dropped while still open");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scalewire_types::config::SerialConfig;

    #[test]
    fn test_serial_transport_create() {
        let transport = SerialTransport::new("/dev/ttyUSB0", 9600);
        assert!(!transport.is_connected());
        assert_eq!(transport.remote_addr(), "/dev/ttyUSB0");
    }

    #[test]
    fn test_default_timeout_matches_config_default() {
        let plain = SerialTransport::new("/dev/ttyUSB0", 9600);
        let configured = SerialTransport::from_config(&SerialConfig::new("/dev/ttyUSB0"));

        assert_eq!(plain.read_timeout, configured.read_timeout);
    }

    #[test]
    fn test_port_control_selects_flow_control() {
        let config = SerialConfig {
            port_control: true,
            ..SerialConfig::new("COM3")
        };

        let transport = SerialTransport::from_config(&config);
        assert_eq!(transport.flow_control(), FlowControl::Hardware);

        let transport = transport.with_port_control(false);
        assert_eq!(transport.flow_control(), FlowControl::None);
    }

    #[tokio::test]
    async fn test_open_missing_port_fails() {
        let mut transport = SerialTransport::new("/dev/scalewire-does-not-exist", 9600);

        let result = transport.open().await;
        assert!(result.is_err());
        assert!(!transport.is_connected());
    }

    #[tokio::test]
    async fn test_io_requires_open() {
        let mut transport = SerialTransport::new("/dev/ttyUSB0", 9600);

        assert!(matches!(transport.write(&[0x05]).await, Err(Error::NotConnected)));
        assert!(matches!(transport.read().await, Err(Error::NotConnected)));
        assert!(matches!(transport.clear_input().await, Err(Error::NotConnected)));
    }
}
