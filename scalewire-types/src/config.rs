//! Connection configuration
//!
//! Owned by the caller and handed to a scale session. Can be built in code or
//! loaded from TOML:
//!
//! ```toml
//! protocol = "filizola"
//! monitoring = true
//! monitor_delay_ms = 250
//!
//! [transport]
//! kind = "tcp"
//! host = "10.0.0.40"
//! port = 4001
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use scalewire_core::Protocol;
use scalewire_core::constants::{
    DEFAULT_BAUD_RATE, DEFAULT_CONNECT_TIMEOUT, DEFAULT_MONITOR_DELAY_MS, DEFAULT_READ_TIMEOUT_MS,
    DEFAULT_TCP_PORT,
};

use crate::error::{Error, Result};

/// Serial link settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Port name (`/dev/ttyUSB0`, `COM3`)
    pub port: String,

    /// Baud rate
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// How long a read waits for the first byte (milliseconds)
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,

    /// Hardware handshake on open (RTS/CTS). Always cleared on connect.
    #[serde(default)]
    pub port_control: bool,
}

impl SerialConfig {
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            port_control: false,
        }
    }

    /// Set baud rate
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Set read timeout
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

/// Network link settings (serial-to-ethernet adapters, networked scales)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TcpConfig {
    pub host: String,

    #[serde(default = "default_tcp_port")]
    pub port: u16,

    /// Connect timeout (milliseconds)
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// How long a read waits for the first byte (milliseconds)
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

impl TcpConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT * 1000,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }

    /// Set connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set read timeout
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

/// Transport selection, discriminated by `kind`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TransportConfig {
    Serial(SerialConfig),
    Tcp(TcpConfig),
}

impl TransportConfig {
    /// Serial link with default settings
    pub fn serial(port: impl Into<String>) -> Self {
        Self::Serial(SerialConfig::new(port))
    }

    /// TCP link with default settings
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self::Tcp(TcpConfig::new(host, port))
    }

    /// Turn off any handshake that would hold the line on open
    ///
    /// Scale links are free-running.
    pub fn disable_port_control(&mut self) {
        if let Self::Serial(serial) = self {
            serial.port_control = false;
        }
    }

    /// Transport kind name
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Serial(_) => "serial",
            Self::Tcp(_) => "tcp",
        }
    }

    /// Check settings for obviously unusable values
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Serial(serial) => {
                if serial.port.trim().is_empty() {
                    return Err(Error::Validation("serial port name is empty".into()));
                }
                if serial.baud_rate == 0 {
                    return Err(Error::Validation("baud rate must be positive".into()));
                }
            }
            Self::Tcp(tcp) => {
                if tcp.host.trim().is_empty() {
                    return Err(Error::Validation("host is empty".into()));
                }
                if tcp.port == 0 {
                    return Err(Error::Validation("port must be positive".into()));
                }
            }
        }
        Ok(())
    }
}

/// Everything needed to connect to a scale and drive monitoring
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub transport: TransportConfig,

    /// Vendor protocol. Locked while a session is connected.
    #[serde(default)]
    pub protocol: Protocol,

    /// Background polling enabled
    #[serde(default)]
    pub monitoring: bool,

    /// Delay between background polls (milliseconds)
    #[serde(default = "default_monitor_delay_ms")]
    pub monitor_delay_ms: u64,
}

impl ConnectionConfig {
    pub fn new(transport: TransportConfig) -> Self {
        Self {
            transport,
            protocol: Protocol::default(),
            monitoring: false,
            monitor_delay_ms: DEFAULT_MONITOR_DELAY_MS,
        }
    }

    /// Set vendor protocol
    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Enable or disable background polling
    pub fn with_monitoring(mut self, monitoring: bool) -> Self {
        self.monitoring = monitoring;
        self
    }

    /// Set delay between background polls
    pub fn with_monitor_delay(mut self, delay: Duration) -> Self {
        self.monitor_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn monitor_delay(&self) -> Duration {
        Duration::from_millis(self.monitor_delay_ms)
    }

    /// Parse and validate a TOML document
    ///
    /// Unknown vendor names are rejected here.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.transport.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_read_timeout_ms() -> u64 {
    DEFAULT_READ_TIMEOUT_MS
}

fn default_tcp_port() -> u16 {
    DEFAULT_TCP_PORT
}

fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT * 1000
}

fn default_monitor_delay_ms() -> u64 {
    DEFAULT_MONITOR_DELAY_MS
}
