//! # scalewire
//!
//! Driver for electronic weighing scales (Toledo and Filizola protocols) over
//! serial ports and TCP.
//!
//! ## Features
//!
//! - Async/await API using Tokio
//! - Manual reads with per-vendor stabilization
//! - Background monitoring with a broadcast event stream
//! - TOML connection settings
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use scalewire::{Scale, TransportConfig};
//!
//! #[tokio::main]
//! async fn main() -> scalewire::Result<()> {
//!     let mut scale = Scale::new(TransportConfig::serial("/dev/ttyUSB0"))
//!         .with_monitoring(true)
//!         .with_monitor_delay(Duration::from_millis(250));
//!
//!     let mut readings = scale.subscribe();
//!     scale.connect().await?;
//!
//!     for _ in 0..10 {
//!         if let Ok(reading) = readings.recv().await {
//!             println!("{}", reading);
//!         }
//!     }
//!
//!     scale.disconnect().await?;
//!     Ok(())
//! }
//! ```

pub mod error;
mod link;
pub mod monitor;
pub mod scale;

// Re-exports
pub use error::{Error, Result};
pub use monitor::{MonitorHandle, PollState};
pub use scale::Scale;

// Re-export types
pub use scalewire_core::{Protocol, Sentinel, Weight};
pub use scalewire_transport::Transport;
pub use scalewire_types::{ConnectionConfig, ReadError, ReadErrorKind, Reading, TransportConfig};
