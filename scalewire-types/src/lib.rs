//! Type definitions for scalewire

pub mod config;
pub mod error;
pub mod reading;

pub use config::{ConnectionConfig, TransportConfig};
pub use error::{Error, Result};
pub use reading::{ReadError, ReadErrorKind, Reading};
