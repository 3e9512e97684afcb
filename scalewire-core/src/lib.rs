//! # scalewire-core
//!
//! Core protocol implementation for electronic weighing scales.
//!
//! This crate provides the low-level protocol primitives:
//! - Vendor protocol definitions (Toledo, Filizola)
//! - Weight field extraction and decoding
//! - Fixed-point weights and sentinel conditions
//! - Protocol constants

pub mod codec;
pub mod constants;
pub mod error;
pub mod protocol;
pub mod weight;

pub use error::{Error, Result};
pub use protocol::Protocol;
pub use weight::{Sentinel, Weight};
