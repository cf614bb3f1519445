//! Database bootstrap layer.
//!
//! This module provides:
//! - Connection parameter resolution from overrides and the environment
//! - The connection factory that owns the single shared pool
//! - Transaction mode descriptors
//! - Column decoding rules

pub mod params;
pub mod pool;
pub mod transaction;
pub mod types;

pub use params::{ConnectionOverrides, ConnectionParameters};
pub use pool::ConnectionFactory;
pub use transaction::{IsolationLevel, SERIAL_MODE, TransactionMode};
pub use types::{NumericF64, RawDate, RowToJson};
