//! Blockpress: transparent block compression and transaction deduplication
//! for ledger serialization.
//!
//! The crate provides:
//! - A run-length byte codec and an XOR delta codec (`codec`)
//! - A self-describing block container format (`container`)
//! - Content-addressed transaction deduplication (`dedup`)
//! - The `Engine` tying them to configuration and statistics (`engine`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! use blockpress::engine::{Engine, EngineConfig};
//!
//! let engine = Engine::with_config(EngineConfig::enabled(6));
//!
//! let tx = b"\x01\x00\x00\x00\x00\x00\x00\x00pay alice 10".to_vec();
//! let first = engine.compress_transaction(&tx).unwrap();
//! let second = engine.compress_transaction(&tx).unwrap();
//! assert_eq!(second.len(), 33);
//! assert_eq!(engine.decompress_transaction(&first).unwrap(), tx);
//! assert_eq!(engine.decompress_transaction(&second).unwrap(), tx);
//! ```

pub mod codec;
pub mod container;
pub mod dedup;
pub mod engine;
pub mod io;
pub mod stats;

#[cfg(feature = "cli")]
pub mod cli;

pub use engine::{Engine, EngineConfig, Error};
pub use stats::CompressionStats;
