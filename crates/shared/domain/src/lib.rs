//! # Domain Models
//!
//! Plain configuration types shared by the engine, the storage adapters and the logger.
//! Only `serde` is allowed here: no I/O, no tracing, no engine logic.

pub mod config;
