//! Key-value store abstraction.
//!
//! This crate defines the `KvStore` trait the synchronizer writes through,
//! plus the backends it can be pointed at:
//!
//! - `MemoryStore` - Process-local map (tests, dry runs)
//! - `RestStore` - Upstash-compatible REST endpoint with a bearer token
//! - `RedisStore` - Native Redis protocol
//!
//! Only plain string keys and values cross this boundary; records are
//! serialized by the caller.

mod error;
mod memory;
mod redis;
mod rest;
mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use redis::RedisStore;
pub use rest::RestStore;
pub use traits::KvStore;
