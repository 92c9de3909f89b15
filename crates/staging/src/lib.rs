//! # Staging
//!
//! Backends of the transient staging store.
//!
//! - [`MemoryStagingStore`]: in-process, deterministic ordering, used by tests
//!   and embedded setups
//! - [`RedisStagingStore`]: shared redis server, used by the relay binary
//!
//! Both implement [`contracts::StagingStore`] with the same set/hash semantics.

mod memory;
mod pattern;
mod redis_store;

pub use contracts::StagingStore;
pub use memory::MemoryStagingStore;
pub use pattern::glob_match;
pub use redis_store::RedisStagingStore;
