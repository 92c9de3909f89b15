//! # Contracts
//!
//! Frozen interface contracts shared by every relay crate: the staged data
//! model, the wire envelopes exchanged with the collection service, the
//! staging/durable store and remote traits, and the error taxonomy.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Key Model
//! - Grid membership lives under `grid:<grid_id>` (a set of node ids)
//! - The latest reading per node lives under `sensor:<node_id>` (a field map)

mod durable;
mod error;
mod keys;
mod reading;
mod relay_config;
mod remote;
mod staging;

pub use durable::*;
pub use error::*;
pub use keys::{KeyScheme, KEY_SEPARATOR};
pub use reading::*;
pub use relay_config::*;
pub use remote::*;
pub use staging::*;
