//! # Ingestion
//!
//! Grid submission write path.
//!
//! Responsibilities:
//! - Decode untyped submissions into `GridPayload` (strict schema)
//! - Validate grid and node identifiers
//! - Replace the grid's staged membership and per-node readings
//!
//! ## Usage Example
//!
//! ```ignore
//! use contracts::KeyScheme;
//! use ingestion::Ingestor;
//! use staging::MemoryStagingStore;
//!
//! let store = MemoryStagingStore::default();
//! let ingestor = Ingestor::new(&store, KeyScheme::default());
//! ingestor
//!     .ingest_json("site-1", r#"{"data":[{"node_id":"A","value":"10"}]}"#)
//!     .await?;
//! ```

mod error;
mod ingestor;

// Re-exports
pub use contracts::{GridPayload, NodeReport};
pub use error::{IngestionError, Result};
pub use ingestor::{decode_payload, decode_payload_value, IngestReport, Ingestor};
