//! Command implementations.

mod clean;
mod context;
mod ingest;
mod push;
mod refresh;
mod schedule;
mod validate;

pub use clean::run_clean;
pub use ingest::run_ingest;
pub use push::run_push;
pub use refresh::run_refresh_credentials;
pub use schedule::run_schedule;
pub use validate::run_validate;
