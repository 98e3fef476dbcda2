//! Structural and weather database schema helpers
//!
//! The production stores are maintained by the ingestion pipeline; the
//! services only ever read them. The DDL here mirrors that layout so tests and
//! local development can build compatible databases.

pub mod fixtures;
pub mod init;

pub use init::{init_database, init_weather_database};
