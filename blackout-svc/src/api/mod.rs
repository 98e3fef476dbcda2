//! HTTP API handlers for blackout-svc

pub mod address;
pub mod blackout;
pub mod error;
pub mod health;

pub use address::{list_districts, search_addresses};
pub use blackout::{blackouts_by_building, list_blackouts};
pub use error::{ApiError, ApiResult};
pub use health::health_routes;
