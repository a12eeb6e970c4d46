//! Response bodies that are not plain statement rows.

pub mod health_response;

pub use health_response::HealthResponse;
