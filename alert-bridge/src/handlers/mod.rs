//! HTTP handlers for alert-bridge.

pub mod alert;
pub mod health;
pub mod metrics;

pub use alert::receive_alert;
pub use health::health_check;
pub use self::metrics::metrics_endpoint;
