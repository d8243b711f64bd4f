//! # Observability Module
//!
//! - **Structured Logging**: pretty or JSON logs via `tracing-subscriber`
//! - **Request Tracing**: request ID propagation across every handler
//! - **Prometheus Metrics**: HTTP traffic and credential outcomes
//!
//! ## Usage
//!
//! ```rust,ignore
//! use axum::Router;
//! use keyhold_node::observability::{
//!     init_logging, metrics_middleware, request_id_middleware, LogFormat, MetricsState,
//! };
//!
//! init_logging("info", LogFormat::Json);
//! let metrics = MetricsState::new();
//!
//! let app: Router<()> = Router::new()
//!     .layer(axum::middleware::from_fn_with_state(metrics, metrics_middleware))
//!     .layer(axum::middleware::from_fn(request_id_middleware));
//! ```

mod logging;
mod metrics;
pub mod middleware;

pub use logging::{init_logging, LogFormat};
pub use metrics::{AuthLabels, EnrollFailureLabels, HttpLabels, MetricsState};
pub use middleware::{
    metrics_handler, metrics_middleware, request_id_middleware, RequestId, REQUEST_ID_HEADER,
};
