//! # Keyhold Node
//!
//! HTTP front end for the Keyhold credential service.
//!
//! The node is thin plumbing around [`keyhold_credentials`]: it decodes
//! JSON bodies, runs enrollment and authentication on blocking worker
//! threads, and collapses every login failure into one generic response.
//!
//! ## Quick Start
//!
//! ```bash
//! cargo run --bin keyhold-node -- --api-addr 127.0.0.1:8080
//! ```
//!
//! ## Modules
//!
//! - [`api`] - Register, login, health, and metrics endpoints
//! - [`config`] - Layered node configuration (file, environment, flags)
//! - [`observability`] - Structured logging, request IDs, Prometheus metrics
//!
//! ## Example: Creating a router
//!
//! ```rust,no_run
//! use keyhold_credentials::HasherConfig;
//! use keyhold_node::api::{create_router, AppState};
//!
//! let state = AppState::new(HasherConfig::default()).unwrap();
//! let app = create_router(state);
//! ```

pub mod api;
pub mod config;
pub mod observability;
