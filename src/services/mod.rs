//! Network services for driving the car over HTTP.
//!
//! This module is enabled by the `web` feature:
//! - `shared`: [`SharedCar`], the mutex-wrapped car every handler uses
//! - `api`: JSON response types
//! - `web`: Axum router and server
//!
//! # Shared State Pattern
//!
//! Handlers receive the car through router state rather than a global:
//!
//! ```ignore
//! use std::sync::Arc;
//! use m1_car::services::{build_router, SharedCar, WebServerConfig};
//!
//! let state = Arc::new(SharedCar::new(car));
//! let router = build_router(Arc::clone(&state), &WebServerConfig::default());
//! ```

pub mod api;
pub mod shared;
pub mod web;

pub use api::*;
pub use shared::*;
pub use web::*;
