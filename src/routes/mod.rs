// ABOUTME: HTTP gateway route assembly for the transactions API
// ABOUTME: Exposes the user RPCs as JSON endpoints next to a health probe
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Route module for the HTTP gateway
//!
//! Handlers are thin: they extract JSON and headers, call the matching
//! [`Server`](crate::server::Server) RPC and let [`AppError`](crate::errors::AppError)
//! render failures.

/// Health check routes
pub mod health;
/// User account routes
pub mod users;

pub use health::HealthRoutes;
pub use users::UserRoutes;

use crate::server::Server;
use axum::Router;
use std::sync::Arc;

/// Build the complete gateway router
pub fn router(server: Arc<Server>) -> Router {
    Router::new()
        .merge(HealthRoutes::routes())
        .merge(UserRoutes::routes(server))
}
