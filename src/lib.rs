// ABOUTME: Main library entry point for the transactions API
// ABOUTME: Token authentication boundary plus the user RPCs and HTTP gateway built on it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Transactions API
//!
//! Banking service core: users sign in, receive a short-lived bearer token
//! and present it on every later call.
//!
//! ## Architecture
//!
//! - **Token**: the [`token::TokenMaker`] capability with signed (JWT) and
//!   sealed (AES-256-GCM) implementations
//! - **Server**: RPC composition and bearer authorization
//! - **Store**: user persistence behind an async trait
//! - **Worker**: background task distribution
//! - **Routes**: `axum` JSON gateway
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use transactions_api::config::ServerConfig;
//! use transactions_api::errors::AppResult;
//! use transactions_api::server::Server;
//! use transactions_api::store::MemoryStore;
//!
//! fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     let server = Server::new(config, Arc::new(MemoryStore::new()), None)?;
//!     println!("token maker: {}", server.token_maker().kind());
//!     Ok(())
//! }
//! ```

/// Environment-driven configuration
pub mod config;

/// Application constants
pub mod constants;

/// Unified error handling
pub mod errors;

/// Structured logging setup
pub mod logging;

/// Users and roles
pub mod models;

/// bcrypt password hashing
pub mod password;

/// HTTP gateway routes
pub mod routes;

/// RPC server
pub mod server;

/// User persistence
pub mod store;

/// Access token creation and verification
pub mod token;

/// Request field validation
pub mod validation;

/// Background tasks
pub mod worker;
