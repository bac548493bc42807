// ABOUTME: RPC server composition: configuration, store, token maker and task distributor
// ABOUTME: Builds the configured token maker once and shares it across every handler
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Transactions API server
//!
//! [`Server`] owns the long-lived collaborators of every RPC. The token maker
//! is built from configuration in [`Server::new`]; a bad key stops the
//! process there instead of failing the first login.

/// Bearer token authorization
pub mod authorization;
/// User account RPCs
pub mod users;

pub use users::{
    CreateUserRequest, CreateUserResponse, LoginUserRequest, LoginUserResponse,
    UpdateUserRequest, UpdateUserResponse,
};

use crate::config::ServerConfig;
use crate::errors::{AppError, AppResult};
use crate::store::Store;
use crate::token::{build_token_maker, TokenMaker};
use crate::worker::TaskDistributor;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// Serves the transactions API RPCs
pub struct Server {
    config: ServerConfig,
    store: Arc<dyn Store>,
    token_maker: Arc<dyn TokenMaker>,
    task_distributor: Option<Arc<dyn TaskDistributor>>,
    password_cost: u32,
}

impl Server {
    /// Create a server, building the token maker named by `config`
    ///
    /// Without a task distributor, user creation skips the verification
    /// email task.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the token maker rejects the
    /// configured symmetric key
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn Store>,
        task_distributor: Option<Arc<dyn TaskDistributor>>,
    ) -> AppResult<Self> {
        let token_maker =
            build_token_maker(config.token.maker, config.token.symmetric_key.expose()).map_err(
                |e| AppError::config(format!("cannot create token maker: {e}")).with_source(e),
            )?;

        tracing::info!(
            token_maker = %token_maker.kind(),
            task_distribution = task_distributor.is_some(),
            "Server initialized"
        );

        Ok(Self {
            config,
            store,
            token_maker,
            task_distributor,
            password_cost: bcrypt::DEFAULT_COST,
        })
    }

    /// Replace the token maker, e.g. with one driven by a manual clock
    #[must_use]
    pub fn with_token_maker(mut self, token_maker: Arc<dyn TokenMaker>) -> Self {
        self.token_maker = token_maker;
        self
    }

    /// Override the bcrypt cost used for new password hashes
    #[must_use]
    pub const fn with_password_cost(mut self, cost: u32) -> Self {
        self.password_cost = cost;
        self
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Shared token maker
    #[must_use]
    pub fn token_maker(&self) -> Arc<dyn TokenMaker> {
        Arc::clone(&self.token_maker)
    }

    /// Shared user store
    #[must_use]
    pub fn store(&self) -> Arc<dyn Store> {
        Arc::clone(&self.store)
    }
}

impl Debug for Server {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("token_maker", &self.token_maker)
            .field("task_distribution", &self.task_distributor.is_some())
            .finish_non_exhaustive()
    }
}
