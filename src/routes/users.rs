// ABOUTME: JSON gateway for the user account RPCs
// ABOUTME: Maps POST/PATCH endpoints onto Server::login_user, create_user and update_user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::AppResult;
use crate::server::{
    CreateUserRequest, CreateUserResponse, LoginUserRequest, LoginUserResponse, Server,
    UpdateUserRequest, UpdateUserResponse,
};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::{patch, post};
use axum::{Json, Router};
use std::sync::Arc;

/// User account routes
pub struct UserRoutes;

impl UserRoutes {
    /// Create the `/v1` user routes
    pub fn routes(server: Arc<Server>) -> Router {
        Router::new()
            .route("/v1/login_user", post(Self::handle_login_user))
            .route("/v1/create_user", post(Self::handle_create_user))
            .route("/v1/update_user", patch(Self::handle_update_user))
            .with_state(server)
    }

    async fn handle_login_user(
        State(server): State<Arc<Server>>,
        Json(request): Json<LoginUserRequest>,
    ) -> AppResult<Json<LoginUserResponse>> {
        Ok(Json(server.login_user(request).await?))
    }

    async fn handle_create_user(
        State(server): State<Arc<Server>>,
        Json(request): Json<CreateUserRequest>,
    ) -> AppResult<Json<CreateUserResponse>> {
        Ok(Json(server.create_user(request).await?))
    }

    async fn handle_update_user(
        State(server): State<Arc<Server>>,
        headers: HeaderMap,
        Json(request): Json<UpdateUserRequest>,
    ) -> AppResult<Json<UpdateUserResponse>> {
        Ok(Json(server.update_user(&headers, request).await?))
    }
}
