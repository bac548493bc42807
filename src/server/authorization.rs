// ABOUTME: Bearer token authorization for RPCs that require a signed-in caller
// ABOUTME: Every token failure surfaces as one uniform error; the specific cause is only logged
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::Server;
use crate::constants::auth::{AUTHORIZATION_BEARER, AUTHORIZATION_HEADER};
use crate::errors::{AppError, AppResult};
use crate::logging::AuditLog;
use crate::models::Role;
use crate::token::Payload;
use axum::http::HeaderMap;

const INVALID_FORMAT: &str = "invalid authorization header format";

/// Split `authorization` into scheme and credential
fn parse_bearer(value: &str) -> AppResult<&str> {
    let mut fields = value.split_whitespace();
    let (Some(scheme), Some(token), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(AppError::auth_invalid(INVALID_FORMAT));
    };

    if !scheme.eq_ignore_ascii_case(AUTHORIZATION_BEARER) {
        return Err(AppError::auth_invalid(format!(
            "unsupported authorization type {scheme}"
        )));
    }
    Ok(token)
}

impl Server {
    /// Authenticate the caller and check their role
    ///
    /// Returns the verified payload for ownership checks further down.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the authorization header is missing (`AUTH_REQUIRED`)
    /// - the header is malformed, uses another scheme or the token does not
    ///   verify (`AUTH_INVALID`)
    /// - the token's role is not in `accepted_roles` (`PERMISSION_DENIED`)
    #[tracing::instrument(skip(self, headers), fields(username = tracing::field::Empty))]
    pub fn authorize_user(&self, headers: &HeaderMap, accepted_roles: &[Role]) -> AppResult<Payload> {
        let value = headers
            .get(AUTHORIZATION_HEADER)
            .ok_or_else(|| AppError::auth_required().with_details(serde_json::json!({
                "header": AUTHORIZATION_HEADER,
            })))?
            .to_str()
            .map_err(|_| AppError::auth_invalid(INVALID_FORMAT))?;

        let token = parse_bearer(value)?;

        let payload = self.token_maker.verify_token(token).map_err(|e| {
            AuditLog::token_rejected(e.kind());
            tracing::debug!(error = %e, "Access token verification failed");
            AppError::auth_invalid("invalid access token")
        })?;
        tracing::Span::current().record("username", payload.identity());

        let permitted = payload
            .role()
            .parse::<Role>()
            .is_ok_and(|role| accepted_roles.contains(&role));
        if !permitted {
            AuditLog::policy_violation("role_not_permitted", payload.identity(), payload.role());
            return Err(AppError::permission_denied("permission denied"));
        }

        Ok(payload)
    }
}
