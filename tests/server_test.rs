// ABOUTME: Integration tests for server composition, authorization and the user RPCs
// ABOUTME: Exercises login, sign-up, profile updates and the uniform invalid-token response
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use axum::http::HeaderMap;
use chrono::Duration;
use common::{bearer, create_test_server, seed_user, test_config, token_for, PASSWORD, SECRET};
use std::sync::Arc;
use transactions_api::{
    constants::tasks,
    errors::ErrorCode,
    models::Role,
    server::{CreateUserRequest, LoginUserRequest, Server, UpdateUserRequest},
    store::{MemoryStore, Store},
    token::TokenMakerKind,
    worker::PayloadSendVerifyEmail,
};

fn create_request(username: &str) -> CreateUserRequest {
    CreateUserRequest {
        username: username.to_owned(),
        full_name: "Alice Doe".to_owned(),
        email: format!("{username}@example.com"),
        password: PASSWORD.to_owned(),
    }
}

fn login_request(username: &str, password: &str) -> LoginUserRequest {
    LoginUserRequest {
        username: username.to_owned(),
        password: password.to_owned(),
    }
}

// ============================================================================
// Composition
// ============================================================================

#[test]
fn test_server_new_rejects_bad_key() {
    common::init_test_logging();
    let config = test_config(TokenMakerKind::Sealed, &SECRET[..31]);
    let err = Server::new(config, Arc::new(MemoryStore::new()), None).unwrap_err();

    assert_eq!(err.code, ErrorCode::ConfigError);
    assert!(err.message.starts_with("cannot create token maker"));
    assert!(err.source.is_some());
}

#[test]
fn test_server_new_builds_configured_maker() {
    for kind in common::ALL_KINDS {
        let server = Server::new(test_config(kind, SECRET), Arc::new(MemoryStore::new()), None)
            .unwrap();
        assert_eq!(server.token_maker().kind(), kind);
        assert_eq!(server.config().token.maker, kind);
    }
}

// ============================================================================
// create_user
// ============================================================================

#[tokio::test]
async fn test_create_user_enqueues_verify_email() {
    let mut ctx = create_test_server(TokenMakerKind::Sealed);

    let response = ctx.server.create_user(create_request("alice")).await.unwrap();
    assert_eq!(response.user.username, "alice");
    assert_eq!(response.user.role, Role::Depositor);

    let stored = ctx.store.get_user("alice").await.unwrap();
    assert_ne!(stored.hashed_password, PASSWORD);
    assert!(!stored.is_email_verified);

    let task = ctx.tasks.try_recv().expect("verify email task should be queued");
    assert_eq!(task.task_type, tasks::SEND_VERIFY_EMAIL);
    assert_eq!(task.options.queue, tasks::QUEUE_CRITICAL);
    assert_eq!(task.options.max_retry, 10);
    assert_eq!(task.options.process_in, Duration::seconds(10));
    let payload: PayloadSendVerifyEmail = serde_json::from_slice(&task.payload).unwrap();
    assert_eq!(payload.username, "alice");
}

#[tokio::test]
async fn test_create_user_without_distributor() {
    common::init_test_logging();
    let store = Arc::new(MemoryStore::new());
    let server = Server::new(
        test_config(TokenMakerKind::Jwt, SECRET),
        Arc::clone(&store) as Arc<dyn Store>,
        None,
    )
    .unwrap()
    .with_password_cost(common::TEST_BCRYPT_COST);

    server.create_user(create_request("alice")).await.unwrap();
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_create_user_duplicate() {
    let mut ctx = create_test_server(TokenMakerKind::Sealed);
    ctx.server.create_user(create_request("alice")).await.unwrap();
    assert!(ctx.tasks.try_recv().is_some());

    let err = ctx
        .server
        .create_user(create_request("alice"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceAlreadyExists);
    assert!(ctx.tasks.try_recv().is_none());
}

#[tokio::test]
async fn test_create_user_reports_every_invalid_field() {
    let ctx = create_test_server(TokenMakerKind::Sealed);
    let err = ctx
        .server
        .create_user(CreateUserRequest {
            username: "A!".to_owned(),
            full_name: "12".to_owned(),
            email: "not-an-email".to_owned(),
            password: "123".to_owned(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidInput);
    for field in ["username", "full_name", "email", "password"] {
        assert!(err.details.get(field).is_some(), "missing violation for {field}");
    }
    assert!(ctx.store.is_empty());
}

// ============================================================================
// login_user
// ============================================================================

#[tokio::test]
async fn test_login_issues_verifiable_token() {
    for kind in common::ALL_KINDS {
        let ctx = create_test_server(kind);
        seed_user(&ctx.store, "alice", Role::Depositor).await;

        let response = ctx
            .server
            .login_user(login_request("alice", PASSWORD))
            .await
            .unwrap();
        assert_eq!(response.user.username, "alice");

        let payload = ctx
            .server
            .token_maker()
            .verify_token(&response.access_token)
            .unwrap();
        assert_eq!(payload.identity(), "alice");
        assert_eq!(payload.role(), "depositor");
        assert_eq!(payload.expires_at(), response.access_token_expires_at);
        assert_eq!(
            payload.expires_at() - payload.issued_at(),
            ctx.server.config().token.access_token_duration
        );
    }
}

#[tokio::test]
async fn test_login_failures() {
    let ctx = create_test_server(TokenMakerKind::Sealed);
    seed_user(&ctx.store, "alice", Role::Depositor).await;

    let err = ctx
        .server
        .login_user(login_request("bob", PASSWORD))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    let err = ctx
        .server
        .login_user(login_request("alice", "wrong-password"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthInvalid);

    let err = ctx
        .server
        .login_user(login_request("alice", "123"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

// ============================================================================
// authorize_user
// ============================================================================

#[tokio::test]
async fn test_authorize_user_returns_payload() {
    let ctx = create_test_server(TokenMakerKind::Sealed);
    let token = token_for(&ctx.server, "alice", Role::Depositor);

    let payload = ctx
        .server
        .authorize_user(&bearer(&token), &[Role::Depositor, Role::Banker])
        .unwrap();
    assert_eq!(payload.identity(), "alice");

    let mut lowercase = HeaderMap::new();
    lowercase.insert("authorization", format!("bearer {token}").parse().unwrap());
    assert!(ctx
        .server
        .authorize_user(&lowercase, &[Role::Depositor])
        .is_ok());
}

#[tokio::test]
async fn test_authorize_user_header_errors() {
    let ctx = create_test_server(TokenMakerKind::Sealed);
    let token = token_for(&ctx.server, "alice", Role::Depositor);

    let err = ctx
        .server
        .authorize_user(&HeaderMap::new(), &[Role::Depositor])
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthRequired);

    for value in [token.clone(), format!("Basic {token}"), format!("Bearer {token} extra")] {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", value.parse().unwrap());
        let err = ctx
            .server
            .authorize_user(&headers, &[Role::Depositor])
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthInvalid);
    }
}

#[tokio::test]
async fn test_token_failures_are_indistinguishable() {
    let ctx = create_test_server(TokenMakerKind::Jwt);
    let token = token_for(&ctx.server, "alice", Role::Depositor);

    let forged = common::maker_with_clock(
        TokenMakerKind::Jwt,
        common::OTHER_SECRET,
        Arc::clone(&ctx.clock),
    )
    .create_token("alice", "banker", Duration::minutes(15))
    .unwrap()
    .0;
    let garbage = "definitely-not-a-token".to_owned();

    ctx.clock.advance(Duration::minutes(16));
    let expired = token;

    let messages: Vec<String> = [expired, forged, garbage]
        .iter()
        .map(|t| {
            let err = ctx
                .server
                .authorize_user(&bearer(t), &[Role::Depositor, Role::Banker])
                .unwrap_err();
            assert_eq!(err.code, ErrorCode::AuthInvalid);
            err.message
        })
        .collect();

    assert!(messages.iter().all(|m| m == "invalid access token"));
}

#[tokio::test]
async fn test_authorize_user_enforces_roles() {
    let ctx = create_test_server(TokenMakerKind::Sealed);

    let depositor = token_for(&ctx.server, "alice", Role::Depositor);
    let err = ctx
        .server
        .authorize_user(&bearer(&depositor), &[Role::Banker])
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    let unknown_role = ctx
        .server
        .token_maker()
        .create_token("mallory", "auditor", Duration::minutes(5))
        .unwrap()
        .0;
    let err = ctx
        .server
        .authorize_user(&bearer(&unknown_role), &[Role::Banker, Role::Depositor])
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
}

// ============================================================================
// update_user
// ============================================================================

#[tokio::test]
async fn test_depositor_updates_own_profile() {
    let ctx = create_test_server(TokenMakerKind::Sealed);
    seed_user(&ctx.store, "alice", Role::Depositor).await;
    let token = token_for(&ctx.server, "alice", Role::Depositor);

    let response = ctx
        .server
        .update_user(
            &bearer(&token),
            UpdateUserRequest {
                username: "alice".to_owned(),
                full_name: Some("Alice Smith".to_owned()),
                ..UpdateUserRequest::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(response.user.full_name, "Alice Smith");
    assert_eq!(response.user.email, "alice@example.com");
}

#[tokio::test]
async fn test_depositor_cannot_update_someone_else() {
    let ctx = create_test_server(TokenMakerKind::Sealed);
    seed_user(&ctx.store, "alice", Role::Depositor).await;
    seed_user(&ctx.store, "bob", Role::Depositor).await;
    let token = token_for(&ctx.server, "alice", Role::Depositor);

    let err = ctx
        .server
        .update_user(
            &bearer(&token),
            UpdateUserRequest {
                username: "bob".to_owned(),
                email: Some("owned@example.com".to_owned()),
                ..UpdateUserRequest::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
    assert_eq!(ctx.store.get_user("bob").await.unwrap().email, "bob@example.com");
}

#[tokio::test]
async fn test_banker_changes_password_for_depositor() {
    let ctx = create_test_server(TokenMakerKind::Jwt);
    let before = seed_user(&ctx.store, "bob", Role::Depositor).await;
    seed_user(&ctx.store, "carol", Role::Banker).await;
    let token = token_for(&ctx.server, "carol", Role::Banker);

    ctx.server
        .update_user(
            &bearer(&token),
            UpdateUserRequest {
                username: "bob".to_owned(),
                password: Some("new-password".to_owned()),
                ..UpdateUserRequest::default()
            },
        )
        .await
        .unwrap();

    let after = ctx.store.get_user("bob").await.unwrap();
    assert!(after.password_changed_at >= before.password_changed_at);
    assert_ne!(after.hashed_password, before.hashed_password);

    assert!(ctx
        .server
        .login_user(login_request("bob", "new-password"))
        .await
        .is_ok());
    let err = ctx
        .server
        .login_user(login_request("bob", PASSWORD))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthInvalid);
}

#[tokio::test]
async fn test_update_unknown_user_and_missing_auth() {
    let ctx = create_test_server(TokenMakerKind::Sealed);
    let banker = token_for(&ctx.server, "carol", Role::Banker);

    let err = ctx
        .server
        .update_user(
            &bearer(&banker),
            UpdateUserRequest {
                username: "ghost".to_owned(),
                full_name: Some("Nobody Here".to_owned()),
                ..UpdateUserRequest::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);

    let err = ctx
        .server
        .update_user(
            &HeaderMap::new(),
            UpdateUserRequest {
                username: "ghost".to_owned(),
                ..UpdateUserRequest::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AuthRequired);
}
