// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides deterministic token makers, a wired test server and user seeding helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `transactions_api`

use axum::http::{HeaderMap, HeaderValue};
use chrono::Duration;
use std::collections::HashMap;
use std::sync::{Arc, Once};
use transactions_api::{
    config::ServerConfig,
    models::{Role, User},
    password::hash_password_with_cost,
    server::Server,
    store::{CreateUserParams, MemoryStore, Store},
    token::{JwtMaker, ManualClock, SealedMaker, TokenMaker, TokenMakerKind},
    worker::{QueueTaskDistributor, TaskDistributor, TaskReceiver},
};

/// 32-byte secret accepted by both makers
pub const SECRET: &str = "0123456789abcdefghijklmnopqrstuv";
/// A different 32-byte secret
pub const OTHER_SECRET: &str = "vutsrqponmlkjihgfedcba9876543210";
/// Cheapest bcrypt cost, keeps tests fast
pub const TEST_BCRYPT_COST: u32 = 4;
/// Password given to every seeded user
pub const PASSWORD: &str = "secret-password";

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Build a config without touching the process environment
pub fn test_config(kind: TokenMakerKind, secret: &str) -> ServerConfig {
    let mut vars = HashMap::new();
    vars.insert("TOKEN_SYMMETRIC_KEY".to_owned(), secret.to_owned());
    vars.insert("TOKEN_MAKER".to_owned(), kind.to_string());
    vars.insert("ENVIRONMENT".to_owned(), "testing".to_owned());
    ServerConfig::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

/// Maker of `kind` keyed with `secret`, reading time from `clock`
pub fn maker_with_clock(
    kind: TokenMakerKind,
    secret: &str,
    clock: Arc<ManualClock>,
) -> Arc<dyn TokenMaker> {
    match kind {
        TokenMakerKind::Jwt => Arc::new(JwtMaker::new(secret).unwrap().with_clock(clock)),
        TokenMakerKind::Sealed => Arc::new(SealedMaker::new(secret).unwrap().with_clock(clock)),
    }
}

/// Both maker variants, for tests that must hold for each
pub const ALL_KINDS: [TokenMakerKind; 2] = [TokenMakerKind::Jwt, TokenMakerKind::Sealed];

/// Server wired to an in-memory store, a queue distributor and a manual clock
pub struct TestServer {
    pub server: Arc<Server>,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub tasks: TaskReceiver,
}

/// Build a [`TestServer`] using the `kind` token maker
pub fn create_test_server(kind: TokenMakerKind) -> TestServer {
    init_test_logging();

    let clock = Arc::new(ManualClock::starting_now());
    let store = Arc::new(MemoryStore::new());
    let (distributor, tasks) = QueueTaskDistributor::new();
    let distributor: Arc<dyn TaskDistributor> = Arc::new(distributor);

    let server = Server::new(
        test_config(kind, SECRET),
        Arc::clone(&store) as Arc<dyn Store>,
        Some(distributor),
    )
    .unwrap()
    .with_token_maker(maker_with_clock(kind, SECRET, Arc::clone(&clock)))
    .with_password_cost(TEST_BCRYPT_COST);

    TestServer {
        server: Arc::new(server),
        store,
        clock,
        tasks,
    }
}

/// Insert a user with [`PASSWORD`] directly into the store
pub async fn seed_user(store: &MemoryStore, username: &str, role: Role) -> User {
    store
        .create_user(CreateUserParams {
            username: username.to_owned(),
            role,
            hashed_password: hash_password_with_cost(PASSWORD, TEST_BCRYPT_COST).unwrap(),
            full_name: "Test User".to_owned(),
            email: format!("{username}@example.com"),
        })
        .await
        .unwrap()
}

/// Issue a token for `username` with `role` through the server's maker
pub fn token_for(server: &Server, username: &str, role: Role) -> String {
    server
        .token_maker()
        .create_token(username, role.as_str(), Duration::minutes(15))
        .unwrap()
        .0
}

/// Headers carrying `authorization: Bearer <token>`
pub fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "authorization",
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    );
    headers
}
