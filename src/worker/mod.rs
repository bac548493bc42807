// ABOUTME: Background task distribution for work triggered by RPC handlers
// ABOUTME: Distributor enqueues typed task payloads; processor consumes and executes them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Background tasks
//!
//! Handlers hand work to a [`TaskDistributor`] and return without waiting.
//! [`QueueTaskDistributor`] pushes tasks onto an in-process channel drained by
//! a [`TaskProcessor`].

/// Channel-backed distributor
pub mod distributor;
/// Task consumer
pub mod processor;

pub use distributor::{QueueTaskDistributor, TaskReceiver};
pub use processor::TaskProcessor;

use crate::constants::tasks;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Task distribution and processing failures
#[derive(Debug, Error)]
pub enum WorkerError {
    /// Task payload could not be (de)serialized
    #[error("failed to encode task payload: {0}")]
    Payload(#[from] serde_json::Error),
    /// The consumer side of the queue is gone
    #[error("task queue is closed")]
    QueueClosed,
    /// Task type has no handler
    #[error("unknown task type '{0}'")]
    UnknownTask(String),
    /// Handler failed
    #[error("task processing failed: {0}")]
    Processing(String),
}

/// Payload of the verification email task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadSendVerifyEmail {
    /// Recipient account
    pub username: String,
}

/// Delivery options attached to an enqueued task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOptions {
    /// Queue name
    pub queue: String,
    /// Attempts after the first failure
    pub max_retry: u32,
    /// Delay before the task becomes runnable
    pub process_in: Duration,
}

impl TaskOptions {
    /// Options for the verification email task
    #[must_use]
    pub fn send_verify_email() -> Self {
        Self {
            queue: tasks::QUEUE_CRITICAL.to_owned(),
            max_retry: tasks::VERIFY_EMAIL_MAX_RETRY,
            process_in: Duration::seconds(tasks::VERIFY_EMAIL_DELAY_SECS),
        }
    }
}

impl Default for TaskOptions {
    fn default() -> Self {
        Self {
            queue: tasks::QUEUE_DEFAULT.to_owned(),
            max_retry: 0,
            process_in: Duration::zero(),
        }
    }
}

/// A serialized task waiting in a queue
#[derive(Debug, Clone)]
pub struct Task {
    /// Handler selector
    pub task_type: String,
    /// JSON-encoded payload
    pub payload: Vec<u8>,
    /// Delivery options
    pub options: TaskOptions,
    /// When the task was enqueued
    pub enqueued_at: DateTime<Utc>,
}

impl Task {
    /// Earliest time the task may run
    #[must_use]
    pub fn runnable_at(&self) -> DateTime<Utc> {
        self.enqueued_at + self.options.process_in
    }
}

/// Enqueue background work
#[async_trait]
pub trait TaskDistributor: Send + Sync {
    /// Schedule a verification email for a freshly created user
    ///
    /// # Errors
    /// Returns an error if the payload cannot be encoded or the queue is closed
    async fn distribute_task_send_verify_email(
        &self,
        payload: &PayloadSendVerifyEmail,
        options: TaskOptions,
    ) -> Result<(), WorkerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_email_options() {
        let options = TaskOptions::send_verify_email();
        assert_eq!(options.queue, "critical");
        assert_eq!(options.max_retry, 10);
        assert_eq!(options.process_in, Duration::seconds(10));
    }

    #[test]
    fn test_runnable_at_honours_delay() {
        let enqueued_at = Utc::now();
        let task = Task {
            task_type: tasks::SEND_VERIFY_EMAIL.to_owned(),
            payload: Vec::new(),
            options: TaskOptions::send_verify_email(),
            enqueued_at,
        };
        assert_eq!(task.runnable_at(), enqueued_at + Duration::seconds(10));
    }
}
