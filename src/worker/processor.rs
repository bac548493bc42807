// ABOUTME: Task processor draining the in-process queue and running task handlers
// ABOUTME: Honours per-task delays and retries failed tasks up to their retry budget
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{PayloadSendVerifyEmail, Task, TaskReceiver, WorkerError};
use crate::constants::tasks;
use crate::store::Store;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration as StdDuration;

/// Executes queued tasks against the store
#[derive(Clone)]
pub struct TaskProcessor {
    store: Arc<dyn Store>,
    retry_delay: StdDuration,
}

impl TaskProcessor {
    /// Create a processor with a one second retry backoff
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            retry_delay: StdDuration::from_secs(1),
        }
    }

    /// Override the delay between retries
    #[must_use]
    pub const fn with_retry_delay(mut self, retry_delay: StdDuration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Drain `receiver` until every distributor is dropped
    ///
    /// Each task runs on its own tokio task so delayed tasks do not hold up
    /// the queue.
    pub async fn run(self, mut receiver: TaskReceiver) {
        tracing::info!("Task processor started");
        while let Some(task) = receiver.recv().await {
            let processor = self.clone();
            tokio::spawn(async move {
                processor.run_with_retries(task).await;
            });
        }
        tracing::info!("Task queue closed, task processor stopping");
    }

    async fn run_with_retries(&self, task: Task) {
        let wait = (task.runnable_at() - Utc::now()).to_std().unwrap_or_default();
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }

        let mut attempt = 0;
        loop {
            match self.process_task(&task).await {
                Ok(()) => return,
                Err(e) if attempt < task.options.max_retry => {
                    attempt += 1;
                    tracing::warn!(
                        task_type = %task.task_type,
                        attempt,
                        max_retry = task.options.max_retry,
                        error = %e,
                        "Task failed, retrying"
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => {
                    tracing::error!(
                        task_type = %task.task_type,
                        attempts = attempt + 1,
                        error = %e,
                        "Task failed permanently"
                    );
                    return;
                }
            }
        }
    }

    /// Run a single task once
    ///
    /// # Errors
    /// Returns an error if the task type is unknown, its payload is malformed
    /// or its handler fails
    pub async fn process_task(&self, task: &Task) -> Result<(), WorkerError> {
        match task.task_type.as_str() {
            tasks::SEND_VERIFY_EMAIL => {
                let payload: PayloadSendVerifyEmail = serde_json::from_slice(&task.payload)?;
                self.process_task_send_verify_email(&payload).await
            }
            other => Err(WorkerError::UnknownTask(other.to_owned())),
        }
    }

    async fn process_task_send_verify_email(
        &self,
        payload: &PayloadSendVerifyEmail,
    ) -> Result<(), WorkerError> {
        let user = self
            .store
            .get_user(&payload.username)
            .await
            .map_err(|e| WorkerError::Processing(e.to_string()))?;

        // No mail transport is wired in; the lookup confirms the row is committed.
        tracing::info!(
            task_type = tasks::SEND_VERIFY_EMAIL,
            username = %user.username,
            email = %user.email,
            "Processed verification email task"
        );
        Ok(())
    }
}
