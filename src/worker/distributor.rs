// ABOUTME: In-process task distributor backed by a tokio unbounded channel
// ABOUTME: Encodes task payloads as JSON and hands them to the paired receiver
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{PayloadSendVerifyEmail, Task, TaskDistributor, TaskOptions, WorkerError};
use crate::constants::tasks;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::mpsc;

/// Distributor writing to an in-process queue
#[derive(Debug, Clone)]
pub struct QueueTaskDistributor {
    sender: mpsc::UnboundedSender<Task>,
}

/// Consumer end of a [`QueueTaskDistributor`]
#[derive(Debug)]
pub struct TaskReceiver {
    receiver: mpsc::UnboundedReceiver<Task>,
}

impl TaskReceiver {
    /// Wait for the next task; `None` once every distributor is dropped
    pub async fn recv(&mut self) -> Option<Task> {
        self.receiver.recv().await
    }

    /// Take a task if one is already queued
    pub fn try_recv(&mut self) -> Option<Task> {
        self.receiver.try_recv().ok()
    }
}

impl QueueTaskDistributor {
    /// Create a distributor and its receiver
    #[must_use]
    pub fn new() -> (Self, TaskReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, TaskReceiver { receiver })
    }

    fn enqueue(&self, task: Task) -> Result<(), WorkerError> {
        let task_type = task.task_type.clone();
        let queue = task.options.queue.clone();
        self.sender
            .send(task)
            .map_err(|_| WorkerError::QueueClosed)?;
        tracing::info!(task_type = %task_type, queue = %queue, "Enqueued task");
        Ok(())
    }
}

#[async_trait]
impl TaskDistributor for QueueTaskDistributor {
    async fn distribute_task_send_verify_email(
        &self,
        payload: &PayloadSendVerifyEmail,
        options: TaskOptions,
    ) -> Result<(), WorkerError> {
        let task = Task {
            task_type: tasks::SEND_VERIFY_EMAIL.to_owned(),
            payload: serde_json::to_vec(payload)?,
            options,
            enqueued_at: Utc::now(),
        };
        self.enqueue(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_task_reaches_receiver() {
        let (distributor, mut receiver) = QueueTaskDistributor::new();
        let payload = PayloadSendVerifyEmail {
            username: "alice".into(),
        };

        distributor
            .distribute_task_send_verify_email(&payload, TaskOptions::send_verify_email())
            .await
            .unwrap();

        let task = receiver.recv().await.unwrap();
        assert_eq!(task.task_type, tasks::SEND_VERIFY_EMAIL);
        assert_eq!(task.options.queue, tasks::QUEUE_CRITICAL);
        let decoded: PayloadSendVerifyEmail = serde_json::from_slice(&task.payload).unwrap();
        assert_eq!(decoded, payload);
    }

    #[tokio::test]
    async fn test_closed_queue() {
        let (distributor, receiver) = QueueTaskDistributor::new();
        drop(receiver);

        let err = distributor
            .distribute_task_send_verify_email(
                &PayloadSendVerifyEmail {
                    username: "alice".into(),
                },
                TaskOptions::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, WorkerError::QueueClosed));
    }
}
