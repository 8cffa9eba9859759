//! Bounded-concurrency notification dispatcher
//!
//! Tasks are only spawned once a semaphore permit is available, so at most
//! `max_concurrent` deliveries are in flight. `results[i]` always answers
//! `tasks[i]`; a failed delivery never cancels its siblings.

use super::constants::DEFAULT_MAX_CONCURRENT_NOTIFICATIONS;
use crate::domain::{ErrorKind, NotificationResult, NotificationTask};
use crate::error::{AppError, Result};
use crate::port::{DataStore, Notifier};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<dyn DataStore>,
    notifier: Arc<dyn Notifier>,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn DataStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    pub async fn dispatch(
        &self,
        tasks: Vec<NotificationTask>,
        max_concurrent: usize,
    ) -> Vec<NotificationResult> {
        let max_concurrent = if max_concurrent == 0 {
            DEFAULT_MAX_CONCURRENT_NOTIFICATIONS
        } else {
            max_concurrent
        }
        .min(tasks.len().max(1));
        info!(tasks = tasks.len(), max_concurrent, "Dispatching notifications");

        // One reserved slot per task; only the collector below writes them
        let mut results: Vec<NotificationResult> = tasks
            .iter()
            .map(|t| NotificationResult::failed(t.target_id, ErrorKind::Store))
            .collect();

        let semaphore = Arc::new(Semaphore::new(max_concurrent));
        let mut in_flight = JoinSet::new();

        for (index, task) in tasks.into_iter().enumerate() {
            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break, // semaphore is never closed
            };
            let dispatcher = self.clone();
            in_flight.spawn(async move {
                let outcome = dispatcher.send_one(&task).await;
                drop(permit);
                (index, task.target_id, outcome)
            });
        }

        while let Some(joined) = in_flight.join_next().await {
            match joined {
                Ok((index, target_id, Ok(()))) => {
                    results[index] = NotificationResult::delivered(target_id);
                }
                Ok((index, target_id, Err(e))) => {
                    debug!(target_id, error = %e, "Notification failed");
                    results[index] = NotificationResult::failed(target_id, e.kind());
                }
                Err(e) => error!(error = %e, "Notification task panicked"),
            }
        }

        let failed = results.iter().filter(|r| !r.success).count();
        if failed > 0 {
            warn!(failed, total = results.len(), "Some notifications were not delivered");
        }
        results
    }

    async fn send_one(&self, task: &NotificationTask) -> Result<()> {
        let recipient = self
            .store
            .find_user(task.target_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", task.target_id)))?;
        if recipient.is_banned {
            return Err(AppError::RecipientSuspended(format!(
                "User {} is suspended",
                recipient.id
            )));
        }
        self.notifier.deliver(task).await
    }
}
