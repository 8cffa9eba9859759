// Notifier Port - delivery of a single notification

use crate::domain::NotificationTask;
use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification to its (already checked) recipient
    async fn deliver(&self, task: &NotificationTask) -> Result<()>;
}

/// Notifier that logs deliveries after a simulated transport latency (production default)
pub struct LogNotifier {
    latency: Duration,
}

impl LogNotifier {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, task: &NotificationTask) -> Result<()> {
        tokio::time::sleep(self.latency).await;
        debug!(
            target_id = task.target_id,
            kind = ?task.kind,
            message = %task.message,
            "Notification delivered"
        );
        Ok(())
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records deliveries and the peak number of concurrent deliveries
    pub struct RecordingNotifier {
        latency: Duration,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        delivered: Mutex<Vec<NotificationTask>>,
    }

    impl RecordingNotifier {
        pub fn new(latency: Duration) -> Self {
            Self {
                latency,
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                delivered: Mutex::new(Vec::new()),
            }
        }

        pub fn peak_in_flight(&self) -> usize {
            self.peak.load(Ordering::SeqCst)
        }

        pub fn delivered(&self) -> Vec<NotificationTask> {
            self.delivered.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn deliver(&self, task: &NotificationTask) -> Result<()> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.latency).await;
            self.delivered.lock().unwrap().push(task.clone());
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    }
}
