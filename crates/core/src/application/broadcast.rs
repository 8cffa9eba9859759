//! Write-once broadcast cell
//!
//! Publishes one value to any number of waiters. Unlike a single-receive
//! channel, every subscriber observes the same `Arc<T>`, and a late subscriber
//! still sees a value published before it started waiting.

use std::sync::Arc;
use tokio::sync::watch;

/// Publishing side; consumed by `publish`, so a value is written at most once
pub struct Publisher<T> {
    tx: watch::Sender<Option<Arc<T>>>,
}

#[derive(Clone)]
pub struct Subscriber<T> {
    rx: watch::Receiver<Option<Arc<T>>>,
}

pub fn broadcast_once<T>() -> (Publisher<T>, Subscriber<T>) {
    let (tx, rx) = watch::channel(None);
    (Publisher { tx }, Subscriber { rx })
}

impl<T> Publisher<T> {
    /// Publish the value to every current and future subscriber
    pub fn publish(self, value: T) -> Arc<T> {
        let value = Arc::new(value);
        self.tx.send_replace(Some(Arc::clone(&value)));
        value
    }

    /// Give up without a value; waiters resolve to `None`
    pub fn abandon(self) {}
}

impl<T> Subscriber<T> {
    /// Wait until a value is published (`None` if the publisher gave up)
    pub async fn wait(&mut self) -> Option<Arc<T>> {
        match self.rx.wait_for(Option::is_some).await {
            Ok(value) => (*value).clone(),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_every_subscriber_sees_the_same_value() {
        let (publisher, subscriber) = broadcast_once::<String>();

        let mut handles = Vec::new();
        for _ in 0..3 {
            let mut subscriber = subscriber.clone();
            handles.push(tokio::spawn(async move { subscriber.wait().await }));
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        let published = publisher.publish("primary".to_string());

        for handle in handles {
            let seen = handle.await.unwrap().unwrap();
            assert!(Arc::ptr_eq(&seen, &published));
        }
    }

    #[tokio::test]
    async fn test_late_subscriber_sees_published_value() {
        let (publisher, mut subscriber) = broadcast_once::<u32>();
        publisher.publish(7);
        assert_eq!(subscriber.wait().await.as_deref(), Some(&7));
        // reading again does not consume it
        assert_eq!(subscriber.wait().await.as_deref(), Some(&7));
    }

    #[tokio::test]
    async fn test_abandoned_publisher_releases_waiters() {
        let (publisher, mut subscriber) = broadcast_once::<u32>();
        let waiter = tokio::spawn(async move { subscriber.wait().await });
        publisher.abandon();
        assert_eq!(waiter.await.unwrap(), None);
    }
}
