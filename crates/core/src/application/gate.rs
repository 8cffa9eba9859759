//! Stage completion gate
//!
//! A channel is closed when its last `Sender` is dropped. The gate owns the
//! designated sender of one output channel plus the producers feeding it, and
//! a dedicated closer task drops that sender only after every producer has
//! exited. Producers only ever hold clones, so no send can race the close and
//! consumers never observe a premature end of stream.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error};

/// Receiver shared by all workers of a pool (multi-consumer job queue)
pub type SharedReceiver<T> = Arc<Mutex<mpsc::Receiver<T>>>;

pub fn shared<T>(rx: mpsc::Receiver<T>) -> SharedReceiver<T> {
    Arc::new(Mutex::new(rx))
}

/// Pull the next item; `None` once the queue is closed and drained
pub async fn next_item<T>(rx: &SharedReceiver<T>) -> Option<T> {
    rx.lock().await.recv().await
}

pub struct StageGate<T> {
    stage: &'static str,
    workers: JoinSet<()>,
    tx: mpsc::Sender<T>,
}

impl<T: Send + 'static> StageGate<T> {
    pub fn new(stage: &'static str, tx: mpsc::Sender<T>) -> Self {
        Self {
            stage,
            workers: JoinSet::new(),
            tx,
        }
    }

    /// Sender for producers that belong to another gate but also feed this channel
    pub fn sender(&self) -> mpsc::Sender<T> {
        self.tx.clone()
    }

    /// Spawn a producer with its own sender handle
    pub fn spawn<F, Fut>(&mut self, producer: F)
    where
        F: FnOnce(mpsc::Sender<T>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let tx = self.tx.clone();
        self.workers.spawn(producer(tx));
    }

    /// Hand the gate to its closer task.
    ///
    /// The returned handle resolves to the number of producers that panicked.
    pub fn close_when_done(self) -> JoinHandle<usize> {
        let StageGate {
            stage,
            mut workers,
            tx,
        } = self;

        tokio::spawn(async move {
            let mut panicked = 0;
            while let Some(joined) = workers.join_next().await {
                if let Err(e) = joined {
                    error!(stage, error = %e, "Stage worker panicked");
                    panicked += 1;
                }
            }
            drop(tx);
            debug!(stage, "Stage drained, output closed");
            panicked
        })
    }
}
