//! Bounded worker pool
//!
//! A fixed number of workers pull jobs from one shared queue and push one
//! result per job into a result stream. The queue is closed by its single
//! producer once every job is enqueued; the result stream is closed by the
//! pool's [`StageGate`] once every worker has exited.

use super::constants::DEFAULT_WORKER_COUNT;
use super::gate::{next_item, shared, StageGate};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Run `process` over every job with at most `worker_count` concurrent workers.
///
/// Results are unordered; there is exactly one per job unless a worker panics.
/// `worker_count == 0` falls back to [`DEFAULT_WORKER_COUNT`].
pub async fn run_pool<J, R, F, Fut>(jobs: Vec<J>, worker_count: usize, process: F) -> Vec<R>
where
    J: Send + 'static,
    R: Send + 'static,
    F: Fn(usize, J) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
{
    let total = jobs.len();
    if total == 0 {
        return Vec::new();
    }
    let worker_count = effective_workers(worker_count, total);
    debug!(jobs = total, workers = worker_count, "Starting worker pool");

    let (job_tx, job_rx) = mpsc::channel::<J>(total);
    let (result_tx, mut result_rx) = mpsc::channel::<R>(total);

    // Single producer; dropping job_tx at the end closes the queue exactly once
    let producer = tokio::spawn(async move {
        for job in jobs {
            if job_tx.send(job).await.is_err() {
                break;
            }
        }
    });

    let job_rx = shared(job_rx);
    let process = Arc::new(process);
    let mut gate = StageGate::new("worker_pool", result_tx);
    for worker_id in 0..worker_count {
        let job_rx = Arc::clone(&job_rx);
        let process = Arc::clone(&process);
        gate.spawn(move |result_tx| async move {
            while let Some(job) = next_item(&job_rx).await {
                let result = process(worker_id, job).await;
                if result_tx.send(result).await.is_err() {
                    break;
                }
            }
        });
    }
    let closer = gate.close_when_done();

    let mut results = Vec::with_capacity(total);
    while let Some(result) = result_rx.recv().await {
        results.push(result);
    }

    let _ = producer.await;
    if let Ok(panicked) = closer.await {
        if panicked > 0 {
            warn!(panicked, lost = total - results.len(), "Worker pool lost results");
        }
    }
    results
}

fn effective_workers(requested: usize, jobs: usize) -> usize {
    let requested = if requested == 0 {
        DEFAULT_WORKER_COUNT
    } else {
        requested
    };
    requested.min(jobs).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_one_result_per_job() {
        let jobs: Vec<u32> = (0..50).collect();
        let results = run_pool(jobs, 4, |_, job| async move { job * 2 }).await;

        assert_eq!(results.len(), 50);
        let unique: HashSet<u32> = results.into_iter().collect();
        assert_eq!(unique.len(), 50);
        assert!(unique.contains(&98));
    }

    #[tokio::test]
    async fn test_zero_workers_uses_default() {
        assert_eq!(effective_workers(0, 100), DEFAULT_WORKER_COUNT);
        assert_eq!(effective_workers(0, 3), 3);
        assert_eq!(effective_workers(8, 100), 8);

        let results = run_pool(vec![1, 2, 3], 0, |_, job| async move { job }).await;
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_job_list() {
        let results: Vec<u32> = run_pool(Vec::<u32>::new(), 4, |_, job| async move { job }).await;
        assert!(results.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_worker_count_bounds_concurrency() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let (r, p) = (Arc::clone(&running), Arc::clone(&peak));
        let results = run_pool((0..20).collect::<Vec<u32>>(), 3, move |_, job| {
            let (running, peak) = (Arc::clone(&r), Arc::clone(&p));
            async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                job
            }
        })
        .await;

        assert_eq!(results.len(), 20);
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_workers_share_the_queue() {
        let results = run_pool((0..12).collect::<Vec<u32>>(), 3, |worker_id, _| async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            worker_id
        })
        .await;

        let workers: HashSet<usize> = results.into_iter().collect();
        assert!(workers.len() > 1);
        assert!(workers.iter().all(|&w| w < 3));
    }
}
