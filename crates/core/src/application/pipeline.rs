//! Multi-stage image pipeline: validate -> transform -> enrich
//!
//! Each stage is a small worker pool behind a [`StageGate`]. A stage's output
//! channel is closed only after that stage's whole pool has drained, which in
//! turn lets the next stage's workers run out of input and exit. Items failing
//! validation skip straight to the final result stream. Output order is not
//! preserved; every input yields exactly one output.

use super::constants::{
    DEFAULT_ENRICH_WORKERS, DEFAULT_TRANSFORM_WORKERS, DEFAULT_VALIDATE_WORKERS,
};
use super::gate::{next_item, shared, SharedReceiver, StageGate};
use crate::domain::{ErrorKind, ItemMetadata, PipelineItem};
use crate::port::TimeProvider;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Stage widths and per-item work latency
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub validate_workers: usize,
    pub transform_workers: usize,
    pub enrich_workers: usize,
    pub stage_latency: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            validate_workers: DEFAULT_VALIDATE_WORKERS,
            transform_workers: DEFAULT_TRANSFORM_WORKERS,
            enrich_workers: DEFAULT_ENRICH_WORKERS,
            stage_latency: Duration::from_millis(10),
        }
    }
}

/// Items seen by each stage during one run
#[derive(Debug, Default)]
pub struct StageVisits {
    validated: AtomicUsize,
    transformed: AtomicUsize,
    enriched: AtomicUsize,
}

impl StageVisits {
    pub fn validated(&self) -> usize {
        self.validated.load(Ordering::SeqCst)
    }

    pub fn transformed(&self) -> usize {
        self.transformed.load(Ordering::SeqCst)
    }

    pub fn enriched(&self) -> usize {
        self.enriched.load(Ordering::SeqCst)
    }
}

pub struct ImagePipeline {
    config: PipelineConfig,
    time_provider: Arc<dyn TimeProvider>,
}

impl ImagePipeline {
    pub fn new(config: PipelineConfig, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            config,
            time_provider,
        }
    }

    pub async fn run(&self, items: Vec<PipelineItem>) -> Vec<PipelineItem> {
        self.run_counted(items).await.0
    }

    /// Run the pipeline and also report how many items each stage handled
    pub async fn run_counted(
        &self,
        items: Vec<PipelineItem>,
    ) -> (Vec<PipelineItem>, Arc<StageVisits>) {
        let visits = Arc::new(StageVisits::default());
        let total = items.len();
        if total == 0 {
            return (Vec::new(), visits);
        }
        info!(items = total, "Image pipeline started");
        let capacity = total;

        let (input_tx, input_rx) = mpsc::channel::<PipelineItem>(capacity);
        let (validated_tx, validated_rx) = mpsc::channel::<PipelineItem>(capacity);
        let (transformed_tx, transformed_rx) = mpsc::channel::<PipelineItem>(capacity);
        let (final_tx, mut final_rx) = mpsc::channel::<PipelineItem>(capacity);

        let producer = tokio::spawn(async move {
            for item in items {
                if input_tx.send(item).await.is_err() {
                    break;
                }
            }
        });

        // Enrich workers and validation rejects both feed the final stream
        let mut enrich_gate = StageGate::new("enrich", final_tx);
        let mut validate_gate = StageGate::new("validate", validated_tx);
        let mut transform_gate = StageGate::new("transform", transformed_tx);

        let input_rx = shared(input_rx);
        for _ in 0..self.config.validate_workers.max(1) {
            let input_rx = Arc::clone(&input_rx);
            let rejects = enrich_gate.sender();
            let visits = Arc::clone(&visits);
            let latency = self.config.stage_latency;
            validate_gate.spawn(move |out| validate_worker(input_rx, out, rejects, visits, latency));
        }

        let validated_rx = shared(validated_rx);
        for _ in 0..self.config.transform_workers.max(1) {
            let input_rx = Arc::clone(&validated_rx);
            let visits = Arc::clone(&visits);
            let latency = self.config.stage_latency;
            transform_gate.spawn(move |out| transform_worker(input_rx, out, visits, latency));
        }

        let transformed_rx = shared(transformed_rx);
        for _ in 0..self.config.enrich_workers.max(1) {
            let input_rx = Arc::clone(&transformed_rx);
            let visits = Arc::clone(&visits);
            let time_provider = Arc::clone(&self.time_provider);
            let latency = self.config.stage_latency;
            enrich_gate.spawn(move |out| enrich_worker(input_rx, out, visits, time_provider, latency));
        }

        let closers = [
            validate_gate.close_when_done(),
            transform_gate.close_when_done(),
            enrich_gate.close_when_done(),
        ];

        let mut output = Vec::with_capacity(total);
        while let Some(item) = final_rx.recv().await {
            output.push(item);
        }

        let _ = producer.await;
        for closer in closers {
            let _ = closer.await;
        }
        info!(
            items = output.len(),
            failed = output.iter().filter(|i| i.is_failed()).count(),
            "Image pipeline finished"
        );
        (output, visits)
    }
}

async fn validate_worker(
    input: SharedReceiver<PipelineItem>,
    out: mpsc::Sender<PipelineItem>,
    rejects: mpsc::Sender<PipelineItem>,
    visits: Arc<StageVisits>,
    latency: Duration,
) {
    while let Some(mut item) = next_item(&input).await {
        visits.validated.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(latency).await;

        if item.data.is_empty() {
            debug!(filename = %item.filename, "Rejecting empty image");
            item.error = Some(ErrorKind::ValidationFailed);
            item.message = format!("empty payload for {}", item.filename);
            if rejects.send(item).await.is_err() {
                break;
            }
            continue;
        }
        if out.send(item).await.is_err() {
            break;
        }
    }
}

async fn transform_worker(
    input: SharedReceiver<PipelineItem>,
    out: mpsc::Sender<PipelineItem>,
    visits: Arc<StageVisits>,
    latency: Duration,
) {
    while let Some(mut item) = next_item(&input).await {
        visits.transformed.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(latency).await;
        item.thumbnail = Some(format!("thumb_{}", item.filename));
        if out.send(item).await.is_err() {
            break;
        }
    }
}

async fn enrich_worker(
    input: SharedReceiver<PipelineItem>,
    out: mpsc::Sender<PipelineItem>,
    visits: Arc<StageVisits>,
    time_provider: Arc<dyn TimeProvider>,
    latency: Duration,
) {
    while let Some(mut item) = next_item(&input).await {
        visits.enriched.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(latency).await;
        item.metadata = Some(ItemMetadata {
            size_bytes: item.data.len(),
            format: item.format(),
            processed_at: time_provider.now_millis(),
        });
        item.message = "processed".to_string();
        if out.send(item).await.is_err() {
            break;
        }
    }
}
