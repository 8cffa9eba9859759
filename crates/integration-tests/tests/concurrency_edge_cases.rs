//! Concurrency bounds, deadlines and failure propagation
//!
//! Uses the in-memory store so latency and failures can be injected per
//! operation.

use gamehub_core::application::{
    run_pool, BulkProcessor, CatalogEngine, DetailsAggregator, Dispatcher, EngineConfig,
    ImagePipeline, PipelineConfig, StatsAggregator,
};
use gamehub_core::domain::{
    BulkAction, Category, ErrorKind, Game, NotificationTask, PipelineItem, User,
};
use gamehub_core::error::AppError;
use gamehub_core::port::data_store::mocks::{InMemoryDataStore, StoreOp};
use gamehub_core::port::notifier::mocks::RecordingNotifier;
use gamehub_core::port::time_provider::FixedTimeProvider;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn catalog() -> InMemoryDataStore {
    let mut store = InMemoryDataStore::new()
        .with_category(Category::new(1, "Arcade"))
        .with_category(Category::new(2, "Board"));
    for id in 1..=20 {
        store = store.with_game(Game::new(id, format!("Game {}", id), 10.0, 1 + id % 2));
    }
    for id in 1..=12 {
        let user = User::new(id, format!("user{}", id));
        store = store.with_user(if id % 4 == 0 { user.banned() } else { user });
    }
    store
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_details_branches_run_concurrently() {
    let store = Arc::new(catalog().with_latency(Duration::from_millis(60)));
    let aggregator = DetailsAggregator::new(store);

    let started = Instant::now();
    let details = aggregator.fetch(3, Duration::from_secs(5)).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(details.game.id, 3);
    // primary + one dependent round trip; eight sequential calls would take ~480ms
    assert!(elapsed < Duration::from_millis(350), "took {:?}", elapsed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_details_deadline_abandons_slow_branch() {
    let store = Arc::new(
        catalog().with_op_latency(StoreOp::ListRecentReviews, Duration::from_secs(10)),
    );
    let aggregator = DetailsAggregator::new(store);

    let started = Instant::now();
    let err = aggregator
        .fetch(1, Duration::from_millis(100))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Timeout(100)));
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_details_primary_failure_is_reported() {
    let store = Arc::new(catalog().fail_on(StoreOp::FindGame, "disk I/O error"));
    let aggregator = DetailsAggregator::new(store);

    let err = aggregator.fetch(1, Duration::from_secs(1)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Store);
}

#[tokio::test]
async fn test_details_statistics_degrade() {
    let store = Arc::new(catalog().fail_on(StoreOp::AverageRating, "timeout"));
    let aggregator = DetailsAggregator::new(store);

    let details = aggregator.fetch(2, Duration::from_secs(1)).await.unwrap();
    assert_eq!(details.statistics.average_rating, 0.0);
    assert_eq!(details.degraded, vec!["statistics.average_rating".to_string()]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_dispatcher_respects_bound_and_order() {
    let store = Arc::new(catalog());
    let notifier = Arc::new(RecordingNotifier::new(Duration::from_millis(15)));
    let dispatcher = Dispatcher::new(store, notifier.clone());

    let tasks: Vec<_> = (1..=12)
        .map(|id| NotificationTask::push(id, "sale"))
        .collect();
    let results = dispatcher.dispatch(tasks, 3).await;

    assert_eq!(results.len(), 12);
    assert!(notifier.peak_in_flight() <= 3);
    for (index, result) in results.iter().enumerate() {
        let target = index as i64 + 1;
        assert_eq!(result.target_id, target);
        if target % 4 == 0 {
            assert_eq!(result.error, Some(ErrorKind::Suspended));
        } else {
            assert!(result.success);
        }
    }
    assert_eq!(notifier.delivered().len(), 9);
}

#[tokio::test]
async fn test_dispatcher_unknown_recipient() {
    let dispatcher = Dispatcher::new(
        Arc::new(catalog()),
        Arc::new(RecordingNotifier::new(Duration::ZERO)),
    );
    let results = dispatcher
        .dispatch(vec![NotificationTask::push(999, "hi")], 0)
        .await;
    assert_eq!(results[0].error, Some(ErrorKind::NotFound));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_worker_pool_bounds_concurrency() {
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let (running_in, peak_in) = (running.clone(), peak.clone());
    let results = run_pool((0..40).collect::<Vec<u32>>(), 4, move |_, job| {
        let running = running_in.clone();
        let peak = peak_in.clone();
        async move {
            let now = running.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            running.fetch_sub(1, Ordering::SeqCst);
            job * 2
        }
    })
    .await;

    assert_eq!(results.len(), 40);
    let unique: HashSet<_> = results.into_iter().collect();
    assert_eq!(unique.len(), 40);
    assert!(peak.load(Ordering::SeqCst) <= 4);
    assert_eq!(running.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_bulk_store_failures_stay_per_job() {
    let store = Arc::new(catalog().fail_on(StoreOp::UpdateGamePrice, "read-only"));
    let processor = BulkProcessor::new(store, Duration::from_millis(1));
    let games: Vec<_> = (1..=8).map(|id| Game::new(id, "G", 10.0, 1)).collect();

    let results = processor
        .run(games, BulkAction::UpdatePrices { factor: 2.0 }, 3)
        .await;

    assert_eq!(results.len(), 8);
    assert!(results.iter().all(|r| r.error == Some(ErrorKind::Store)));
}

#[tokio::test]
async fn test_bulk_unknown_action() {
    let processor = BulkProcessor::new(Arc::new(catalog()), Duration::ZERO);
    let games = vec![Game::new(1, "A", 1.0, 1), Game::new(2, "B", 1.0, 1)];

    let results = processor
        .run(games, BulkAction::parse("archive", 1.0), 2)
        .await;
    assert!(results
        .iter()
        .all(|r| r.error == Some(ErrorKind::UnknownAction)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_stats_any_failure_fails_report() {
    let store = Arc::new(catalog().fail_on(StoreOp::TopCategory, "locked"));
    let stats = StatsAggregator::new(store, Arc::new(FixedTimeProvider(0)));

    let err = stats.compute(Duration::from_secs(1)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Store);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_stats_deadline() {
    let store = Arc::new(catalog().with_op_latency(StoreOp::Count, Duration::from_secs(5)));
    let config = EngineConfig {
        stats_timeout: Duration::from_millis(80),
        ..Default::default()
    };
    let engine = CatalogEngine::new(
        store,
        Arc::new(RecordingNotifier::new(Duration::ZERO)),
        Arc::new(FixedTimeProvider(0)),
        config,
    )
    .unwrap();

    let err = engine.dashboard_stats().await.unwrap_err();
    assert!(matches!(err, AppError::Timeout(80)));
}

#[tokio::test]
async fn test_search_predicate_failure_fails_search() {
    let store = Arc::new(catalog().fail_on(StoreOp::ListGames, "corrupt page"));
    let engine = CatalogEngine::new(
        store,
        Arc::new(RecordingNotifier::new(Duration::ZERO)),
        Arc::new(FixedTimeProvider(0)),
        EngineConfig::default(),
    )
    .unwrap();

    assert!(engine.search_games("game").await.is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_pipeline_delivers_every_item_once() {
    let config = PipelineConfig {
        validate_workers: 3,
        transform_workers: 2,
        enrich_workers: 2,
        stage_latency: Duration::from_millis(1),
    };
    let pipeline = ImagePipeline::new(config, Arc::new(FixedTimeProvider(42)));

    let items: Vec<_> = (0..60)
        .map(|i| {
            let data = if i % 10 == 0 { Vec::new() } else { vec![7u8; i] };
            PipelineItem::new(1, format!("shot_{}.PNG", i), data)
        })
        .collect();
    let (output, visits) = pipeline.run_counted(items).await;

    assert_eq!(output.len(), 60);
    let names: HashSet<_> = output.iter().map(|i| i.filename.clone()).collect();
    assert_eq!(names.len(), 60);

    let (failed, processed): (Vec<_>, Vec<_>) = output.iter().partition(|i| i.is_failed());
    assert_eq!(failed.len(), 6);
    assert!(failed
        .iter()
        .all(|i| i.error == Some(ErrorKind::ValidationFailed) && i.thumbnail.is_none()));
    for item in processed {
        assert_eq!(item.thumbnail.as_deref(), Some(format!("thumb_{}", item.filename).as_str()));
        let metadata = item.metadata.as_ref().unwrap();
        assert_eq!(metadata.format, "png");
        assert_eq!(metadata.size_bytes, item.data.len());
        assert_eq!(metadata.processed_at, 42);
    }

    assert_eq!(visits.validated(), 60);
    assert_eq!(visits.transformed(), 54);
    assert_eq!(visits.enriched(), 54);
}
