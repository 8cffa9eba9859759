// Engine constants (No magic values)
use std::time::Duration;

/// Worker count used when a caller passes 0 workers
pub const DEFAULT_WORKER_COUNT: usize = 10;

/// Worker count for whole-catalog validation runs
pub const DEFAULT_VALIDATION_WORKERS: usize = 15;

/// In-flight cap used when a caller passes 0 for notification dispatch
pub const DEFAULT_MAX_CONCURRENT_NOTIFICATIONS: usize = 20;

/// Simulated latency of one bulk job (100ms)
pub const SIMULATED_JOB_LATENCY: Duration = Duration::from_millis(100);

/// Simulated transport latency of one notification (10ms)
pub const SIMULATED_NOTIFICATION_LATENCY: Duration = Duration::from_millis(10);

/// Deadline for the game details fan-out (5s)
pub const DEFAULT_DETAILS_TIMEOUT: Duration = Duration::from_secs(5);

/// Deadline for the dashboard statistics report (30s)
pub const DEFAULT_STATS_TIMEOUT: Duration = Duration::from_secs(30);

/// Most recent reviews loaded with the game details
pub const DEFAULT_REVIEW_LIMIT: usize = 10;

/// Related games loaded with the game details
pub const DEFAULT_RELATED_LIMIT: usize = 5;

/// Per-predicate cap for parallel search
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Window for the "recent games" dashboard counter (30 days)
pub const RECENT_GAMES_WINDOW_MS: i64 = 30 * 24 * 60 * 60 * 1000;

/// Label used when no top category can be determined
pub const TOP_CATEGORY_FALLBACK: &str = "N/A";

/// Image pipeline stage widths
pub const DEFAULT_VALIDATE_WORKERS: usize = 3;
pub const DEFAULT_TRANSFORM_WORKERS: usize = 2;
pub const DEFAULT_ENRICH_WORKERS: usize = 2;
