// Domain Layer - Catalog entities and per-operation value types

pub mod aggregate;
pub mod catalog;
pub mod error;
pub mod job;
pub mod notification;
pub mod pipeline;

// Re-exports
pub use aggregate::{
    BulkReport, DashboardStats, DispatchReport, GameDetails, GameStatistics, InvalidGame,
    SearchResult, ValidationReport,
};
pub use catalog::{
    Category, CategoryId, Game, GameId, Ownership, OwnershipStatus, Review, Role, User, UserId,
};
pub use error::{DomainError, ErrorKind};
pub use job::{BulkAction, BulkJob, JobResult};
pub use notification::{NotificationKind, NotificationResult, NotificationTask};
pub use pipeline::{ItemMetadata, PipelineItem};
