// Port Layer - Interfaces for external dependencies

pub mod data_store;
pub mod notifier;
pub mod result_sink;
pub mod time_provider; // For deterministic testing

// Re-exports
pub use data_store::{CountQuery, DataStore, GameFilter, UserFilter};
pub use notifier::{LogNotifier, Notifier};
pub use result_sink::{publish, ResultSink};
pub use time_provider::{SystemTimeProvider, TimeProvider};
