// Result Sink Port - receives the assembled aggregate unmodified

use crate::error::Result;

/// Consumer of operation results (an HTTP handler, the CLI, a test)
pub trait ResultSink: Send + Sync {
    /// Accept one operation result, already converted to its serialized form
    fn accept(&self, operation: &str, value: serde_json::Value) -> Result<()>;
}

/// Serialize any aggregate and hand it to the sink
pub fn publish<T: serde::Serialize>(sink: &dyn ResultSink, operation: &str, value: &T) -> Result<()> {
    let value = serde_json::to_value(value)?;
    sink.accept(operation, value)
}

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Keeps everything it receives
    #[derive(Default)]
    pub struct CollectingSink {
        received: Mutex<Vec<(String, serde_json::Value)>>,
    }

    impl CollectingSink {
        pub fn received(&self) -> Vec<(String, serde_json::Value)> {
            self.received.lock().unwrap().clone()
        }
    }

    impl ResultSink for CollectingSink {
        fn accept(&self, operation: &str, value: serde_json::Value) -> Result<()> {
            self.received
                .lock()
                .unwrap()
                .push((operation.to_string(), value));
            Ok(())
        }
    }
}
