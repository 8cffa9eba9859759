// JSON Result Sink

use gamehub_core::error::{AppError, Result};
use gamehub_core::port::ResultSink;
use serde_json::json;
use std::io::Write;
use std::sync::Mutex;

/// Writes each result as one pretty-printed JSON document
pub struct JsonSink<W: Write + Send> {
    out: Mutex<W>,
}

impl JsonSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out.into_inner().unwrap()
    }
}

impl<W: Write + Send> ResultSink for JsonSink<W> {
    fn accept(&self, operation: &str, value: serde_json::Value) -> Result<()> {
        let document = json!({ "operation": operation, "result": value });
        let mut out = self
            .out
            .lock()
            .map_err(|_| AppError::Internal("result sink poisoned".to_string()))?;
        serde_json::to_writer_pretty(&mut *out, &document)?;
        writeln!(out).map_err(|e| AppError::Internal(format!("write failed: {}", e)))?;
        Ok(())
    }
}
