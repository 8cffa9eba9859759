// Pipeline Item Domain Model

use super::catalog::GameId;
use super::error::ErrorKind;
use serde::{Deserialize, Serialize};

/// Metadata attached by the enrich stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMetadata {
    pub size_bytes: usize,
    pub format: String,
    pub processed_at: i64, // epoch ms
}

/// Image travelling through validate -> transform -> enrich.
///
/// Derived fields are only ever added, and exactly one stage owns the item at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineItem {
    pub game_id: GameId,
    pub filename: String,
    #[serde(skip)]
    pub data: Vec<u8>,
    pub thumbnail: Option<String>,
    pub metadata: Option<ItemMetadata>,
    pub error: Option<ErrorKind>,
    pub message: String,
}

impl PipelineItem {
    pub fn new(game_id: GameId, filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            game_id,
            filename: filename.into(),
            data: data.into(),
            thumbnail: None,
            metadata: None,
            error: None,
            message: String::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Lowercase file extension, "unknown" when there is none
    pub fn format(&self) -> String {
        match self.filename.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_lowercase(),
            _ => "unknown".to_string(),
        }
    }
}
