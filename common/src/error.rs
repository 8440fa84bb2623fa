//! エラー型定義

use crate::types::ItemId;
use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("Invalid transition for item {id}: cannot {action} while {from}")]
    InvalidTransition {
        id: ItemId,
        from: &'static str,
        action: &'static str,
    },
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
