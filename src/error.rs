use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StockAiError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`stock-ai config --set-api-key YOUR_KEY` または環境変数 GEMINI_API_KEY で設定してください")]
    MissingApiKey,

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("対象ファイルが見つかりません: {0}")]
    NoFilesFound(String),

    #[error("ファイル読み込みエラー ({}): {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ラスタライズに失敗: {0}")]
    Rasterization(String),

    #[error("AIからの応答がありません")]
    NoResponse,

    #[error("AIの応答形式が不正: {0}")]
    MalformedResponse(String),

    #[error("トレンド取得エラー: {0}")]
    Fetch(String),

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("HTTPエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("パッケージ生成エラー: {0}")]
    Packaging(String),

    #[error("エクスポート対象の完了済みアイテムがありません")]
    NoCompletedItems,

    #[error("対話入力エラー: {0}")]
    Interactive(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] stock_ai_common::Error),
}

impl From<zip::result::ZipError> for StockAiError {
    fn from(e: zip::result::ZipError) -> Self {
        StockAiError::Packaging(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StockAiError>;
