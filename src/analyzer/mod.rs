//! 解析クライアント
//!
//! 生成モデルへの問い合わせを `AnalysisClient` トレイトで抽象化する。
//! 本番実装は Gemini REST API（`GeminiClient`）。
//! バッチ処理側はトレイト越しにしか触らないので、テストでは差し替え可能。

mod gemini;

pub use gemini::GeminiClient;

use crate::encoder::EncodedPayload;
use crate::error::Result;
use async_trait::async_trait;
use stock_ai_common::{TrendCategory, VectorMetadata};

/// トレンド取得で依頼するカテゴリ数
pub const TREND_CATEGORY_COUNT: usize = 6;

#[async_trait]
pub trait AnalysisClient: Send + Sync {
    /// ベクター素材のタイトル・説明・キーワードを生成
    ///
    /// 空レスポンスは `NoResponse`、形式不正は `MalformedResponse`
    async fn generate_vector_metadata(&self, payload: &EncodedPayload) -> Result<VectorMetadata>;

    /// 画像から text-to-image プロンプトを逆生成
    ///
    /// 長さ制限は依頼するだけで強制しない
    async fn generate_image_prompt(
        &self,
        payload: &EncodedPayload,
        theme: Option<&str>,
    ) -> Result<String>;

    /// トレンドカテゴリ一覧を取得（空リストは正常）
    ///
    /// 空・解析不能なレスポンスは `Fetch`
    async fn get_trending_keywords(&self) -> Result<Vec<TrendCategory>>;
}
