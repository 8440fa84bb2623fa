//! バッチ処理
//!
//! ストア内のアイテムを1件ずつ順番に解析する。
//! リクエストは常に1本だけ。失敗はアイテムに記録して次へ進む（自動リトライなし）。

use crate::analyzer::AnalysisClient;
use crate::encoder::{self, RasterSpec};
use crate::error::Result;
use stock_ai_common::{
    ItemId, ItemPatch, ItemResult, ItemStore, PromptResult, WorkItem, PROMPT_SOFT_LIMIT,
};
use tracing::{debug, info, warn};

/// 解析の種類
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisTask {
    /// ベクター素材のタイトル・キーワード生成
    VectorMetadata,
    /// 画像からのプロンプト抽出
    ImagePrompt { theme: Option<String> },
}

/// 一括処理の結果件数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub completed: usize,
    pub failed: usize,
}

pub struct BatchProcessor<C: AnalysisClient> {
    client: C,
    task: AnalysisTask,
    spec: RasterSpec,
}

impl<C: AnalysisClient> BatchProcessor<C> {
    pub fn new(client: C, task: AnalysisTask, spec: RasterSpec) -> Self {
        Self { client, task, spec }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn task(&self) -> &AnalysisTask {
        &self.task
    }

    /// 1件処理
    ///
    /// エンコード・解析の失敗はアイテムの Error 状態として記録し、`Ok` で返す。
    /// `Err` になるのはストア側の問題（存在しないID、不正な遷移）のみ。
    pub async fn process_one(&self, store: &mut ItemStore, id: ItemId) -> Result<WorkItem> {
        let item = store.update(id, ItemPatch::Start)?;
        debug!("{} {} -> processing", item.id, item.file_name());

        let patch = match self.analyze(&item).await {
            Ok(result) => ItemPatch::Complete(result),
            Err(e) => {
                warn!("{} {} failed: {}", item.id, item.file_name(), e);
                ItemPatch::Fail(e.to_string())
            }
        };

        let updated = store.update(id, patch)?;
        debug!("{} {} -> {}", updated.id, updated.file_name(), updated.status);
        Ok(updated)
    }

    /// pending / error のアイテムをすべて順番に処理
    pub async fn process_all<F>(&self, store: &mut ItemStore, on_progress: F) -> Result<BatchSummary>
    where
        F: FnMut(&WorkItem, usize, usize),
    {
        let ids = store.retryable_ids();
        self.process_ids(store, &ids, on_progress).await
    }

    /// 指定IDを順番に処理
    pub async fn process_ids<F>(
        &self,
        store: &mut ItemStore,
        ids: &[ItemId],
        mut on_progress: F,
    ) -> Result<BatchSummary>
    where
        F: FnMut(&WorkItem, usize, usize),
    {
        let total = ids.len();
        let mut summary = BatchSummary::default();
        info!("processing {} item(s)", total);

        for (i, &id) in ids.iter().enumerate() {
            let item = self.process_one(store, id).await?;

            summary.processed += 1;
            if item.is_completed() {
                summary.completed += 1;
            } else {
                summary.failed += 1;
            }

            on_progress(&item, i + 1, total);
        }

        info!(
            "batch finished: {} completed, {} failed",
            summary.completed, summary.failed
        );
        Ok(summary)
    }

    async fn analyze(&self, item: &WorkItem) -> Result<ItemResult> {
        let payload = encoder::encode(&item.source, self.spec)?;

        match &self.task {
            AnalysisTask::VectorMetadata => {
                let metadata = self.client.generate_vector_metadata(&payload).await?;
                Ok(ItemResult::Metadata(metadata))
            }
            AnalysisTask::ImagePrompt { theme } => {
                let prompt = self
                    .client
                    .generate_image_prompt(&payload, theme.as_deref())
                    .await?;

                let result = PromptResult {
                    prompt,
                    theme: theme.clone(),
                };
                if result.exceeds_soft_limit() {
                    warn!(
                        "{} prompt is {} chars (limit {})",
                        item.file_name(),
                        result.prompt.chars().count(),
                        PROMPT_SOFT_LIMIT
                    );
                }
                Ok(ItemResult::Prompt(result))
            }
        }
    }
}
