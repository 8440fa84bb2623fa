//! 作業アイテムストア
//!
//! 挿入順を保持するインメモリのアイテム集合。
//! 状態遷移とユーザー編集はすべて `update` を経由し、
//! 読み出しは常にスナップショット（クローン）を返す。

use crate::error::{Error, Result};
use crate::types::{ItemId, ItemResult, ItemStatus, SourceFile, VectorMetadata, WorkItem};

/// `update` に渡す部分更新
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemPatch {
    /// pending / error → processing（エラー詳細はクリア）
    Start,
    /// processing → completed
    Complete(ItemResult),
    /// processing → error
    Fail(String),
    /// 完了済みメタデータのタイトル編集
    EditTitle(String),
    /// 完了済みメタデータの説明編集
    EditDescription(String),
    /// 完了済みメタデータへのタグ追加
    AddTags(Vec<String>),
    /// 完了済みプロンプトの編集
    EditPrompt(String),
}

impl ItemPatch {
    fn action(&self) -> &'static str {
        match self {
            ItemPatch::Start => "start",
            ItemPatch::Complete(_) => "complete",
            ItemPatch::Fail(_) => "fail",
            ItemPatch::EditTitle(_) => "edit title",
            ItemPatch::EditDescription(_) => "edit description",
            ItemPatch::AddTags(_) => "add tags",
            ItemPatch::EditPrompt(_) => "edit prompt",
        }
    }
}

/// 状態ごとの件数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
    pub error: usize,
}

#[derive(Debug, Default)]
pub struct ItemStore {
    items: Vec<WorkItem>,
    next_id: u64,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// ファイルを pending 状態で末尾に追加
    pub fn add(&mut self, files: Vec<SourceFile>) -> Vec<WorkItem> {
        let mut created = Vec::with_capacity(files.len());

        for source in files {
            self.next_id += 1;
            let preview = source.has_cheap_preview().then(|| source.path.clone());
            let item = WorkItem {
                id: ItemId(self.next_id),
                source,
                preview,
                status: ItemStatus::Pending,
            };
            created.push(item.clone());
            self.items.push(item);
        }

        created
    }

    pub fn remove(&mut self, id: ItemId) -> Result<WorkItem> {
        let index = self.index_of(id)?;
        Ok(self.items.remove(index))
    }

    /// 部分更新を適用して更新後のスナップショットを返す
    pub fn update(&mut self, id: ItemId, patch: ItemPatch) -> Result<WorkItem> {
        let index = self.index_of(id)?;
        let item = &mut self.items[index];
        let from = item.status.label();
        let action = patch.action();

        let invalid = || Error::InvalidTransition { id, from, action };
        let processing = item.status == ItemStatus::Processing;

        match patch {
            ItemPatch::Start if item.status.is_retryable() => {
                item.status = ItemStatus::Processing;
            }
            ItemPatch::Complete(result) if processing => {
                item.status = ItemStatus::Completed(result);
            }
            ItemPatch::Fail(detail) if processing => {
                item.status = ItemStatus::Error(detail);
            }
            ItemPatch::EditTitle(title) => {
                metadata_mut(&mut item.status).ok_or_else(invalid)?.title = title;
            }
            ItemPatch::EditDescription(desc) => {
                metadata_mut(&mut item.status).ok_or_else(invalid)?.description = desc;
            }
            ItemPatch::AddTags(tags) => {
                metadata_mut(&mut item.status).ok_or_else(invalid)?.add_tags(tags);
            }
            ItemPatch::EditPrompt(prompt) => match &mut item.status {
                ItemStatus::Completed(ItemResult::Prompt(p)) => p.prompt = prompt,
                _ => return Err(invalid()),
            },
            _ => return Err(invalid()),
        }

        Ok(item.clone())
    }

    /// 完了済みメタデータにタグを追加
    pub fn add_tags(&mut self, id: ItemId, tags: Vec<String>) -> Result<WorkItem> {
        self.update(id, ItemPatch::AddTags(tags))
    }

    pub fn get(&self, id: ItemId) -> Option<WorkItem> {
        self.items.iter().find(|i| i.id == id).cloned()
    }

    pub fn snapshot(&self) -> Vec<WorkItem> {
        self.items.clone()
    }

    pub fn completed(&self) -> Vec<WorkItem> {
        self.items
            .iter()
            .filter(|i| i.is_completed())
            .cloned()
            .collect()
    }

    /// 一括処理の対象ID（pending と error、挿入順）
    pub fn retryable_ids(&self) -> Vec<ItemId> {
        self.items
            .iter()
            .filter(|i| i.status.is_retryable())
            .map(|i| i.id)
            .collect()
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for item in &self.items {
            match item.status {
                ItemStatus::Pending => counts.pending += 1,
                ItemStatus::Processing => counts.processing += 1,
                ItemStatus::Completed(_) => counts.completed += 1,
                ItemStatus::Error(_) => counts.error += 1,
            }
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn index_of(&self, id: ItemId) -> Result<usize> {
        self.items
            .iter()
            .position(|i| i.id == id)
            .ok_or(Error::ItemNotFound(id))
    }
}

fn metadata_mut(status: &mut ItemStatus) -> Option<&mut VectorMetadata> {
    match status {
        ItemStatus::Completed(ItemResult::Metadata(m)) => Some(m),
        _ => None,
    }
}
