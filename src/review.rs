//! 対話式レビュー
//!
//! 完了済みメタデータを1件ずつ表示し、タイトル・説明文の編集とキーワード追加を受け付ける。
//! 変更はすべて `ItemStore::update` 経由で反映する。

use crate::error::{Result, StockAiError};
use dialoguer::Input;
use regex::Regex;
use stock_ai_common::{ItemId, ItemPatch, ItemStore, MAX_KEYWORDS, TITLE_MAX_CHARS};

lazy_static::lazy_static! {
    /// キーワード入力の区切り（カンマ、読点、改行）
    static ref TAG_SEPARATOR: Regex = Regex::new(r"[,、\n]+").unwrap();
}

/// 対話アクション
#[derive(Debug, PartialEq, Eq)]
pub enum ReviewAction {
    /// 次のアイテムへ
    Next,
    /// タイトルを置き換え
    Title(String),
    /// 説明文を置き換え
    Description(String),
    /// キーワードを追加
    AddTags(Vec<String>),
    /// レビュー終了
    Quit,
}

/// 入力文字列をキーワード列に分割（空要素は除外）
pub fn split_tags(input: &str) -> Vec<String> {
    TAG_SEPARATOR
        .split(input)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// 1行入力をアクションに変換
///
/// - 空 / `n`: 次へ
/// - `q`: 終了
/// - `t <title>`: タイトル変更
/// - `d <text>`: 説明文変更
/// - `+ <k1, k2>`: キーワード追加
pub fn parse_action(input: &str) -> ReviewAction {
    let trimmed = input.trim();

    match trimmed {
        "" | "n" => return ReviewAction::Next,
        "q" | "Q" => return ReviewAction::Quit,
        _ => {}
    }

    if let Some(title) = trimmed.strip_prefix("t ") {
        let title = title.trim();
        if !title.is_empty() {
            return ReviewAction::Title(title.to_string());
        }
    }

    if let Some(description) = trimmed.strip_prefix("d ") {
        let description = description.trim();
        if !description.is_empty() {
            return ReviewAction::Description(description.to_string());
        }
    }

    if let Some(tags) = trimmed.strip_prefix('+') {
        let tags = split_tags(tags);
        if !tags.is_empty() {
            return ReviewAction::AddTags(tags);
        }
    }

    ReviewAction::Next
}

/// 編集アクションをストアに反映し、表示用メッセージを返す
pub fn apply_edit(store: &mut ItemStore, id: ItemId, action: ReviewAction) -> Result<Option<String>> {
    let message = match action {
        ReviewAction::Next | ReviewAction::Quit => return Ok(None),
        ReviewAction::Title(title) => {
            store.update(id, ItemPatch::EditTitle(title))?;
            "タイトルを更新".to_string()
        }
        ReviewAction::Description(description) => {
            store.update(id, ItemPatch::EditDescription(description))?;
            "説明文を更新".to_string()
        }
        ReviewAction::AddTags(tags) => {
            let before = store
                .get(id)
                .and_then(|i| i.metadata().map(|m| m.tags.len()))
                .unwrap_or(0);
            let updated = store.add_tags(id, tags)?;
            let after = updated.metadata().map_or(before, |m| m.tags.len());
            format!("{}件追加", after - before)
        }
    };
    Ok(Some(message))
}

/// 完了済みメタデータを対話的にレビュー
pub fn run_interactive_review(store: &mut ItemStore) -> Result<()> {
    let ids: Vec<ItemId> = store
        .completed()
        .into_iter()
        .filter(|i| i.metadata().is_some())
        .map(|i| i.id)
        .collect();

    if ids.is_empty() {
        println!("レビュー対象のアイテムがありません");
        return Ok(());
    }

    println!("📝 メタデータレビュー: {}件", ids.len());
    println!("---");
    println!("操作: [Enter/n]次へ [t タイトル]タイトル変更 [d 説明文]説明文変更 [+ kw1, kw2]キーワード追加 [q]終了");
    println!("---\n");

    'items: for (count, &id) in ids.iter().enumerate() {
        loop {
            let Some(item) = store.get(id) else {
                continue 'items;
            };
            let Some(metadata) = item.metadata() else {
                continue 'items;
            };

            println!("[{}/{}] {}", count + 1, ids.len(), item.file_name());
            println!("  タイトル: {}", metadata.title);
            if metadata.title_too_long() {
                println!("  ⚠ タイトルが{}文字を超えています", TITLE_MAX_CHARS);
            }
            if !metadata.description.is_empty() {
                println!("  説明文: {}", metadata.description);
            }
            println!("  キーワード ({}/{}): {}", metadata.tags.len(), MAX_KEYWORDS, metadata.keywords_joined());

            let input: String = Input::new()
                .with_prompt(">")
                .allow_empty(true)
                .interact_text()
                .map_err(|e| StockAiError::Interactive(e.to_string()))?;

            match parse_action(&input) {
                ReviewAction::Next => {
                    println!();
                    continue 'items;
                }
                ReviewAction::Quit => {
                    println!("レビューを終了します");
                    break 'items;
                }
                action => {
                    if let Some(message) = apply_edit(store, id, action)? {
                        println!("  → {}\n", message);
                    }
                }
            }
        }
    }

    Ok(())
}
