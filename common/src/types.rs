//! 作業アイテムと解析結果の型定義
//!
//! - WorkItem: 入力ファイル1件と処理状態・結果
//! - ItemStatus: pending → processing → completed / error の状態機械
//! - ItemResult: ベクターメタデータ または 画像プロンプト
//! - TrendCategory: トレンドキーワードのカテゴリ

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// タイトルの推奨最大文字数（超過は警告のみ）
pub const TITLE_MAX_CHARS: usize = 70;

/// キーワード数の上限
pub const MAX_KEYWORDS: usize = 49;

/// 生成プロンプトの推奨最大文字数（超過は警告のみ、切り詰めない）
pub const PROMPT_SOFT_LIMIT: usize = 1000;

/// アイテムID（ストア内で単調増加、再利用しない）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 元ファイルへの参照（作成後は不変）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFile {
    pub path: PathBuf,
    pub name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

impl SourceFile {
    /// パスからファイル名とMIMEタイプを推定して作成
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let mime_type = guess_mime_type(&name).map(str::to_string);
        Self { path, name, mime_type }
    }

    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
    }

    /// SVG（ベクターXML）かどうか
    pub fn is_svg(&self) -> bool {
        self.mime_type.as_deref() == Some("image/svg+xml")
            || self.name.to_lowercase().ends_with(".svg")
    }

    /// そのまま表示可能なプレビューを持てる形式か（EPSは不可）
    pub fn has_cheap_preview(&self) -> bool {
        self.is_svg()
            || self
                .mime_type
                .as_deref()
                .map(|m| m.starts_with("image/"))
                .unwrap_or(false)
    }
}

/// 拡張子からMIMEタイプを推定
pub fn guess_mime_type(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name)
        .extension()?
        .to_string_lossy()
        .to_lowercase();
    match ext.as_str() {
        "svg" => Some("image/svg+xml"),
        "eps" | "ai" | "ps" => Some("application/postscript"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

/// ベクター素材のストックメタデータ
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorMetadata {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub tags: Vec<String>,
}

impl VectorMetadata {
    pub fn new(title: impl Into<String>, description: impl Into<String>, tags: Vec<String>) -> Self {
        let mut metadata = Self {
            title: title.into(),
            description: description.into(),
            tags: Vec::new(),
        };
        metadata.add_tags(tags);
        metadata
    }

    /// タグを末尾に追加（大文字小文字を無視して重複除去、上限まで）
    ///
    /// 追加された件数を返す
    pub fn add_tags<I, S>(&mut self, tags: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        append_unique(&mut self.tags, tags, MAX_KEYWORDS)
    }

    /// キーワードをカンマ区切りで連結
    pub fn keywords_joined(&self) -> String {
        self.tags.join(", ")
    }

    pub fn title_too_long(&self) -> bool {
        self.title.chars().count() > TITLE_MAX_CHARS
    }

    /// タグ列を順序を保ったまま正規化
    pub fn normalized(mut self) -> Self {
        let tags = std::mem::take(&mut self.tags);
        self.add_tags(tags);
        self
    }
}

/// 画像から抽出したプロンプト
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptResult {
    pub prompt: String,
    #[serde(default)]
    pub theme: Option<String>,
}

impl PromptResult {
    pub fn exceeds_soft_limit(&self) -> bool {
        self.prompt.chars().count() > PROMPT_SOFT_LIMIT
    }
}

/// 解析結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ItemResult {
    Metadata(VectorMetadata),
    Prompt(PromptResult),
}

impl ItemResult {
    pub fn as_metadata(&self) -> Option<&VectorMetadata> {
        match self {
            ItemResult::Metadata(m) => Some(m),
            ItemResult::Prompt(_) => None,
        }
    }

    pub fn as_prompt(&self) -> Option<&PromptResult> {
        match self {
            ItemResult::Prompt(p) => Some(p),
            ItemResult::Metadata(_) => None,
        }
    }
}

/// 処理状態
///
/// 結果は Completed のときだけ、エラー詳細は Error のときだけ存在する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "status", content = "detail")]
pub enum ItemStatus {
    Pending,
    Processing,
    Completed(ItemResult),
    Error(String),
}

impl ItemStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Processing => "processing",
            ItemStatus::Completed(_) => "completed",
            ItemStatus::Error(_) => "error",
        }
    }

    /// 一括処理の対象（未処理 or 失敗）
    pub fn is_retryable(&self) -> bool {
        matches!(self, ItemStatus::Pending | ItemStatus::Error(_))
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// 作業アイテム
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub id: ItemId,
    pub source: SourceFile,
    #[serde(default)]
    pub preview: Option<PathBuf>,
    #[serde(flatten)]
    pub status: ItemStatus,
}

impl WorkItem {
    pub fn file_name(&self) -> &str {
        &self.source.name
    }

    pub fn result(&self) -> Option<&ItemResult> {
        match &self.status {
            ItemStatus::Completed(result) => Some(result),
            _ => None,
        }
    }

    pub fn error_detail(&self) -> Option<&str> {
        match &self.status {
            ItemStatus::Error(detail) => Some(detail),
            _ => None,
        }
    }

    pub fn metadata(&self) -> Option<&VectorMetadata> {
        self.result().and_then(ItemResult::as_metadata)
    }

    pub fn prompt(&self) -> Option<&PromptResult> {
        self.result().and_then(ItemResult::as_prompt)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.status, ItemStatus::Completed(_))
    }
}

/// トレンドカテゴリ（読み取り専用）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendCategory {
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl TrendCategory {
    pub fn normalized(mut self) -> Self {
        let keywords = std::mem::take(&mut self.keywords);
        append_unique(&mut self.keywords, keywords, MAX_KEYWORDS);
        self
    }
}

fn append_unique<I, S>(target: &mut Vec<String>, incoming: I, cap: usize) -> usize
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: HashSet<String> = target.iter().map(|t| t.to_lowercase()).collect();
    let mut added = 0;

    for tag in incoming {
        if target.len() >= cap {
            break;
        }
        let tag = tag.as_ref().trim();
        if tag.is_empty() {
            continue;
        }
        if seen.insert(tag.to_lowercase()) {
            target.push(tag.to_string());
            added += 1;
        }
    }

    added
}
