//! テキストエクスポート（共通ライブラリ）
//!
//! - プロンプト: `File:` / `Theme:` / `Prompt:` のブロックを区切り線で連結
//! - トレンド: カテゴリごとのキーワード一覧レポート

use crate::types::{TrendCategory, WorkItem};

/// 区切り線の幅
pub const DIVIDER_WIDTH: usize = 40;

/// トレンドレポートの見出し
pub const TREND_REPORT_TITLE: &str = "STOCK AI - TRENDING KEYWORDS & INSPIRATION";

/// プロンプト1件分のブロック
pub fn format_prompt_block(file_name: &str, theme: Option<&str>, prompt: &str) -> String {
    let theme = theme.map(str::trim).filter(|t| !t.is_empty()).unwrap_or("None");
    format!("File: {}\nTheme: {}\nPrompt: {}\n", file_name, theme, prompt)
}

/// 完了済みプロンプトを連結したテキスト
pub fn build_prompt_text(items: &[WorkItem]) -> String {
    let separator = format!("\n{}\n\n", "-".repeat(DIVIDER_WIDTH));

    items
        .iter()
        .filter_map(|item| {
            item.prompt()
                .map(|p| format_prompt_block(item.file_name(), p.theme.as_deref(), &p.prompt))
        })
        .collect::<Vec<_>>()
        .join(&separator)
}

/// トレンドレポート
///
/// # Arguments
/// * `trends` - カテゴリ一覧
/// * `date` - レポート日付（表示用文字列）
pub fn build_trend_report(trends: &[TrendCategory], date: &str) -> String {
    let mut content = String::new();
    content.push_str(TREND_REPORT_TITLE);
    content.push('\n');
    content.push_str(&format!("Date: {}\n", date));
    content.push_str(&"=".repeat(DIVIDER_WIDTH));
    content.push_str("\n\n");

    for trend in trends {
        content.push_str(&format!("CATEGORY: {}\n", trend.category.to_uppercase()));
        content.push_str(&format!("WHY IT'S TRENDING: {}\n", trend.description));
        content.push_str(&format!("TARGET KEYWORDS: {}\n", trend.keywords.join(", ")));
        content.push_str(&"-".repeat(DIVIDER_WIDTH));
        content.push_str("\n\n");
    }

    content
}
