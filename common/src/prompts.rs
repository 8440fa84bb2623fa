//! プロンプト生成モジュール
//!
//! - build_vector_metadata_prompt: ベクター素材のストックメタデータ生成
//! - build_image_prompt_prompt: 画像からのプロンプト逆生成（テーマ指定可）
//! - build_trends_prompt: トレンドキーワード提案

use crate::types::{MAX_KEYWORDS, PROMPT_SOFT_LIMIT, TITLE_MAX_CHARS};

/// 生成を依頼するキーワード数（上限より十分少なく）
pub const TARGET_KEYWORDS: usize = 40;

/// トレンドカテゴリ1件あたりのキーワード数
pub const TREND_KEYWORDS_PER_CATEGORY: usize = 10;

pub fn build_vector_metadata_prompt() -> String {
    format!(
        "Analyze this vector illustration and generate Adobe Stock metadata. \
         You must provide exactly: \
         1. A descriptive title (max {TITLE_MAX_CHARS} chars). \
         2. A description. \
         3. Exactly {TARGET_KEYWORDS} highly relevant keywords/tags \
         (max {MAX_KEYWORDS} total allowed, so {TARGET_KEYWORDS} is a safe target), \
         ordered by relevance and without duplicates. \
         Return the response strictly in JSON format."
    )
}

/// テーマは空白のみなら無視する
pub fn build_image_prompt_prompt(theme: Option<&str>) -> String {
    let mut prompt = String::from(
        "Describe this image in meticulous detail to create a high-quality text-to-image prompt. \
         Focus on composition, lighting, camera angle, textures, colors, and the specific artistic style. \
         Do not use conversational filler, just the prompt text.",
    );

    prompt.push_str(&format!(" Keep the prompt under {PROMPT_SOFT_LIMIT} characters."));

    if let Some(theme) = theme.map(str::trim).filter(|t| !t.is_empty()) {
        prompt.push_str(&format!(
            " Adapt the prompt to the following theme while keeping the original composition: {theme}."
        ));
    }

    prompt
}

pub fn build_trends_prompt(count: usize) -> String {
    format!(
        "You are a stock content market analyst. Identify {count} currently trending niches \
         for stock vector illustrations. For each niche return: \
         \"category\" (short name), \
         \"description\" (why it is trending, one or two sentences), \
         \"keywords\" ({TREND_KEYWORDS_PER_CATEGORY} high-performing search keywords, no duplicates). \
         Return ONLY a JSON array of these objects."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_metadata_prompt_mentions_limits() {
        let prompt = build_vector_metadata_prompt();
        assert!(prompt.contains("max 70 chars"));
        assert!(prompt.contains("Exactly 40"));
        assert!(prompt.contains("max 49"));
        assert!(prompt.contains("JSON"));
    }

    #[test]
    fn test_image_prompt_without_theme() {
        let prompt = build_image_prompt_prompt(None);
        assert!(prompt.contains("text-to-image prompt"));
        assert!(prompt.contains("under 1000 characters"));
        assert!(!prompt.contains("theme"));
    }

    #[test]
    fn test_image_prompt_with_theme() {
        let prompt = build_image_prompt_prompt(Some("  cyberpunk  "));
        assert!(prompt.contains("following theme"));
        assert!(prompt.contains("cyberpunk."));
    }

    #[test]
    fn test_image_prompt_blank_theme_ignored() {
        assert_eq!(build_image_prompt_prompt(Some("   ")), build_image_prompt_prompt(None));
    }

    #[test]
    fn test_trends_prompt() {
        let prompt = build_trends_prompt(6);
        assert!(prompt.contains("Identify 6"));
        assert!(prompt.contains("\"keywords\" (10"));
        assert!(prompt.contains("JSON array"));
    }
}
