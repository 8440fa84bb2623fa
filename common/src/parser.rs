//! APIレスポンスパーサー
//!
//! 生成モデルのレスポンスからJSONを抽出し、
//! ベクターメタデータ・トレンドカテゴリをパースする

use crate::error::{Error, Result};
use crate::types::{TrendCategory, VectorMetadata};

/// APIレスポンスからJSON部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック
/// 2. 最初に現れる `{` または `[` から対応する最後の閉じ括弧まで
/// 3. エラー
///
/// # Examples
/// ```
/// use stock_ai_common::extract_json;
///
/// let response = "Result: {\"title\": \"Cat\"} done";
/// let json = extract_json(response).unwrap();
/// assert_eq!(json, "{\"title\": \"Cat\"}");
/// ```
pub fn extract_json(response: &str) -> Result<&str> {
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + 7; // "```json" の長さ
        if let Some(end_offset) = response[start..].find("```") {
            let end = start + end_offset;
            return Ok(response[start..end].trim());
        }
    }

    let open = response.find(['{', '[']);
    if let Some(start) = open {
        let close = if response[start..].starts_with('{') { '}' } else { ']' };
        if let Some(end) = response.rfind(close) {
            if end > start {
                return Ok(&response[start..=end]);
            }
        }
    }

    Err(Error::Parse("JSON not found in response".into()))
}

/// ベクターメタデータのレスポンスをパース
///
/// タグは順序を保ったまま重複除去・上限適用される
pub fn parse_vector_metadata(response: &str) -> Result<VectorMetadata> {
    let json_str = extract_json(response)?;
    let metadata: VectorMetadata = serde_json::from_str(json_str)
        .map_err(|e| Error::Parse(format!("metadata JSON parse error: {}", e)))?;
    Ok(metadata.normalized())
}

/// トレンドカテゴリのレスポンスをパース
///
/// 空配列は正常な結果として扱う。
/// `{"trends": [...]}` のようにオブジェクトで包まれた形式も受け付ける
pub fn parse_trend_categories(response: &str) -> Result<Vec<TrendCategory>> {
    let json_str = extract_json(response)?;
    let value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| Error::Parse(format!("trends JSON parse error: {}", e)))?;

    let array = match value {
        serde_json::Value::Array(_) => value,
        serde_json::Value::Object(mut map) => map
            .values_mut()
            .find(|v| v.is_array())
            .map(std::mem::take)
            .ok_or_else(|| Error::Parse("trends array not found".into()))?,
        _ => return Err(Error::Parse("trends response is not an array".into())),
    };

    let trends: Vec<TrendCategory> = serde_json::from_value(array)
        .map_err(|e| Error::Parse(format!("trends JSON parse error: {}", e)))?;

    Ok(trends.into_iter().map(TrendCategory::normalized).collect())
}
