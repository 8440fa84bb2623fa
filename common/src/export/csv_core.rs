//! ストックサイト向けCSV生成（共通ライブラリ）
//!
//! 完了済みアイテムのみを1行ずつ出力する。
//! 全フィールドをダブルクォートで囲み、内部の `"` は `""` にエスケープ。

use crate::error::{Error, Result};
use crate::types::{VectorMetadata, WorkItem};
use std::collections::HashSet;

/// ヘッダー行
pub const CSV_HEADERS: &[&str] = &["Filename", "Title", "Keywords", "Category", "Releases"];

/// 最後の拡張子を除いたファイル名
///
/// 拡張子がない場合や、ドットで始まるだけの名前はそのまま返す
pub fn base_name(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() && !ext.contains('/') => stem,
        _ => file_name,
    }
}

/// ベース名に出力拡張子を付ける
pub fn with_extension(base: &str, extension: &str) -> String {
    format!("{}.{}", base, extension.trim_start_matches('.'))
}

/// 拡張子を正規の出力拡張子に置き換えたファイル名
pub fn canonical_file_name(file_name: &str, extension: &str) -> String {
    with_extension(base_name(file_name), extension)
}

/// 出力先で衝突しないベース名の列
///
/// `flower.svg` と `flower.eps` のように同じベース名になる場合、
/// 2件目以降に `-2`, `-3` ... を付ける。大文字小文字違いも衝突とみなす。
pub fn unique_base_names<'a, I>(file_names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut used = HashSet::new();

    file_names
        .into_iter()
        .map(|name| {
            let base = base_name(name);
            let mut candidate = base.to_string();
            let mut n = 1;
            while !used.insert(candidate.to_lowercase()) {
                n += 1;
                candidate = format!("{}-{}", base, n);
            }
            candidate
        })
        .collect()
}

/// ファイル名を指定してCSV本文を生成
///
/// 行は `(Filename列の値, メタデータ)` の順で出力する
pub fn build_stock_csv_rows<'a, I>(rows: I) -> Result<String>
where
    I: IntoIterator<Item = (&'a str, &'a VectorMetadata)>,
{
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for (file_name, metadata) in rows {
        let keywords = metadata.keywords_joined();
        writer.write_record([file_name, metadata.title.as_str(), keywords.as_str(), "", ""])?;
    }

    let body = writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
    let body = String::from_utf8(body).map_err(|e| Error::Parse(e.to_string()))?;

    let mut content = CSV_HEADERS.join(",");
    if !body.is_empty() {
        content.push('\n');
        content.push_str(body.trim_end_matches('\n'));
    }
    Ok(content)
}

/// CSV本文を生成
///
/// # Arguments
/// * `items` - アイテム一覧（完了済みメタデータ以外は無視）
/// * `extension` - Filename列に使う拡張子（例: "eps"）
///
/// Filename列は `unique_base_names` で衝突を避けた名前になる
pub fn build_stock_csv(items: &[WorkItem], extension: &str) -> Result<String> {
    let rows: Vec<(&str, &VectorMetadata)> = items
        .iter()
        .filter_map(|item| item.metadata().map(|m| (item.file_name(), m)))
        .collect();

    let names: Vec<String> = unique_base_names(rows.iter().map(|(name, _)| *name))
        .iter()
        .map(|base| with_extension(base, extension))
        .collect();

    build_stock_csv_rows(names.iter().zip(&rows).map(|(name, (_, m))| (name.as_str(), *m)))
}
