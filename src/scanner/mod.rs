use crate::error::{Result, StockAiError};
use std::path::Path;
use stock_ai_common::SourceFile;
use walkdir::WalkDir;

/// ベクター素材として扱う拡張子
pub const VECTOR_EXTENSIONS: &[&str] = &["svg", "eps"];

/// プロンプト抽出の対象にする拡張子
pub const IMAGE_EXTENSIONS: &[&str] = &["svg", "jpg", "jpeg", "png", "webp"];

/// フォルダ内の対象ファイルを列挙
///
/// # Arguments
/// * `folder` - 入力フォルダ
/// * `extensions` - 対象拡張子（小文字、大文字小文字は区別しない）
/// * `recursive` - サブフォルダも探索するか
pub fn scan_folder(folder: &Path, extensions: &[&str], recursive: bool) -> Result<Vec<SourceFile>> {
    if !folder.is_dir() {
        return Err(StockAiError::FolderNotFound(folder.display().to_string()));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() || !has_extension(path, extensions) {
            continue;
        }

        files.push(SourceFile::from_path(path));
    }

    // ファイル名でソート（同名はパス順）
    files.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.path.cmp(&b.path)));

    Ok(files)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .map(|ext| extensions.contains(&ext.as_str()))
        .unwrap_or(false)
}
