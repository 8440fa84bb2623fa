//! ZIPパッケージ生成
//!
//! レイアウト:
//! - `metadata.csv`
//! - `eps/<base>.<ext>` 元ファイル
//! - `pin/<base>.jpg` 高解像度プレビュー
//!
//! 元ファイルを読めないアイテムは `eps/` と `pin/` を、
//! プレビュー生成に失敗したアイテムは `pin/` を省略して続行する。

use crate::encoder::{self, RasterSpec};
use crate::error::{Result, StockAiError};
use std::io::{Cursor, Write};
use stock_ai_common::export::{build_stock_csv_rows, unique_base_names, with_extension};
use stock_ai_common::WorkItem;
use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const METADATA_FILE: &str = "metadata.csv";
pub const SOURCE_DIR: &str = "eps";
pub const PREVIEW_DIR: &str = "pin";

#[derive(Debug, Clone, Copy)]
pub struct ArchiveOptions<'a> {
    /// 元ファイル・CSVで使う拡張子
    pub extension: &'a str,
    pub preview: RasterSpec,
}

impl Default for ArchiveOptions<'_> {
    fn default() -> Self {
        Self {
            extension: "eps",
            preview: RasterSpec::PREVIEW,
        }
    }
}

/// 生成結果
#[derive(Debug)]
pub struct ArchiveOutput {
    pub bytes: Vec<u8>,
    /// 元ファイルを読めずに `eps/` を省略したファイル名
    pub skipped_sources: Vec<String>,
    /// プレビュー生成をスキップしたファイル名
    pub skipped_previews: Vec<String>,
}

/// 完了済みアイテムをZIPにまとめる
///
/// 同じベース名のアイテムには `-2`, `-3` ... を付けて格納し、CSVのFilename列も同じ名前にする。
/// 元ファイルの読み込み・プレビュー生成の失敗は該当エントリを省略して続行する。
/// `on_progress` には各アイテム処理後に 0.0-100.0 の進捗率を渡す。
pub fn build_archive<F>(
    items: &[WorkItem],
    options: ArchiveOptions<'_>,
    mut on_progress: F,
) -> Result<ArchiveOutput>
where
    F: FnMut(f32),
{
    let completed: Vec<&WorkItem> = items.iter().filter(|i| i.metadata().is_some()).collect();

    if completed.is_empty() {
        return Err(StockAiError::NoCompletedItems);
    }

    let bases = unique_base_names(completed.iter().map(|i| i.file_name()));
    let source_names: Vec<String> = bases
        .iter()
        .map(|base| with_extension(base, options.extension))
        .collect();

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let file_options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let csv = build_stock_csv_rows(
        source_names
            .iter()
            .zip(&completed)
            .filter_map(|(name, item)| item.metadata().map(|m| (name.as_str(), m))),
    )?;
    add_entry(&mut zip, METADATA_FILE, csv.as_bytes(), file_options)?;

    let total = completed.len();
    let mut skipped_sources = Vec::new();
    let mut skipped_previews = Vec::new();

    for (i, item) in completed.iter().enumerate() {
        match encoder::read_source(&item.source) {
            Ok(bytes) => {
                let source_entry = format!("{}/{}", SOURCE_DIR, source_names[i]);
                add_entry(&mut zip, &source_entry, &bytes, file_options)?;

                match encoder::render_preview_bytes(&item.source, &bytes, options.preview) {
                    Ok(jpeg) => {
                        let preview_entry = format!("{}/{}", PREVIEW_DIR, with_extension(&bases[i], "jpg"));
                        add_entry(&mut zip, &preview_entry, &jpeg, file_options)?;
                        debug!("preview added: {}", preview_entry);
                    }
                    Err(e) => {
                        warn!("preview skipped for {}: {}", item.file_name(), e);
                        skipped_previews.push(item.file_name().to_string());
                    }
                }
            }
            Err(e) => {
                warn!("source skipped for {}: {}", item.file_name(), e);
                skipped_sources.push(item.file_name().to_string());
            }
        }

        on_progress(progress_percent(i + 1, total));
    }

    let cursor = zip.finish()?;

    Ok(ArchiveOutput {
        bytes: cursor.into_inner(),
        skipped_sources,
        skipped_previews,
    })
}

fn add_entry(
    zip: &mut ZipWriter<Cursor<Vec<u8>>>,
    name: &str,
    bytes: &[u8],
    options: SimpleFileOptions,
) -> Result<()> {
    zip.start_file(name, options)?;
    zip.write_all(bytes)
        .map_err(|e| StockAiError::Packaging(format!("{}: {}", name, e)))
}

/// 処理済み件数 / 全件数 を百分率で
fn progress_percent(done: usize, total: usize) -> f32 {
    if total == 0 {
        return 100.0;
    }
    (done as f32 / total as f32 * 100.0).min(100.0)
}
