pub mod archive;

pub use archive::{build_archive, ArchiveOptions, ArchiveOutput};

use crate::error::Result;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use stock_ai_common::export::{build_prompt_text, build_stock_csv, build_trend_report};
use stock_ai_common::{TrendCategory, WorkItem};

pub const CSV_FILE_NAME: &str = "adobe_stock_metadata.csv";

pub fn archive_file_name(date: NaiveDate) -> String {
    format!("adobe_stock_package_{}.zip", date.format("%Y-%m-%d"))
}

pub fn prompts_file_name(date: NaiveDate) -> String {
    format!("prompts_{}.txt", date.format("%Y-%m-%d"))
}

pub fn trends_file_name(date: NaiveDate) -> String {
    format!("stock_trends_{}.txt", date.format("%Y-%m-%d"))
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// 出力先がディレクトリ（または拡張子なし）ならデフォルト名を付ける
pub fn output_path(output: &Path, default_name: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(default_name)
    } else {
        output.to_path_buf()
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, bytes)?;
    Ok(())
}

pub fn save_csv(items: &[WorkItem], extension: &str, path: &Path) -> Result<()> {
    write_file(path, build_stock_csv(items, extension)?.as_bytes())
}

pub fn save_archive(archive: &ArchiveOutput, path: &Path) -> Result<()> {
    write_file(path, &archive.bytes)
}

pub fn save_prompt_text(items: &[WorkItem], path: &Path) -> Result<()> {
    write_file(path, build_prompt_text(items).as_bytes())
}

pub fn save_trend_report(trends: &[TrendCategory], date: NaiveDate, path: &Path) -> Result<()> {
    let report = build_trend_report(trends, &date.format("%Y-%m-%d").to_string());
    write_file(path, report.as_bytes())
}
