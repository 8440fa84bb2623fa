//! CSV/ZIP/TXT出力の統合テスト

use std::io::{Cursor, Read};
use std::path::Path;
use stock_ai_common::{
    ItemPatch, ItemResult, ItemStore, PromptResult, SourceFile, TrendCategory, VectorMetadata,
    WorkItem,
};
use stock_ai_rust::encoder::RasterSpec;
use stock_ai_rust::error::StockAiError;
use stock_ai_rust::export::{self, ArchiveOptions};
use tempfile::tempdir;
use zip::ZipArchive;

const GOOD_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="50"><rect width="100" height="50" fill="blue"/></svg>"#;

/// 小さいプレビューで十分なテスト用設定
fn small_options() -> ArchiveOptions<'static> {
    ArchiveOptions {
        extension: "eps",
        preview: RasterSpec {
            max_dim: 64,
            ..RasterSpec::PREVIEW
        },
    }
}

fn completed_store(dir: &Path, files: &[(&str, &str, &str)]) -> ItemStore {
    let mut store = ItemStore::new();
    let sources = files
        .iter()
        .map(|(name, content, _)| {
            let path = dir.join(name);
            std::fs::write(&path, content).unwrap();
            SourceFile::from_path(path)
        })
        .collect();

    let created = store.add(sources);
    for (item, (_, _, title)) in created.iter().zip(files) {
        store.update(item.id, ItemPatch::Start).unwrap();
        let metadata = VectorMetadata::new(*title, "", vec!["icon".into(), "flat".into()]);
        store
            .update(item.id, ItemPatch::Complete(ItemResult::Metadata(metadata)))
            .unwrap();
    }
    store
}

fn entry_names(bytes: &[u8]) -> Vec<String> {
    let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    names
}

/// プレビュー失敗は該当アイテムの pin/ だけを省略する
#[test]
fn test_archive_skips_failed_preview_and_completes() {
    let dir = tempdir().unwrap();
    let store = completed_store(
        dir.path(),
        &[
            ("good.svg", GOOD_SVG, "Blue Rectangle"),
            ("broken.svg", "<svg><g></svg", "Broken Art"),
        ],
    );

    let mut progress = Vec::new();
    let output = export::build_archive(&store.completed(), small_options(), |p| progress.push(p)).unwrap();

    assert_eq!(
        entry_names(&output.bytes),
        vec!["eps/broken.eps", "eps/good.eps", "metadata.csv", "pin/good.jpg"]
    );
    assert_eq!(output.skipped_previews, vec!["broken.svg"]);
    assert!(output.skipped_sources.is_empty());
    assert_eq!(progress, vec![50.0, 100.0]);

    let mut archive = ZipArchive::new(Cursor::new(output.bytes.as_slice())).unwrap();

    let mut csv = String::new();
    archive.by_name("metadata.csv").unwrap().read_to_string(&mut csv).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "Filename,Title,Keywords,Category,Releases");
    assert_eq!(lines[1], r#""good.eps","Blue Rectangle","icon, flat","","""#);
    assert_eq!(lines[2], r#""broken.eps","Broken Art","icon, flat","","""#);

    // 元ファイルはそのままのバイト列
    let mut original = String::new();
    archive.by_name("eps/good.eps").unwrap().read_to_string(&mut original).unwrap();
    assert_eq!(original, GOOD_SVG);

    let mut jpeg = Vec::new();
    archive.by_name("pin/good.jpg").unwrap().read_to_end(&mut jpeg).unwrap();
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
}

/// 完了済みでないアイテムはパッケージに含めない
#[test]
fn test_archive_ignores_unfinished_items() {
    let dir = tempdir().unwrap();
    let mut store = completed_store(dir.path(), &[("done.svg", GOOD_SVG, "Done")]);
    let pending_path = dir.path().join("todo.svg");
    std::fs::write(&pending_path, GOOD_SVG).unwrap();
    store.add(vec![SourceFile::from_path(pending_path)]);

    let output = export::build_archive(&store.snapshot(), small_options(), |_| {}).unwrap();
    assert_eq!(
        entry_names(&output.bytes),
        vec!["eps/done.eps", "metadata.csv", "pin/done.jpg"]
    );
}

#[test]
fn test_archive_without_completed_items() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("a.svg");
    std::fs::write(&path, GOOD_SVG).unwrap();
    let mut store = ItemStore::new();
    store.add(vec![SourceFile::from_path(path)]);

    let result = export::build_archive(&store.snapshot(), small_options(), |_| {});
    assert!(matches!(result, Err(StockAiError::NoCompletedItems)));
}

/// 完了後に元ファイルが消えていても、そのアイテムだけ省略して続行する
#[test]
fn test_archive_skips_unreadable_source() {
    let dir = tempdir().unwrap();
    let store = completed_store(
        dir.path(),
        &[("gone.svg", GOOD_SVG, "Gone"), ("kept.svg", GOOD_SVG, "Kept")],
    );
    std::fs::remove_file(dir.path().join("gone.svg")).unwrap();

    let mut progress = Vec::new();
    let output = export::build_archive(&store.completed(), small_options(), |p| progress.push(p)).unwrap();

    assert_eq!(
        entry_names(&output.bytes),
        vec!["eps/kept.eps", "metadata.csv", "pin/kept.jpg"]
    );
    assert_eq!(output.skipped_sources, vec!["gone.svg"]);
    assert!(output.skipped_previews.is_empty());
    assert_eq!(progress, vec![50.0, 100.0]);
}

/// 同じベース名のファイルは連番を付けて両方格納し、CSVも同じ名前を使う
#[test]
fn test_archive_same_base_name_gets_suffix() {
    let dir = tempdir().unwrap();
    let store = completed_store(
        dir.path(),
        &[
            ("flower.eps", "%!PS-Adobe-3.0 EPSF-3.0", "Flower Outline"),
            ("flower.svg", GOOD_SVG, "Flower Filled"),
            ("tree.svg", GOOD_SVG, "Tree"),
        ],
    );

    let mut progress = Vec::new();
    let output = export::build_archive(&store.completed(), small_options(), |p| progress.push(p)).unwrap();

    assert_eq!(
        entry_names(&output.bytes),
        vec![
            "eps/flower-2.eps",
            "eps/flower.eps",
            "eps/tree.eps",
            "metadata.csv",
            "pin/flower-2.jpg",
            "pin/tree.jpg",
        ]
    );
    // EPSはプレビューを作れない
    assert_eq!(output.skipped_previews, vec!["flower.eps"]);
    assert_eq!(progress.last(), Some(&100.0));
    assert_eq!(progress.len(), 3);

    let mut archive = ZipArchive::new(Cursor::new(output.bytes.as_slice())).unwrap();
    let mut csv = String::new();
    archive.by_name("metadata.csv").unwrap().read_to_string(&mut csv).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[1], r#""flower.eps","Flower Outline","icon, flat","","""#);
    assert_eq!(lines[2], r#""flower-2.eps","Flower Filled","icon, flat","","""#);
    assert_eq!(lines[3], r#""tree.eps","Tree","icon, flat","","""#);

    let mut original = String::new();
    archive.by_name("eps/flower-2.eps").unwrap().read_to_string(&mut original).unwrap();
    assert_eq!(original, GOOD_SVG);
}

/// 単体のCSVもZIP内と同じ名前付けになる
#[test]
fn test_save_csv_matches_archive_names() {
    let dir = tempdir().unwrap();
    let store = completed_store(
        dir.path(),
        &[("flower.eps", "%!PS", "A"), ("flower.svg", GOOD_SVG, "B")],
    );

    let path = dir.path().join("out.csv");
    export::save_csv(&store.completed(), "eps", &path).unwrap();
    let csv = std::fs::read_to_string(&path).unwrap();
    assert!(csv.contains(r#""flower-2.eps","B""#));
}

#[test]
fn test_save_csv_escapes_quotes() {
    let dir = tempdir().unwrap();
    let store = completed_store(dir.path(), &[("quote.svg", GOOD_SVG, r#"He said "hi""#)]);

    let path = export::output_path(dir.path(), export::CSV_FILE_NAME);
    export::save_csv(&store.completed(), "eps", &path).unwrap();

    let csv = std::fs::read_to_string(&path).unwrap();
    assert!(csv.ends_with(r#""quote.eps","He said ""hi""","icon, flat","","""#));
}

#[test]
fn test_save_prompt_text() {
    let dir = tempdir().unwrap();
    let items: Vec<WorkItem> = ["a.png", "b.png"]
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let mut store = ItemStore::new();
            let item = store.add(vec![SourceFile::from_path(dir.path().join(name))]).remove(0);
            store.update(item.id, ItemPatch::Start).unwrap();
            let prompt = PromptResult {
                prompt: format!("prompt {}", i + 1),
                theme: (i == 0).then(|| "spring".to_string()),
            };
            store
                .update(item.id, ItemPatch::Complete(ItemResult::Prompt(prompt)))
                .unwrap()
        })
        .collect();

    let path = dir.path().join("prompts.txt");
    export::save_prompt_text(&items, &path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let expected = format!(
        "File: a.png\nTheme: spring\nPrompt: prompt 1\n\n{}\n\nFile: b.png\nTheme: None\nPrompt: prompt 2\n",
        "-".repeat(40)
    );
    assert_eq!(text, expected);
}

#[test]
fn test_save_trend_report() {
    let dir = tempdir().unwrap();
    let trends = vec![TrendCategory {
        category: "Eco Living".into(),
        description: "Sustainability stays popular".into(),
        keywords: vec!["recycle".into(), "green".into()],
    }];
    let date = chrono::NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
    let path = export::output_path(dir.path(), &export::trends_file_name(date));
    export::save_trend_report(&trends, date, &path).unwrap();

    assert!(path.ends_with("stock_trends_2026-10-18.txt"));
    let report = std::fs::read_to_string(&path).unwrap();
    assert!(report.contains("Date: 2026-10-18"));
    assert!(report.contains("CATEGORY: ECO LIVING"));
    assert!(report.contains("recycle, green"));
}
