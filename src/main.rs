use clap::Parser;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::path::PathBuf;
use stock_ai_common::{ItemStatus, ItemStore, WorkItem};
use stock_ai_rust::analyzer::{AnalysisClient, GeminiClient};
use stock_ai_rust::cli::{Cli, Commands};
use stock_ai_rust::config::Config;
use stock_ai_rust::error::{Result, StockAiError};
use stock_ai_rust::export::{self, ArchiveOptions};
use stock_ai_rust::processor::{AnalysisTask, BatchProcessor, BatchSummary};
use stock_ai_rust::{review, scanner};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn progress_bar(len: u64, template: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::with_template(template) {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb
}

/// バッチ処理をプログレスバー付きで実行
async fn run_batch<C: AnalysisClient>(
    processor: &BatchProcessor<C>,
    store: &mut ItemStore,
) -> Result<BatchSummary> {
    let total = store.retryable_ids().len() as u64;
    let pb = progress_bar(total, "{bar:40.cyan/blue} {pos}/{len} {msg}");

    let summary = processor
        .process_all(store, |item: &WorkItem, done, _total| {
            pb.set_position(done as u64);
            match &item.status {
                ItemStatus::Error(detail) => {
                    pb.println(format!("✘ {}: {}", item.file_name(), detail));
                }
                _ => pb.set_message(item.file_name().to_string()),
            }
        })
        .await?;

    pb.finish_and_clear();
    println!(
        "✔ 完了 {}件 / 失敗 {}件",
        summary.completed, summary.failed
    );
    Ok(summary)
}

/// 失敗アイテムを手動で再試行（自動リトライはしない）
async fn offer_retry<C: AnalysisClient>(
    processor: &BatchProcessor<C>,
    store: &mut ItemStore,
) -> Result<()> {
    if !std::io::stdin().is_terminal() {
        return Ok(());
    }

    loop {
        let failed = store.counts().error;
        if failed == 0 {
            return Ok(());
        }

        let retry = Confirm::new()
            .with_prompt(format!("失敗した{}件を再試行しますか？", failed))
            .default(false)
            .interact()
            .map_err(|e| StockAiError::Interactive(e.to_string()))?;

        if !retry {
            return Ok(());
        }

        run_batch(processor, store).await?;
    }
}

fn load_store(folder: &std::path::Path, extensions: &[&str], recursive: bool) -> Result<ItemStore> {
    println!("[1/3] ファイルをスキャン中...");
    let files = scanner::scan_folder(folder, extensions, recursive)?;
    if files.is_empty() {
        return Err(StockAiError::NoFilesFound(folder.display().to_string()));
    }
    println!("✔ {}件のファイルを検出\n", files.len());

    let mut store = ItemStore::new();
    store.add(files);
    Ok(store)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Vector { folder, output, format, recursive, review } => {
            println!("🎨 stock-ai - ベクターメタデータ生成\n");

            let mut store = load_store(&folder, scanner::VECTOR_EXTENSIONS, recursive)?;

            println!("[2/3] AI解析中...");
            let client = GeminiClient::from_config(&config)?;
            let processor = BatchProcessor::new(client, AnalysisTask::VectorMetadata, config.analysis_spec()?);
            run_batch(&processor, &mut store).await?;
            offer_retry(&processor, &mut store).await?;

            if review {
                println!();
                review::run_interactive_review(&mut store)?;
            }

            println!("\n[3/3] エクスポート中...");
            let items = store.completed();
            if items.is_empty() {
                return Err(StockAiError::NoCompletedItems);
            }

            let output_dir = output.unwrap_or_else(|| folder.clone());
            let extension = config.canonical_extension.as_str();

            if format.includes_csv() {
                let path = export::output_path(&output_dir, export::CSV_FILE_NAME);
                export::save_csv(&items, extension, &path)?;
                println!("✔ CSV出力: {}", path.display());
            }

            if format.includes_zip() {
                let pb = progress_bar(100, "{bar:40.green/white} {pos}% パッケージ生成中");
                let options = ArchiveOptions {
                    extension,
                    preview: config.preview_spec()?,
                };
                let archive = export::build_archive(&items, options, |percent| {
                    pb.set_position(percent.round() as u64)
                })?;
                pb.finish_and_clear();

                let path = export::output_path(&output_dir, &export::archive_file_name(export::today()));
                export::save_archive(&archive, &path)?;
                println!("✔ ZIP出力: {}", path.display());
                for name in &archive.skipped_sources {
                    println!("  ⚠ 元ファイルを読み込めずスキップ: {}", name);
                }
                for name in &archive.skipped_previews {
                    println!("  ⚠ プレビュー生成をスキップ: {}", name);
                }
            }

            println!("\n✅ 完了");
        }

        Commands::Prompt { folder, output, theme, recursive } => {
            println!("🖼  stock-ai - プロンプト抽出\n");

            let mut store = load_store(&folder, scanner::IMAGE_EXTENSIONS, recursive)?;

            println!("[2/3] AI解析中...{}", theme.as_deref().map(|t| format!(" (テーマ: {})", t)).unwrap_or_default());
            let client = GeminiClient::from_config(&config)?;
            let processor = BatchProcessor::new(client, AnalysisTask::ImagePrompt { theme }, config.analysis_spec()?);
            run_batch(&processor, &mut store).await?;
            offer_retry(&processor, &mut store).await?;

            println!("\n[3/3] エクスポート中...");
            let items = store.completed();
            if items.is_empty() {
                return Err(StockAiError::NoCompletedItems);
            }

            for item in &items {
                if let Some(prompt) = item.prompt() {
                    if prompt.exceeds_soft_limit() {
                        println!("  ⚠ {}: プロンプトが{}文字です", item.file_name(), prompt.prompt.chars().count());
                    }
                }
            }

            let default_name = export::prompts_file_name(export::today());
            let path = export::output_path(&output.unwrap_or_else(|| folder.clone()), &default_name);
            export::save_prompt_text(&items, &path)?;
            println!("✔ TXT出力: {}", path.display());

            println!("\n✅ 完了");
        }

        Commands::Trends { output } => {
            println!("📈 stock-ai - トレンドキーワード\n");

            let client = GeminiClient::from_config(&config)?;
            let spinner = ProgressBar::new_spinner();
            spinner.set_message("トレンドを取得中...");
            spinner.enable_steady_tick(std::time::Duration::from_millis(120));
            let trends = client.get_trending_keywords().await;
            spinner.finish_and_clear();
            let trends = trends?;

            if trends.is_empty() {
                println!("トレンドが見つかりませんでした");
            }
            for trend in &trends {
                println!("■ {}", trend.category);
                println!("  {}", trend.description);
                println!("  {}\n", trend.keywords.join(", "));
            }

            let date = export::today();
            let path = export::output_path(
                &output.unwrap_or_else(|| PathBuf::from(".")),
                &export::trends_file_name(date),
            );
            export::save_trend_report(&trends, date, &path)?;
            println!("✔ TXT出力: {}", path.display());
        }

        Commands::Config { set_api_key, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                println!("設定:");
                println!("  パス: {}", Config::config_path()?.display());
                println!("  モデル: {}", config.model);
                println!("  API: {}", config.api_base_url);
                println!("  解析用画像: {}px / 品質{}", config.analysis_max_dim, config.analysis_quality);
                println!("  プレビュー: {}px / 品質{}", config.preview_max_dim, config.preview_quality);
                println!("  出力拡張子: {}", config.canonical_extension);
                println!("  APIキー: {}", if config.get_api_key().is_ok() { "設定済み" } else { "未設定" });
            }
        }
    }

    Ok(())
}
