use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stock-ai")]
#[command(about = "ストック素材向けメタデータ生成・プロンプト抽出ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// ベクター素材（SVG/EPS）のタイトル・キーワードを生成
    Vector {
        /// 素材フォルダのパス
        #[arg(required = true)]
        folder: PathBuf,

        /// 出力ディレクトリ（デフォルト: 入力フォルダ）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 出力形式 (csv/zip/both)
        #[arg(short, long, default_value = "both")]
        format: ExportFormat,

        /// サブフォルダも再帰的にスキャン
        #[arg(short = 'r', long)]
        recursive: bool,

        /// 出力前に対話的にタイトル・キーワードを編集
        #[arg(long)]
        review: bool,
    },

    /// 参考画像から画像生成プロンプトを抽出
    Prompt {
        /// 画像フォルダのパス
        #[arg(required = true)]
        folder: PathBuf,

        /// 出力TXTファイル（デフォルト: 入力フォルダ/prompts_<日付>.txt）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// テーマ（プロンプトの方向性を指定）
        #[arg(short, long)]
        theme: Option<String>,

        /// サブフォルダも再帰的にスキャン
        #[arg(short = 'r', long)]
        recursive: bool,
    },

    /// トレンドキーワードを取得
    Trends {
        /// 出力TXTファイル（デフォルト: ./stock_trends_<日付>.txt）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Zip,
    #[default]
    Both,
}

impl ExportFormat {
    pub fn includes_csv(&self) -> bool {
        matches!(self, ExportFormat::Csv | ExportFormat::Both)
    }

    pub fn includes_zip(&self) -> bool {
        matches!(self, ExportFormat::Zip | ExportFormat::Both)
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "zip" => Ok(ExportFormat::Zip),
            "both" => Ok(ExportFormat::Both),
            _ => Err(format!("Unknown format: {}. Use csv, zip, or both", s)),
        }
    }
}
