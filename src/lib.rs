//! stock-ai-rust
//!
//! ストック素材向けのバッチツール。
//! ベクター素材のメタデータ生成、参考画像からのプロンプト抽出、
//! トレンドキーワード取得と、CSV/ZIP/TXT への書き出しを行う。

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod encoder;
pub mod error;
pub mod export;
pub mod processor;
pub mod review;
pub mod scanner;
