//! エンコードアダプタ
//!
//! 入力ファイルを生成モデルに送れる `EncodedPayload`（Base64 + MIME）へ変換する。
//! SVGはモデルが直接扱えないため、JPEGにラスタライズしてから送る。

mod raster;

pub use raster::{rasterize_bitmap, rasterize_svg, RasterImage, RasterSpec};

use crate::error::{Result, StockAiError};
use base64::{engine::general_purpose::STANDARD, Engine};
use stock_ai_common::SourceFile;
use tracing::debug;

/// MIMEタイプ不明時のデフォルト
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// 生成モデルに送る画像データ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    /// Base64エンコード済みデータ
    pub data: String,
    pub mime_type: String,
}

/// 元ファイルを読み込む
pub fn read_source(source: &SourceFile) -> Result<Vec<u8>> {
    std::fs::read(&source.path).map_err(|e| StockAiError::Read {
        path: source.path.clone(),
        source: e,
    })
}

/// 解析送信用にエンコード
///
/// - SVG: `spec` に従ってJPEGへラスタライズ
/// - それ以外: バイト列をそのままBase64化（MIMEは宣言値、なければ image/jpeg）
pub fn encode(source: &SourceFile, spec: RasterSpec) -> Result<EncodedPayload> {
    let bytes = read_source(source)?;

    if source.is_svg() {
        let raster = rasterize_svg(&bytes, spec)?;
        debug!(
            "rasterized {} to {}x{} ({} bytes)",
            source.name,
            raster.width,
            raster.height,
            raster.jpeg.len()
        );
        return Ok(EncodedPayload {
            data: STANDARD.encode(&raster.jpeg),
            mime_type: "image/jpeg".into(),
        });
    }

    Ok(EncodedPayload {
        data: STANDARD.encode(&bytes),
        mime_type: source
            .mime_type
            .clone()
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.into()),
    })
}

/// パッケージ用の高解像度JPEGプレビューを生成
///
/// SVGはベクターとして描画、ビットマップはデコードして再エンコード。
/// どちらでもない形式（EPS等）は `Rasterization` エラー。
pub fn render_preview(source: &SourceFile, spec: RasterSpec) -> Result<Vec<u8>> {
    let bytes = read_source(source)?;
    render_preview_bytes(source, &bytes, spec)
}

/// 読み込み済みのバイト列からプレビューを生成
pub fn render_preview_bytes(source: &SourceFile, bytes: &[u8], spec: RasterSpec) -> Result<Vec<u8>> {
    let raster = if source.is_svg() {
        rasterize_svg(bytes, spec)?
    } else {
        rasterize_bitmap(bytes, spec)?
    };

    Ok(raster.jpeg)
}
