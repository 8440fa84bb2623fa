//! ラスタライズ処理
//!
//! ベクター（SVG）またはビットマップを、長辺の上限付きで
//! 白背景に合成したJPEGへ変換する。JPEGはアルファを持てないため
//! 透過部分は必ず白になる。

use crate::error::{Result, StockAiError};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{RgbImage, RgbaImage};
use resvg::tiny_skia::{Color, Pixmap, Transform};
use resvg::usvg::{Options, Tree};

/// ラスタライズ設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterSpec {
    /// 長辺の上限（px）
    pub max_dim: u32,
    /// JPEG品質 (0-100)
    pub quality: u8,
    /// 上限より小さい入力を拡大するか
    pub upscale: bool,
}

impl RasterSpec {
    /// 解析送信用: 1024px, 85%, 拡大しない
    pub const ANALYSIS: RasterSpec = RasterSpec {
        max_dim: 1024,
        quality: 85,
        upscale: false,
    };

    /// パッケージ用プレビュー: 長辺3000px, 95%
    pub const PREVIEW: RasterSpec = RasterSpec {
        max_dim: 3000,
        quality: 95,
        upscale: true,
    };

    /// 設定値の範囲チェック（長辺1px以上、品質1-100）
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.max_dim == 0 {
            return Err("長辺の上限は1px以上にしてください".into());
        }
        if !(1..=100).contains(&self.quality) {
            return Err(format!("JPEG品質は1-100で指定してください: {}", self.quality));
        }
        Ok(())
    }

    /// 縦横比を保った出力サイズ
    pub fn target_size(&self, width: f32, height: f32) -> (u32, u32) {
        let longest = width.max(height);
        if !(longest > 0.0) {
            return (self.max_dim, self.max_dim);
        }

        let mut scale = self.max_dim as f32 / longest;
        if !self.upscale {
            scale = scale.min(1.0);
        }

        let fit = |v: f32| ((v * scale).round() as u32).clamp(1, self.max_dim.max(1));
        (fit(width), fit(height))
    }
}

/// ラスタライズ結果
#[derive(Debug, Clone)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub jpeg: Vec<u8>,
}

/// SVGをJPEGに変換
pub fn rasterize_svg(svg: &[u8], spec: RasterSpec) -> Result<RasterImage> {
    spec.validate().map_err(StockAiError::Rasterization)?;

    let tree = Tree::from_data(svg, &Options::default())
        .map_err(|e| StockAiError::Rasterization(format!("SVGの解析に失敗: {}", e)))?;

    let size = tree.size();
    let (width, height) = spec.target_size(size.width(), size.height());

    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| StockAiError::Rasterization(format!("描画領域を確保できません: {}x{}", width, height)))?;
    pixmap.fill(Color::WHITE);

    let transform = Transform::from_scale(
        width as f32 / size.width(),
        height as f32 / size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    // 不透明な白で塗りつぶしてから描画しているので、乗算済みRGBAのRGBをそのまま使える
    let rgb: Vec<u8> = pixmap
        .data()
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();
    let image = RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| StockAiError::Rasterization("ピクセルデータの変換に失敗".into()))?;

    Ok(RasterImage {
        width,
        height,
        jpeg: encode_jpeg(&image, spec.quality)?,
    })
}

/// ビットマップ画像（PNG/JPEG/WebP等）をJPEGに変換
pub fn rasterize_bitmap(bytes: &[u8], spec: RasterSpec) -> Result<RasterImage> {
    spec.validate().map_err(StockAiError::Rasterization)?;

    let img = image::load_from_memory(bytes)
        .map_err(|e| StockAiError::Rasterization(format!("画像のデコードに失敗: {}", e)))?;

    let (width, height) = spec.target_size(img.width() as f32, img.height() as f32);
    let img = if (width, height) == (img.width(), img.height()) {
        img
    } else {
        img.resize_exact(width, height, FilterType::Lanczos3)
    };

    let image = flatten_on_white(&img.to_rgba8());

    Ok(RasterImage {
        width,
        height,
        jpeg: encode_jpeg(&image, spec.quality)?,
    })
}

fn flatten_on_white(rgba: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let blend = |c: u8| ((c as u32 * a as u32 + 255 * (255 - a as u32)) / 255) as u8;
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}

fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .encode_image(image)
        .map_err(|e| StockAiError::Rasterization(format!("JPEGエンコードに失敗: {}", e)))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;

    fn svg(width: u32, height: u32, body: &str) -> Vec<u8> {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">{body}</svg>"#,
            w = width,
            h = height,
            body = body
        )
        .into_bytes()
    }

    fn decoded_size(jpeg: &[u8]) -> (u32, u32) {
        image::load_from_memory(jpeg).expect("JPEGデコード失敗").dimensions()
    }

    #[test]
    fn test_target_size_downscales_to_cap() {
        assert_eq!(RasterSpec::ANALYSIS.target_size(4000.0, 2000.0), (1024, 512));
        assert_eq!(RasterSpec::ANALYSIS.target_size(1000.0, 3000.0), (341, 1024));
    }

    #[test]
    fn test_target_size_analysis_never_upscales() {
        assert_eq!(RasterSpec::ANALYSIS.target_size(200.0, 100.0), (200, 100));
    }

    #[test]
    fn test_target_size_preview_upscales() {
        assert_eq!(RasterSpec::PREVIEW.target_size(200.0, 100.0), (3000, 1500));
    }

    #[test]
    fn test_rasterize_large_svg_hits_cap() {
        let raster = rasterize_svg(&svg(4000, 2000, ""), RasterSpec::ANALYSIS).unwrap();
        assert_eq!((raster.width, raster.height), (1024, 512));
        assert_eq!(decoded_size(&raster.jpeg), (1024, 512));
    }

    #[test]
    fn test_rasterize_is_idempotent_in_size() {
        let input = svg(2500, 1800, r#"<circle cx="100" cy="100" r="50" fill="blue"/>"#);
        let first = rasterize_svg(&input, RasterSpec::ANALYSIS).unwrap();
        let second = rasterize_svg(&input, RasterSpec::ANALYSIS).unwrap();
        assert_eq!((first.width, first.height), (second.width, second.height));
        assert_eq!(first.width.max(first.height), 1024);
    }

    #[test]
    fn test_rasterize_small_svg_keeps_size() {
        let raster = rasterize_svg(&svg(300, 120, ""), RasterSpec::ANALYSIS).unwrap();
        assert_eq!((raster.width, raster.height), (300, 120));
    }

    #[test]
    fn test_transparent_svg_gets_white_background() {
        let raster = rasterize_svg(&svg(64, 64, ""), RasterSpec::ANALYSIS).unwrap();
        let decoded = image::load_from_memory(&raster.jpeg).unwrap().to_rgb8();
        let px = decoded.get_pixel(32, 32).0;
        assert!(px.iter().all(|&c| c >= 250), "背景が白ではない: {:?}", px);
    }

    #[test]
    fn test_svg_content_is_rendered() {
        let body = r##"<rect x="0" y="0" width="64" height="64" fill="#000000"/>"##;
        let raster = rasterize_svg(&svg(64, 64, body), RasterSpec::ANALYSIS).unwrap();
        let decoded = image::load_from_memory(&raster.jpeg).unwrap().to_rgb8();
        let px = decoded.get_pixel(32, 32).0;
        assert!(px.iter().all(|&c| c <= 10), "黒で描画されていない: {:?}", px);
    }

    #[test]
    fn test_malformed_svg_is_rasterization_error() {
        let result = rasterize_svg(b"<svg><not-closed", RasterSpec::ANALYSIS);
        assert!(matches!(result, Err(StockAiError::Rasterization(_))));
    }

    #[test]
    fn test_rasterize_bitmap_flattens_alpha() {
        let transparent = RgbaImage::from_pixel(20, 10, image::Rgba([0, 0, 0, 0]));
        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(transparent)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let spec = RasterSpec { max_dim: 40, quality: 90, upscale: true };
        let raster = rasterize_bitmap(&png, spec).unwrap();
        assert_eq!((raster.width, raster.height), (40, 20));

        let decoded = image::load_from_memory(&raster.jpeg).unwrap().to_rgb8();
        assert!(decoded.get_pixel(5, 5).0.iter().all(|&c| c >= 250));
    }

    #[test]
    fn test_validate_rejects_zero_dim_and_bad_quality() {
        assert!(RasterSpec::ANALYSIS.validate().is_ok());
        assert!(RasterSpec::PREVIEW.validate().is_ok());
        assert!(RasterSpec { max_dim: 0, ..RasterSpec::ANALYSIS }.validate().is_err());
        assert!(RasterSpec { quality: 0, ..RasterSpec::ANALYSIS }.validate().is_err());
        assert!(RasterSpec { quality: 101, ..RasterSpec::ANALYSIS }.validate().is_err());
    }

    #[test]
    fn test_zero_dim_is_error_not_panic() {
        let spec = RasterSpec { max_dim: 0, ..RasterSpec::PREVIEW };
        assert_eq!(spec.target_size(100.0, 50.0), (1, 1));

        let result = rasterize_svg(&svg(64, 64, ""), spec);
        assert!(matches!(result, Err(StockAiError::Rasterization(_))));

        let result = rasterize_bitmap(b"irrelevant", spec);
        assert!(matches!(result, Err(StockAiError::Rasterization(_))));
    }

    #[test]
    fn test_rasterize_bitmap_rejects_non_image() {
        let result = rasterize_bitmap(b"%!PS-Adobe-3.0 EPSF-3.0", RasterSpec::PREVIEW);
        assert!(matches!(result, Err(StockAiError::Rasterization(_))));
    }
}
