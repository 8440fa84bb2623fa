use crate::encoder::RasterSpec;
use crate::error::{Result, StockAiError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base_url: String,
    pub analysis_max_dim: u32,
    pub analysis_quality: u8,
    pub preview_max_dim: u32,
    pub preview_quality: u8,
    pub canonical_extension: String,
    pub timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-3-flash-preview".into(),
            api_base_url: DEFAULT_API_BASE_URL.into(),
            analysis_max_dim: RasterSpec::ANALYSIS.max_dim,
            analysis_quality: RasterSpec::ANALYSIS.quality,
            preview_max_dim: RasterSpec::PREVIEW.max_dim,
            preview_quality: RasterSpec::PREVIEW.quality,
            canonical_extension: "eps".into(),
            timeout_seconds: 120,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.analysis_spec()?;
            config.preview_spec()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| StockAiError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("stock-ai").join("config.json"))
    }

    pub fn get_api_key(&self) -> Result<String> {
        // 環境変数を優先
        for var in ["GEMINI_API_KEY", "API_KEY"] {
            if let Ok(key) = std::env::var(var) {
                if !key.trim().is_empty() {
                    return Ok(key);
                }
            }
        }

        self.api_key.clone().ok_or(StockAiError::MissingApiKey)
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    /// 解析送信用のラスタライズ設定
    pub fn analysis_spec(&self) -> Result<RasterSpec> {
        checked(
            "analysis",
            RasterSpec {
                max_dim: self.analysis_max_dim,
                quality: self.analysis_quality,
                ..RasterSpec::ANALYSIS
            },
        )
    }

    /// パッケージ用プレビューのラスタライズ設定
    pub fn preview_spec(&self) -> Result<RasterSpec> {
        checked(
            "preview",
            RasterSpec {
                max_dim: self.preview_max_dim,
                quality: self.preview_quality,
                ..RasterSpec::PREVIEW
            },
        )
    }
}

fn checked(name: &str, spec: RasterSpec) -> Result<RasterSpec> {
    spec.validate()
        .map_err(|msg| StockAiError::Config(format!("{}_max_dim/{}_quality: {}", name, name, msg)))?;
    Ok(spec)
}
