use crate::error::{PlantScanError, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// PDFの返し方
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// メモリ上で生成してそのまま返す
    #[default]
    Memory,
    /// 一時ファイルに書き出してストリーム送信後に削除
    TempFile,
}

impl std::fmt::Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputMode::Memory => write!(f, "memory"),
            OutputMode::TempFile => write!(f, "temp-file"),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base_url: String,
    pub temperature: Option<f32>,
    pub timeout_seconds: u64,
    pub image_fetch_timeout_seconds: u64,
    /// PDF埋め込み前に縮小する長辺の上限（px）
    pub max_image_size: u32,
    pub max_upload_bytes: usize,
    pub host: String,
    pub port: u16,
    pub output_mode: OutputMode,
    /// temp-file モードの出力先（未指定ならOSの一時ディレクトリ）
    pub output_dir: Option<PathBuf>,
    /// 静的ファイル（クライアントページ）のディレクトリ
    pub public_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

// APIキーはログに出さない
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .field("temperature", &self.temperature)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("image_fetch_timeout_seconds", &self.image_fetch_timeout_seconds)
            .field("max_image_size", &self.max_image_size)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("output_mode", &self.output_mode)
            .field("output_dir", &self.output_dir)
            .field("public_dir", &self.public_dir)
            .finish()
    }
}

impl Config {
    /// 設定ファイルを読み込み、環境変数で上書き
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str::<Config>(&content)?
        } else {
            Self::default_config()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
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
            .ok_or_else(|| PlantScanError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("plant-scan").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-pro".into(),
            api_base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            temperature: None,
            timeout_seconds: 120,
            image_fetch_timeout_seconds: 15,
            max_image_size: 1600,
            max_upload_bytes: 10 * 1024 * 1024,
            host: "0.0.0.0".into(),
            port: 5000,
            output_mode: OutputMode::Memory,
            output_dir: None,
            public_dir: None,
        }
    }

    /// 環境変数による上書き（GEMINI_API_KEY, GEMINI_MODEL, PORT）
    pub fn apply_env_overrides<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = var("GEMINI_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key.trim().to_string());
        }
        if let Some(model) = var("GEMINI_MODEL").filter(|m| !m.trim().is_empty()) {
            self.model = model.trim().to_string();
        }
        if let Some(port) = var("PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| PlantScanError::Config(format!("invalid PORT: {}", port)))?;
        }
        Ok(())
    }

    pub fn get_api_key(&self) -> Result<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(PlantScanError::MissingApiKey)
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    pub fn analysis_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn image_fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.image_fetch_timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.port, 5000);
        assert_eq!(config.output_mode, OutputMode::Memory);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert!(matches!(config.get_api_key(), Err(PlantScanError::MissingApiKey)));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.api_key = Some("from-file".into());
        config
            .apply_env_overrides(env(&[
                ("GEMINI_API_KEY", "from-env"),
                ("GEMINI_MODEL", "gemini-2.5-flash"),
                ("PORT", "8080"),
            ]))
            .unwrap();
        assert_eq!(config.get_api_key().unwrap(), "from-env");
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_invalid_port() {
        let mut config = Config::default();
        let result = config.apply_env_overrides(env(&[("PORT", "eighty")]));
        assert!(matches!(result, Err(PlantScanError::Config(_))));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"model": "gemini-2.5-flash", "output_mode": "temp-file"}"#)
                .unwrap();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.output_mode, OutputMode::TempFile);
        assert_eq!(config.timeout_seconds, 120);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let mut config = Config::default();
        config.api_key = Some("super-secret-key".into());
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret-key"));
        assert!(debug.contains("***"));
    }
}
