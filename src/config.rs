use crate::error::{Result, WineDiaryError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 一覧取得URLの環境変数
pub const ENV_LIST_URL: &str = "N8N_LIST_URL";
/// 登録URLの環境変数
pub const ENV_ENTRY_URL: &str = "N8N_WEBHOOK_URL";
/// ラベル解析URLの環境変数
pub const ENV_ANALYSIS_URL: &str = "N8N_ANALYSIS_WEBHOOK_URL";

/// フルURLとみなすパス
const WEBHOOK_MARKER: &str = "/webhook/";

/// Webhookの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    List,
    Entry,
    Analyze,
}

impl Endpoint {
    pub const ALL: [Endpoint; 3] = [Endpoint::List, Endpoint::Entry, Endpoint::Analyze];

    /// ベースURLに付与するパス
    pub fn suffix(&self) -> &'static str {
        match self {
            Endpoint::List => "get-wines",
            Endpoint::Entry => "wine-entry",
            Endpoint::Analyze => "analyze-label",
        }
    }

    pub fn env_var(&self) -> &'static str {
        match self {
            Endpoint::List => ENV_LIST_URL,
            Endpoint::Entry => ENV_ENTRY_URL,
            Endpoint::Analyze => ENV_ANALYSIS_URL,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Endpoint::List => "Wine List API",
            Endpoint::Entry => "Wine Entry API",
            Endpoint::Analyze => "Label Analysis API",
        }
    }
}

/// 画像正規化の設定
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageOptions {
    /// 最大幅（px）
    pub max_width: u32,
    /// JPEG品質 (0.0-1.0)
    pub jpeg_quality: f32,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            max_width: 1024,
            jpeg_quality: 0.7,
        }
    }
}

impl ImageOptions {
    /// エンコーダに渡す品質 (1-100)
    pub fn quality_percent(&self) -> u8 {
        (self.jpeg_quality * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub list_url: Option<String>,
    pub entry_url: Option<String>,
    pub analysis_url: Option<String>,
    pub image: ImageOptions,
    pub analyze_timeout_seconds: u64,
    pub retry_backoff_ms: u64,
    /// Webhook前段のゲートウェイが要求するヘッダー（名前, 値）
    pub bypass_header: (String, String),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            list_url: None,
            entry_url: None,
            analysis_url: None,
            image: ImageOptions::default(),
            analyze_timeout_seconds: 30,
            retry_backoff_ms: 1000,
            bypass_header: ("ngrok-skip-browser-warning".into(), "true".into()),
        }
    }
}

impl Config {
    /// 設定ファイル → .env → 環境変数 の順に読み込む
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::load_layered(&Self::config_path()?, |key| std::env::var(key).ok())
    }

    /// ファイルを読み込んでから環境変数で上書き
    pub fn load_layered(path: &Path, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::load_from(path)?;
        config.apply_env(lookup);
        Ok(config)
    }

    /// 指定パスから読み込み（無ければデフォルト）
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// 画像・タイムアウト設定の値域を検査
    pub fn validate(&self) -> Result<()> {
        if self.image.max_width == 0 {
            return Err(WineDiaryError::Configuration(
                "image.max_width は 1 以上を指定してください".into(),
            ));
        }
        let quality = self.image.jpeg_quality;
        if !quality.is_finite() || quality <= 0.0 || quality > 1.0 {
            return Err(WineDiaryError::Configuration(format!(
                "image.jpeg_quality は 0より大きく1以下で指定してください: {}",
                quality
            )));
        }
        if self.analyze_timeout_seconds == 0 {
            return Err(WineDiaryError::Configuration(
                "analyze_timeout_seconds は 1 以上を指定してください".into(),
            ));
        }
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| WineDiaryError::Configuration("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("wine-diary").join("config.json"))
    }

    /// 環境変数で上書き（空文字は無視）
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for endpoint in Endpoint::ALL {
            if let Some(value) = lookup(endpoint.env_var()).filter(|v| !v.trim().is_empty()) {
                *self.endpoint_slot(endpoint) = Some(value);
            }
        }
    }

    pub fn endpoint_value(&self, endpoint: Endpoint) -> Option<&str> {
        match endpoint {
            Endpoint::List => self.list_url.as_deref(),
            Endpoint::Entry => self.entry_url.as_deref(),
            Endpoint::Analyze => self.analysis_url.as_deref(),
        }
    }

    fn endpoint_slot(&mut self, endpoint: Endpoint) -> &mut Option<String> {
        match endpoint {
            Endpoint::List => &mut self.list_url,
            Endpoint::Entry => &mut self.entry_url,
            Endpoint::Analyze => &mut self.analysis_url,
        }
    }

    /// 設定ファイルのURLだけを書き換えて保存
    ///
    /// 環境変数の値はファイルに書き込まない。
    pub fn update_endpoints(path: &Path, updates: &[(Endpoint, String)]) -> Result<Self> {
        let mut stored = Self::load_from(path)?;
        for (endpoint, url) in updates {
            *stored.endpoint_slot(*endpoint) = Some(url.clone());
        }
        stored.save_to(path)?;
        Ok(stored)
    }

    /// Webhookの送信先URLを解決
    pub fn resolve_endpoint(&self, endpoint: Endpoint) -> Result<String> {
        resolve_endpoint_url(self.endpoint_value(endpoint), endpoint)
    }

    pub fn analyze_timeout(&self) -> Duration {
        Duration::from_secs(self.analyze_timeout_seconds)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// 設定値からURLを組み立てる
///
/// `/webhook/` を含めばそのまま使い、含まなければベースURLとして
/// `/webhook/<suffix>` を付与する。
pub fn resolve_endpoint_url(value: Option<&str>, endpoint: Endpoint) -> Result<String> {
    let value = value.map(str::trim).filter(|v| !v.is_empty()).ok_or_else(|| {
        WineDiaryError::Configuration(format!(
            "{} の環境変数 {} が設定されていません",
            endpoint.label(),
            endpoint.env_var()
        ))
    })?;

    if value.contains(WEBHOOK_MARKER) {
        return Ok(value.to_string());
    }

    let base = value.trim_end_matches('/');
    Ok(format!("{}{}{}", base, WEBHOOK_MARKER, endpoint.suffix()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_full_url_verbatim() {
        let url = resolve_endpoint_url(Some("https://n8n.example.com/webhook/custom-list"), Endpoint::List).unwrap();
        assert_eq!(url, "https://n8n.example.com/webhook/custom-list");
    }

    #[test]
    fn test_resolve_base_url_appends_suffix() {
        let url = resolve_endpoint_url(Some("https://n8n.example.com/"), Endpoint::Analyze).unwrap();
        assert_eq!(url, "https://n8n.example.com/webhook/analyze-label");

        let url = resolve_endpoint_url(Some("https://n8n.example.com"), Endpoint::Entry).unwrap();
        assert_eq!(url, "https://n8n.example.com/webhook/wine-entry");
    }

    #[test]
    fn test_resolve_missing_is_configuration_error() {
        let err = resolve_endpoint_url(None, Endpoint::List).unwrap_err();
        assert!(matches!(err, WineDiaryError::Configuration(_)));
        assert!(err.to_string().contains(ENV_LIST_URL));

        let err = resolve_endpoint_url(Some("   "), Endpoint::Entry).unwrap_err();
        assert!(matches!(err, WineDiaryError::Configuration(_)));
    }

    #[test]
    fn test_missing_endpoint_only_affects_that_operation() {
        let config = Config {
            list_url: Some("https://n8n.example.com".into()),
            ..Default::default()
        };
        assert!(config.resolve_endpoint(Endpoint::List).is_ok());
        assert!(config.resolve_endpoint(Endpoint::Analyze).is_err());
    }

    #[test]
    fn test_apply_env_overrides_and_ignores_blank() {
        let mut config = Config {
            list_url: Some("https://file.example.com".into()),
            entry_url: Some("https://file.example.com".into()),
            ..Default::default()
        };
        config.apply_env(|key| match key {
            ENV_LIST_URL => Some("https://env.example.com".into()),
            ENV_ENTRY_URL => Some("".into()),
            _ => None,
        });
        assert_eq!(config.list_url.as_deref(), Some("https://env.example.com"));
        assert_eq!(config.entry_url.as_deref(), Some("https://file.example.com"));
        assert_eq!(config.analysis_url, None);
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.image.max_width, 1024);
        assert_eq!(config.image.quality_percent(), 70);
        assert_eq!(config.analyze_timeout(), Duration::from_secs(30));
        assert_eq!(config.retry_backoff(), Duration::from_secs(1));
        assert_eq!(config.bypass_header.0, "ngrok-skip-browser-warning");
    }
}
