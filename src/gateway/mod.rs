//! n8n Webhook連携
//!
//! 3つの操作を提供する:
//! - list_entries: コレクション一覧の取得
//! - submit_entry: ワイン記録の登録
//! - analyze_label: ラベル写真の解析（タイムアウト30秒、1回だけ再試行）

pub mod retry;
pub mod transport;

pub use retry::RetryPolicy;
pub use transport::{
    FilePart, Method, ReqwestTransport, RequestBody, Transport, WebhookRequest, WebhookResponse,
};

use crate::config::{Config, Endpoint};
use crate::error::{ProtocolKind, Result, WineDiaryError};
use crate::photo::{EncodedImage, JPEG_MIME};
use serde_json::Value;
use std::time::Duration;
use wine_diary_common::{AnalysisResult, WineSubmission};

/// multipartのフィールド名
pub const IMAGE_FIELD: &str = "data";
pub const IMAGE_FILE_NAME: &str = "image.jpg";

/// 疎通確認の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub endpoint: Endpoint,
    pub url: Option<String>,
    pub outcome: std::result::Result<u16, String>,
}

impl HealthStatus {
    pub fn is_reachable(&self) -> bool {
        self.outcome.is_ok()
    }
}

pub struct Gateway<T: Transport> {
    config: Config,
    transport: T,
}

impl Gateway<ReqwestTransport> {
    pub fn with_reqwest(config: Config) -> Self {
        Self::new(config, ReqwestTransport::new())
    }
}

impl<T: Transport> Gateway<T> {
    pub fn new(config: Config, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn request(&self, method: Method, url: String) -> WebhookRequest {
        let (name, value) = &self.config.bypass_header;
        WebhookRequest::new(method, url).header(name.clone(), value.clone())
    }

    /// コレクション一覧を取得
    pub async fn list_entries(&self) -> Result<Vec<AnalysisResult>> {
        let url = self.config.resolve_endpoint(Endpoint::List)?;
        tracing::debug!("一覧取得: {}", url);

        let request = self
            .request(Method::Get, url)
            .header("Accept", "application/json");
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(rejection(response));
        }

        let value = parse_json_body(&response)?;
        let Value::Array(items) = value else {
            return Err(WineDiaryError::protocol(
                ProtocolKind::UnexpectedShape,
                "一覧が配列ではありません",
            ));
        };

        let records = items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(AnalysisResult::from(map)),
                other => {
                    tracing::warn!("オブジェクトでない一覧要素をスキップ: {}", other);
                    None
                }
            })
            .collect::<Vec<_>>();

        tracing::info!("一覧取得完了: {}件", records.len());
        Ok(records)
    }

    /// ワイン記録を登録（自動リトライなし）
    pub async fn submit_entry(&self, submission: &WineSubmission) -> Result<()> {
        let url = self.config.resolve_endpoint(Endpoint::Entry)?;
        tracing::debug!("登録送信: {} ({})", url, submission.display_name());

        let request = self
            .request(Method::Post, url)
            .header("Content-Type", "application/json")
            .body(RequestBody::Json(serde_json::to_value(submission)?));
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(rejection(response));
        }

        tracing::info!("登録完了: {}", submission.display_name());
        Ok(())
    }

    /// ラベル写真を解析
    pub async fn analyze_label(&self, image: &EncodedImage) -> Result<AnalysisResult> {
        let url = self.config.resolve_endpoint(Endpoint::Analyze)?;
        let file = FilePart {
            field: IMAGE_FIELD.to_string(),
            file_name: IMAGE_FILE_NAME.to_string(),
            mime_type: JPEG_MIME.to_string(),
            bytes: image.jpeg_bytes()?,
        };
        let timeout = self.config.analyze_timeout();
        let policy = RetryPolicy::analyze(self.config.retry_backoff());

        policy
            .run(
                |attempt| {
                    let request = self
                        .request(Method::Post, url.clone())
                        .body(RequestBody::Multipart(file.clone()))
                        .timeout(timeout);
                    tracing::debug!("ラベル解析 (試行{}): {} bytes → {}", attempt, file.bytes.len(), url);
                    self.analyze_once(request, timeout)
                },
                WineDiaryError::is_retryable,
            )
            .await
    }

    async fn analyze_once(&self, request: WebhookRequest, timeout: Duration) -> Result<AnalysisResult> {
        let response = tokio::time::timeout(timeout, self.transport.send(request))
            .await
            .map_err(|_| WineDiaryError::Timeout(timeout.as_secs()))??;

        if !response.is_success() {
            return Err(rejection(response));
        }
        if response.body.trim().is_empty() {
            return Err(WineDiaryError::EmptyResponse);
        }

        let value = parse_json_body(&response)?;
        let result = AnalysisResult::from_value(value)
            .map_err(|e| WineDiaryError::protocol(ProtocolKind::UnexpectedShape, e.to_string()))?;

        tracing::debug!("解析結果: {:?}", result);
        Ok(result)
    }

    /// 各Webhookの疎通確認（2xx または 405 を到達とみなす）
    pub async fn health_check(&self) -> Vec<HealthStatus> {
        let mut statuses = Vec::new();

        for endpoint in Endpoint::ALL {
            let url = match self.config.resolve_endpoint(endpoint) {
                Ok(url) => url,
                Err(e) => {
                    statuses.push(HealthStatus {
                        endpoint,
                        url: None,
                        outcome: Err(e.to_string()),
                    });
                    continue;
                }
            };

            let request = self
                .request(Method::Options, url.clone())
                .timeout(Duration::from_secs(5));
            let outcome = match self.transport.send(request).await {
                Ok(response) if response.is_success() || response.status == 405 => Ok(response.status),
                Ok(response) => Err(format!("サーバー応答エラー: HTTP {}", response.status)),
                Err(e) => Err(e.to_string()),
            };

            statuses.push(HealthStatus {
                endpoint,
                url: Some(url),
                outcome,
            });
        }

        statuses
    }
}

fn rejection(response: WebhookResponse) -> WineDiaryError {
    WineDiaryError::RemoteRejection {
        status: response.status,
        body: response.body,
    }
}

/// HTMLが返った場合は設定ミスとして区別する
fn looks_like_markup(response: &WebhookResponse) -> bool {
    let is_html_type = response
        .content_type
        .as_deref()
        .map(|ct| ct.to_lowercase().contains("text/html"))
        .unwrap_or(false);
    is_html_type || response.body.trim_start().starts_with('<')
}

fn parse_json_body(response: &WebhookResponse) -> Result<Value> {
    if looks_like_markup(response) {
        let preview: String = response.body.chars().take(120).collect();
        return Err(WineDiaryError::protocol(ProtocolKind::Markup, preview));
    }

    serde_json::from_str(&response.body)
        .map_err(|e| WineDiaryError::protocol(ProtocolKind::InvalidJson, e.to_string()))
}
