//! HTTP送信の抽象化
//!
//! ゲートウェイはこのトレイト越しにWebhookを呼び出す。
//! 本番は reqwest、テストはスクリプト化したモックを使う。

use crate::error::{Result, WineDiaryError};
use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Options,
}

/// multipartで送るファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(FilePart),
}

#[derive(Debug, Clone, PartialEq)]
pub struct WebhookRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
    /// None はトランスポート既定値に従う
    pub timeout: Option<Duration>,
}

impl WebhookRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: RequestBody::Empty,
            timeout: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl WebhookResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: WebhookRequest) -> Result<WebhookResponse>;
}

/// reqwestによる実装
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: WebhookRequest) -> Result<WebhookResponse> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Options => reqwest::Method::OPTIONS,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(file) => {
                let part = reqwest::multipart::Part::bytes(file.bytes)
                    .file_name(file.file_name)
                    .mime_str(&file.mime_type)
                    .map_err(|e| WineDiaryError::Transport(format!("MIMEタイプが不正: {}", e)))?;
                builder.multipart(reqwest::multipart::Form::new().part(file.field, part))
            }
        };

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                WineDiaryError::Timeout(request.timeout.map(|t| t.as_secs()).unwrap_or_default())
            } else {
                WineDiaryError::Transport(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                WineDiaryError::Timeout(request.timeout.map(|t| t.as_secs()).unwrap_or_default())
            } else {
                WineDiaryError::Transport(format!("レスポンス読み込み失敗: {}", e))
            }
        })?;

        Ok(WebhookResponse {
            status,
            content_type,
            body,
        })
    }
}
