//! テスト用のスクリプト化トランスポート

#![allow(dead_code)]

use async_trait::async_trait;
use base64::Engine;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wine_diary::config::Config;
use wine_diary::error::{Result, WineDiaryError};
use wine_diary::gateway::{Gateway, Transport, WebhookRequest, WebhookResponse};
use wine_diary::photo::EncodedImage;
use wine_diary_common::build_data_url;

/// 1回分の応答
pub enum Scripted {
    Respond {
        status: u16,
        content_type: Option<&'static str>,
        body: String,
    },
    Fail(fn() -> WineDiaryError),
    /// 指定時間待ってから200を返す
    Hang(Duration),
}

impl Scripted {
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Scripted::Respond {
            status,
            content_type: Some("application/json"),
            body: body.into(),
        }
    }

    pub fn html(body: impl Into<String>) -> Self {
        Scripted::Respond {
            status: 200,
            content_type: Some("text/html"),
            body: body.into(),
        }
    }
}

#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<WebhookRequest>>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<WebhookRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: WebhookRequest) -> Result<WebhookResponse> {
        self.requests.lock().unwrap().push(request);
        let next = self.script.lock().unwrap().pop_front();

        match next {
            Some(Scripted::Respond { status, content_type, body }) => Ok(WebhookResponse {
                status,
                content_type: content_type.map(|s| s.to_string()),
                body,
            }),
            Some(Scripted::Fail(make)) => Err(make()),
            Some(Scripted::Hang(duration)) => {
                tokio::time::sleep(duration).await;
                Ok(WebhookResponse {
                    status: 200,
                    content_type: Some("application/json".into()),
                    body: "{}".into(),
                })
            }
            None => Err(WineDiaryError::Transport("script exhausted".into())),
        }
    }
}

pub fn test_config() -> Config {
    Config {
        list_url: Some("https://n8n.test/webhook/get-wines".into()),
        entry_url: Some("https://n8n.test".into()),
        analysis_url: Some("https://n8n.test/webhook/analyze-label".into()),
        retry_backoff_ms: 0,
        ..Config::default()
    }
}

pub fn gateway(script: Vec<Scripted>) -> (Gateway<ScriptedTransport>, ScriptedTransport) {
    let transport = ScriptedTransport::new(script);
    (Gateway::new(test_config(), transport.clone()), transport)
}

pub fn sample_image() -> EncodedImage {
    let payload = base64::engine::general_purpose::STANDARD.encode(b"fake-jpeg-bytes");
    EncodedImage {
        data_url: build_data_url("image/jpeg", &payload),
        width: 4,
        height: 3,
    }
}
