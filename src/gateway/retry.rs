//! リトライポリシー

use crate::error::{Result, WineDiaryError};
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 初回を含む最大試行回数
    pub max_attempts: u32,
    /// 再試行までの待ち時間（固定）
    pub backoff: Duration,
}

impl RetryPolicy {
    /// 再試行なし
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::ZERO,
        }
    }

    /// ラベル解析用: 1回だけ再試行
    pub fn analyze(backoff: Duration) -> Self {
        Self {
            max_attempts: 2,
            backoff,
        }
    }

    /// `op` を実行し、`is_retryable` が真を返すエラーの間だけ再試行する
    pub async fn run<T, F, Fut>(
        &self,
        mut op: F,
        is_retryable: impl Fn(&WineDiaryError) -> bool,
    ) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < max_attempts && is_retryable(&err) => {
                    tracing::warn!(
                        "試行 {}/{} 失敗、{}ms後に再試行: {}",
                        attempt,
                        max_attempts,
                        self.backoff.as_millis(),
                        err
                    );
                    if !self.backoff.is_zero() {
                        tokio::time::sleep(self.backoff).await;
                    }
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
