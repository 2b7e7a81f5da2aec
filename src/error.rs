use thiserror::Error;

/// プロトコルエラーの詳細
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolKind {
    /// JSONではなくHTMLが返った（Webhook URLの設定ミスを示す）
    Markup,
    /// JSONとして解析できない
    InvalidJson,
    /// JSONだが期待した形ではない
    UnexpectedShape,
}

impl std::fmt::Display for ProtocolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtocolKind::Markup => write!(f, "JSONではなくHTMLが返されました"),
            ProtocolKind::InvalidJson => write!(f, "JSONとして解析できません"),
            ProtocolKind::UnexpectedShape => write!(f, "レスポンスの形式が不正です"),
        }
    }
}

#[derive(Error, Debug)]
pub enum WineDiaryError {
    #[error("設定エラー: {0}")]
    Configuration(String),

    #[error("通信エラー: {0}")]
    Transport(String),

    #[error("プロトコルエラー ({kind}): {detail}")]
    Protocol { kind: ProtocolKind, detail: String },

    #[error("サーバーが要求を拒否しました (HTTP {status}): {body}")]
    RemoteRejection { status: u16, body: String },

    #[error("タイムアウト ({0}秒)")]
    Timeout(u64),

    #[error("解析サーバーから空のレスポンスが返されました")]
    EmptyResponse,

    #[error("入力エラー: {0}")]
    Validation(String),

    #[error("画像読み込みエラー: {0}")]
    Decode(String),

    #[error("入力操作エラー: {0}")]
    Prompt(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

impl WineDiaryError {
    pub fn protocol(kind: ProtocolKind, detail: impl Into<String>) -> Self {
        WineDiaryError::Protocol {
            kind,
            detail: detail.into(),
        }
    }

    /// HTTPステータス（リモート拒否のみ）
    pub fn status(&self) -> Option<u16> {
        match self {
            WineDiaryError::RemoteRejection { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// ラベル解析のリトライ対象か
    ///
    /// タイムアウト・通信失敗・4xx以外の拒否のみ。空レスポンスや4xxは再試行しない。
    pub fn is_retryable(&self) -> bool {
        match self {
            WineDiaryError::Timeout(_) | WineDiaryError::Transport(_) => true,
            WineDiaryError::RemoteRejection { status, .. } => !(400..500).contains(status),
            _ => false,
        }
    }

    /// 画面に表示するメッセージ
    pub fn user_message(&self) -> String {
        match self {
            WineDiaryError::Transport(_) => {
                "서버에 연결할 수 없습니다. 네트워크 연결 상태를 확인해주세요.".to_string()
            }
            WineDiaryError::Protocol { kind: ProtocolKind::Markup, .. } => {
                "서버가 JSON 대신 HTML을 반환했습니다. Webhook URL 설정을 확인해주세요.".to_string()
            }
            WineDiaryError::Timeout(secs) => {
                format!("라벨 분석 시간이 초과되었습니다 ({}초). 다시 시도해주세요.", secs)
            }
            WineDiaryError::EmptyResponse => {
                "라벨을 인식하지 못했습니다. 다시 촬영해 주세요. (빈 응답)".to_string()
            }
            WineDiaryError::Decode(_) => "이미지를 불러오는데 실패했습니다.".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WineDiaryError>;
