//! 記録追加ウィザード
//!
//! 写真 → 基本情報 → テイスティング → 評価 の4ステップ。
//! 状態遷移は `transition` に集約し、送信などの副作用は `Effect` として返す。
//! `Wizard` はその結果をゲートウェイへ橋渡しする。

pub mod draft;

pub use draft::{BasicInfo, FinalDetails, StepInput, WineDraft};

use crate::error::{Result, WineDiaryError};
use crate::gateway::{Gateway, Transport};
use chrono::NaiveDate;
use wine_diary_common::{normalize_analysis, AnalysisResult, LabelExtraction, LabelFields, WineSubmission};

pub const MISSING_NAME_MESSAGE: &str = "와인 이름을 입력해주세요 (한글명 또는 영문명)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WizardStep {
    Photo = 1,
    BasicInfo = 2,
    Taste = 3,
    Final = 4,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::Photo,
        WizardStep::BasicInfo,
        WizardStep::Taste,
        WizardStep::Final,
    ];

    pub fn index(&self) -> u8 {
        *self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.index() == index)
    }

    /// 次のステップ（最終ステップでは留まる）
    pub fn next(&self) -> Self {
        Self::from_index(self.index() + 1).unwrap_or(*self)
    }

    /// 前のステップ（最初のステップでは None）
    pub fn prev(&self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::Photo => "사진 촬영",
            WizardStep::BasicInfo => "기본 정보",
            WizardStep::Taste => "테이스팅 노트",
            WizardStep::Final => "평가 및 메모",
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/4 {}", self.index(), self.title())
    }
}

/// 画面遷移の向き（アニメーション用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WizardEvent {
    /// 入力を取り込んで次へ
    Next(StepInput),
    /// 入力を取り込むだけ（ステップは変えない）
    Update(StepInput),
    /// 解析結果で基本情報を上書き
    ApplyLabel(LabelFields),
    Back,
    Jump(WizardStep),
    Submit,
    SubmitSucceeded,
    SubmitFailed,
}

/// 遷移に伴って呼び出し側が行うべき処理
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    /// 最初のステップで戻る → ウィザードを閉じる
    LeaveWizard,
    /// この内容で登録を送信する
    SubmitEntry(WineSubmission),
    ValidationFailed(String),
    /// 登録完了（セッションは破棄済み）
    Completed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WizardState {
    pub step: WizardStep,
    pub direction: Direction,
    pub submitting: bool,
    pub draft: WineDraft,
    /// セッション開始日（完了後の新規セッションにも使う）
    pub today: NaiveDate,
}

impl WizardState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            step: WizardStep::Photo,
            direction: Direction::Forward,
            submitting: false,
            draft: WineDraft::new(today),
            today,
        }
    }
}

/// 状態遷移（純粋関数）
pub fn transition(state: &WizardState, event: WizardEvent) -> (WizardState, Effect) {
    let mut next = state.clone();

    let effect = match event {
        WizardEvent::Next(input) => {
            next.draft.merge(input);
            next.step = state.step.next();
            next.direction = Direction::Forward;
            Effect::None
        }
        WizardEvent::Update(input) => {
            next.draft.merge(input);
            Effect::None
        }
        WizardEvent::ApplyLabel(fields) => {
            next.draft.label = fields;
            Effect::None
        }
        WizardEvent::Back => match state.step.prev() {
            Some(prev) => {
                next.step = prev;
                next.direction = Direction::Backward;
                Effect::None
            }
            None => Effect::LeaveWizard,
        },
        WizardEvent::Jump(target) => {
            next.direction = if target < state.step {
                Direction::Backward
            } else {
                Direction::Forward
            };
            next.step = target;
            Effect::None
        }
        WizardEvent::Submit => {
            if state.submitting {
                Effect::None
            } else if !state.draft.has_name() {
                next.step = WizardStep::BasicInfo;
                next.direction = Direction::Backward;
                Effect::ValidationFailed(MISSING_NAME_MESSAGE.to_string())
            } else {
                next.submitting = true;
                Effect::SubmitEntry(state.draft.to_submission())
            }
        }
        WizardEvent::SubmitSucceeded => {
            next = WizardState::new(state.today);
            Effect::Completed
        }
        WizardEvent::SubmitFailed => {
            next.submitting = false;
            Effect::None
        }
    };

    (next, effect)
}

/// ウィザードのセッション
#[derive(Debug, Clone)]
pub struct Wizard {
    state: WizardState,
}

impl Wizard {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            state: WizardState::new(today),
        }
    }

    /// 今日の日付で開始
    pub fn start() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn step(&self) -> WizardStep {
        self.state.step
    }

    pub fn draft(&self) -> &WineDraft {
        &self.state.draft
    }

    pub fn dispatch(&mut self, event: WizardEvent) -> Effect {
        let (next, effect) = transition(&self.state, event);
        if next.step != self.state.step {
            tracing::debug!("ステップ遷移: {} → {}", self.state.step, next.step);
        }
        self.state = next;
        effect
    }

    /// 解析結果を基本情報へ反映する
    ///
    /// 名前が取れなかった場合は入力済みの内容を変えずにエラーを返す。
    pub fn apply_analysis(&mut self, result: &AnalysisResult) -> Result<LabelExtraction> {
        let extraction = normalize_analysis(result, &self.state.draft.label);
        if extraction.extraction_failed {
            tracing::warn!("ラベルから名前を抽出できませんでした");
            return Err(WineDiaryError::Validation(
                "라벨 정보를 인식하지 못했습니다. 직접 입력해주세요".into(),
            ));
        }

        self.dispatch(WizardEvent::ApplyLabel(extraction.fields.clone()));
        Ok(extraction)
    }

    /// 登録を送信する
    ///
    /// 成功するとセッションは初期化され、失敗時は入力内容を保持する。
    pub async fn submit<T: Transport>(&mut self, gateway: &Gateway<T>) -> Result<WineSubmission> {
        match self.dispatch(WizardEvent::Submit) {
            Effect::SubmitEntry(submission) => match gateway.submit_entry(&submission).await {
                Ok(()) => {
                    self.dispatch(WizardEvent::SubmitSucceeded);
                    Ok(submission)
                }
                Err(e) => {
                    tracing::error!("登録失敗: {}", e);
                    self.dispatch(WizardEvent::SubmitFailed);
                    Err(e)
                }
            },
            Effect::ValidationFailed(message) => Err(WineDiaryError::Validation(message)),
            _ => Err(WineDiaryError::Validation("이미 저장 중입니다".into())),
        }
    }
}
