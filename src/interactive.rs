//! 対話式の記録追加
//!
//! ウィザードの各ステップを dialoguer のプロンプトで入力し、
//! 入力後のメニュー（次へ・戻る・移動・保存・中止）をイベントとして
//! `Wizard` へ渡す。

use crate::config::Config;
use crate::error::{Result, WineDiaryError};
use crate::gateway::{Gateway, Transport};
use crate::photo::{normalize_image_async, EncodedImage, RawImage};
use crate::wizard::{BasicInfo, Effect, FinalDetails, StepInput, Wizard, WizardEvent, WizardStep};
use chrono::NaiveDate;
use dialoguer::{Confirm, Input, MultiSelect, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use wine_diary_common::{TasteProfile, WineSubmission, WineType, AROMA_OPTIONS, RATING_RANGE};

/// ステップ入力後の操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Next,
    Back,
    Jump,
    Submit,
    Cancel,
}

impl NavAction {
    /// ステップごとのメニュー項目
    pub fn menu(step: WizardStep) -> Vec<NavAction> {
        let mut actions = Vec::new();
        if step != WizardStep::Final {
            actions.push(NavAction::Next);
        }
        actions.push(NavAction::Back);
        actions.push(NavAction::Jump);
        actions.push(NavAction::Submit);
        actions.push(NavAction::Cancel);
        actions
    }

    pub fn label(&self) -> &'static str {
        match self {
            NavAction::Next => "다음",
            NavAction::Back => "이전",
            NavAction::Jump => "단계 이동",
            NavAction::Submit => "저장하기",
            NavAction::Cancel => "취소",
        }
    }
}

/// スピナー
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// `YYYY-MM-DD` 形式の日付を解釈
pub fn parse_date_input(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| WineDiaryError::Validation(format!("날짜 형식이 올바르지 않습니다: {}", input.trim())))
}

/// 評点の選択肢（"★★☆☆☆ (2)" 形式）
pub fn rating_choices() -> Vec<String> {
    let max = *RATING_RANGE.end() as usize;
    RATING_RANGE
        .map(|n| {
            let n = n as usize;
            format!("{}{} ({})", "★".repeat(n), "☆".repeat(max - n), n)
        })
        .collect()
}

fn prompt_err(e: dialoguer::Error) -> WineDiaryError {
    WineDiaryError::Prompt(e.to_string())
}

/// 写真を読み込み、正規化してから解析する
///
/// 解析に失敗しても写真は保持し、手入力で続行できるようにする。
pub async fn capture_photo<T: Transport>(
    wizard: &mut Wizard,
    gateway: &Gateway<T>,
    path: &Path,
    config: &Config,
) -> Result<EncodedImage> {
    let raw = RawImage::from_path(path)?;
    let encoded = normalize_image_async(raw, config.image).await?;

    let spinner = create_spinner("라벨 분석 중...");
    let analysis = gateway.analyze_label(&encoded).await;
    spinner.finish_and_clear();

    match analysis {
        Ok(result) => match wizard.apply_analysis(&result) {
            Ok(extraction) => {
                let fields = &extraction.fields;
                println!("✔ 라벨 인식 완료: {} {}", fields.name_en, fields.vintage);
            }
            Err(e) => println!("⚠ {}", e.user_message()),
        },
        Err(e) => {
            tracing::warn!("ラベル解析失敗: {}", e);
            println!("⚠ {}", e.user_message());
        }
    }

    Ok(encoded)
}

/// 対話式で記録を追加する
///
/// 中止した場合は `Ok(None)`。
pub async fn run_add_wizard<T: Transport>(
    gateway: &Gateway<T>,
    initial_photo: Option<PathBuf>,
) -> Result<Option<WineSubmission>> {
    let mut wizard = Wizard::start();
    let mut pending_photo = initial_photo;

    println!("🍷 wine-diary - 새 와인 기록\n");

    loop {
        let step = wizard.step();
        println!("--- [{}] ---", step);

        let input = match step {
            WizardStep::Photo => {
                let path = match pending_photo.take() {
                    Some(path) => Some(path),
                    None => prompt_photo_path()?,
                };
                match path {
                    Some(path) => {
                        match capture_photo(&mut wizard, gateway, &path, gateway.config()).await {
                            Ok(encoded) => StepInput::Photo(Some(encoded)),
                            Err(e) => {
                                println!("⚠ {}", e.user_message());
                                StepInput::Photo(wizard.draft().photo.clone())
                            }
                        }
                    }
                    None => StepInput::Photo(wizard.draft().photo.clone()),
                }
            }
            WizardStep::BasicInfo => StepInput::BasicInfo(prompt_basic_info(wizard.draft().basic_info())?),
            WizardStep::Taste => StepInput::Taste(prompt_taste(wizard.draft().taste.clone())?),
            WizardStep::Final => StepInput::Final(prompt_final(wizard.draft().final_details())?),
        };

        let actions = NavAction::menu(step);
        let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();
        let selection = Select::new()
            .with_prompt("다음 작업")
            .items(&labels)
            .default(0)
            .interact()
            .map_err(prompt_err)?;

        match actions[selection] {
            NavAction::Next => {
                wizard.dispatch(WizardEvent::Next(input));
            }
            NavAction::Back => {
                wizard.dispatch(WizardEvent::Update(input));
                if wizard.dispatch(WizardEvent::Back) == Effect::LeaveWizard {
                    println!("기록을 취소했습니다");
                    return Ok(None);
                }
            }
            NavAction::Jump => {
                wizard.dispatch(WizardEvent::Update(input));
                let titles: Vec<String> = WizardStep::ALL.iter().map(|s| s.to_string()).collect();
                let target = Select::new()
                    .with_prompt("이동할 단계")
                    .items(&titles)
                    .default(step.index() as usize - 1)
                    .interact()
                    .map_err(prompt_err)?;
                wizard.dispatch(WizardEvent::Jump(WizardStep::ALL[target]));
            }
            NavAction::Submit => {
                wizard.dispatch(WizardEvent::Update(input));
                let spinner = create_spinner("저장 중...");
                let outcome = wizard.submit(gateway).await;
                spinner.finish_and_clear();

                match outcome {
                    Ok(submission) => {
                        println!("✅ 저장되었습니다: {}", submission.display_name());
                        return Ok(Some(submission));
                    }
                    Err(e) => println!("⚠ {}", e.user_message()),
                }
            }
            NavAction::Cancel => {
                let confirmed = Confirm::new()
                    .with_prompt("입력한 내용을 버리고 종료할까요?")
                    .default(false)
                    .interact()
                    .map_err(prompt_err)?;
                if confirmed {
                    println!("기록을 취소했습니다");
                    return Ok(None);
                }
                wizard.dispatch(WizardEvent::Update(input));
            }
        }
    }
}

fn prompt_photo_path() -> Result<Option<PathBuf>> {
    let input: String = Input::new()
        .with_prompt("라벨 사진 경로 (Enter: 건너뛰기)")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;

    let trimmed = input.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(PathBuf::from(trimmed)))
    }
}

fn prompt_text(prompt: &str, current: &str) -> Result<String> {
    Input::new()
        .with_prompt(prompt)
        .with_initial_text(current)
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)
}

fn prompt_basic_info(current: BasicInfo) -> Result<BasicInfo> {
    let name_kr = prompt_text("와인 이름 (한글)", &current.name_kr)?;
    let name_en = prompt_text("와인 이름 (영문)", &current.name_en)?;
    let producer = prompt_text("생산자", &current.producer)?;
    let vintage = prompt_text("빈티지", &current.vintage)?;

    let labels: Vec<&str> = WineType::ALL.iter().map(|t| t.label_kr()).collect();
    let default = WineType::ALL
        .iter()
        .position(|t| *t == current.wine_type)
        .unwrap_or_default();
    let type_index = Select::new()
        .with_prompt("종류")
        .items(&labels)
        .default(default)
        .interact()
        .map_err(prompt_err)?;

    let country = prompt_text("국가", &current.country)?;
    let region = prompt_text("지역", &current.region)?;
    let variety = prompt_text("품종", &current.variety)?;
    let abv = prompt_text("알코올 도수 (%)", &current.abv)?;

    Ok(BasicInfo {
        name_kr,
        name_en,
        producer,
        vintage,
        wine_type: WineType::ALL[type_index],
        country,
        region,
        variety,
        abv,
    })
}

fn prompt_level(prompt: &str, current: u8) -> Result<u8> {
    let levels = ["1", "2", "3", "4", "5"];
    let index = Select::new()
        .with_prompt(prompt)
        .items(&levels)
        .default(current.clamp(1, 5) as usize - 1)
        .interact()
        .map_err(prompt_err)?;
    Ok(index as u8 + 1)
}

fn prompt_taste(current: TasteProfile) -> Result<TasteProfile> {
    let body = prompt_level("바디감", current.body)?;
    let tannin = prompt_level("타닌", current.tannin)?;
    let acidity = prompt_level("산도", current.acidity)?;
    let sweetness = prompt_level("당도", current.sweetness)?;

    let items: Vec<String> = AROMA_OPTIONS
        .iter()
        .map(|(name, icon)| format!("{} {}", icon, name))
        .collect();
    let defaults: Vec<bool> = AROMA_OPTIONS
        .iter()
        .map(|(name, _)| current.aromas.iter().any(|a| a == name))
        .collect();
    let chosen = MultiSelect::new()
        .with_prompt("향 (Space로 선택)")
        .items(&items)
        .defaults(&defaults)
        .interact()
        .map_err(prompt_err)?;

    // 既存の選択順を保ちつつトグル
    let mut taste = TasteProfile {
        body,
        tannin,
        acidity,
        sweetness,
        aromas: current.aromas.clone(),
    };
    for (index, (name, _)) in AROMA_OPTIONS.iter().enumerate() {
        let selected = chosen.contains(&index);
        if selected != defaults[index] {
            taste.toggle_aroma(name);
        }
    }
    Ok(taste)
}

fn prompt_final(current: FinalDetails) -> Result<FinalDetails> {
    let date = loop {
        let input = prompt_text("시음 날짜 (YYYY-MM-DD)", &current.date.format("%Y-%m-%d").to_string())?;
        match parse_date_input(&input) {
            Ok(date) => break date,
            Err(e) => println!("⚠ {}", e),
        }
    };

    let price = prompt_text("가격 (원)", &current.price)?;

    let stars = rating_choices();
    let max = *RATING_RANGE.end();
    let rating = Select::new()
        .with_prompt("평점")
        .items(&stars)
        .default(current.rating.min(max) as usize)
        .interact()
        .map_err(prompt_err)? as u8;

    let note = prompt_text("테이스팅 노트", &current.note)?;
    let purchased_at = prompt_text("구매처", &current.purchased_at)?;

    Ok(FinalDetails {
        date,
        price,
        note,
        rating,
        purchased_at,
    })
}
