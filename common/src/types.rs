//! ワイン記録の型定義
//!
//! CLIと将来のフロントエンドで共有される型:
//! - WineType: ワインの種類（6分類）
//! - TasteProfile: テイスティング評価（ボディ・タンニン・酸味・甘味・アロマ）
//! - WineSubmission: Webhookへ送信する正規化済みレコード
//! - AnalysisResult: ラベル解析・一覧取得で返るキー揺れのあるレコード

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// ワインの種類
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WineType {
    #[default]
    Red,
    White,
    Rose,
    Sparkling,
    Dessert,
    Fortified,
}

impl WineType {
    /// 一覧タブの表示順
    pub const ALL: [WineType; 6] = [
        WineType::Red,
        WineType::White,
        WineType::Sparkling,
        WineType::Rose,
        WineType::Dessert,
        WineType::Fortified,
    ];

    /// 正規キー（送信時の値）
    pub fn as_str(&self) -> &'static str {
        match self {
            WineType::Red => "Red",
            WineType::White => "White",
            WineType::Rose => "Rose",
            WineType::Sparkling => "Sparkling",
            WineType::Dessert => "Dessert",
            WineType::Fortified => "Fortified",
        }
    }

    /// 韓国語ラベル（画面表示用）
    pub fn label_kr(&self) -> &'static str {
        match self {
            WineType::Red => "레드",
            WineType::White => "화이트",
            WineType::Rose => "로제",
            WineType::Sparkling => "스파클링",
            WineType::Dessert => "디저트",
            WineType::Fortified => "주정강화",
        }
    }
}

impl std::fmt::Display for WineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for WineType {
    type Err = Error;

    /// 正規キーの完全一致のみ受け付ける（曖昧な文字列は `classify_wine_type` を使う）
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "red" => Ok(WineType::Red),
            "white" => Ok(WineType::White),
            "rose" | "rosé" => Ok(WineType::Rose),
            "sparkling" => Ok(WineType::Sparkling),
            "dessert" => Ok(WineType::Dessert),
            "fortified" => Ok(WineType::Fortified),
            _ => Err(Error::Parse(format!("不明なワイン種別: {}", s))),
        }
    }
}

/// テイスティング評価の初期値（各スライダーの中央）
pub const DEFAULT_TASTE_LEVEL: u8 = 3;

/// 評価の範囲
pub const TASTE_LEVEL_RANGE: std::ops::RangeInclusive<u8> = 1..=5;
pub const RATING_RANGE: std::ops::RangeInclusive<u8> = 0..=5;

/// 選択可能なアロマ（ラベル, アイコン）
pub const AROMA_OPTIONS: &[(&str, &str)] = &[
    ("체리", "🍒"),
    ("자두", "🫐"),
    ("딸기", "🍓"),
    ("사과", "🍎"),
    ("배", "🍐"),
    ("레몬", "🍋"),
    ("복숭아", "🍑"),
    ("꽃", "🌸"),
    ("허브", "🌿"),
    ("오크", "🪵"),
    ("바닐라", "🍦"),
    ("향신료", "🧂"),
    ("초콜릿", "🍫"),
    ("가죽", "👜"),
    ("흙", "🪨"),
];

/// テイスティング評価
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TasteProfile {
    pub body: u8,
    pub tannin: u8,
    pub acidity: u8,
    pub sweetness: u8,
    /// 選択順を保持したアロマタグ（重複なし）
    pub aromas: Vec<String>,
}

impl Default for TasteProfile {
    fn default() -> Self {
        Self {
            body: DEFAULT_TASTE_LEVEL,
            tannin: DEFAULT_TASTE_LEVEL,
            acidity: DEFAULT_TASTE_LEVEL,
            sweetness: DEFAULT_TASTE_LEVEL,
            aromas: Vec::new(),
        }
    }
}

impl TasteProfile {
    /// アロマの選択をトグルする
    pub fn toggle_aroma(&mut self, aroma: &str) {
        if let Some(pos) = self.aromas.iter().position(|a| a == aroma) {
            self.aromas.remove(pos);
        } else {
            self.aromas.push(aroma.to_string());
        }
    }

    /// 範囲外の値を 1..=5 に丸める
    pub fn clamped(mut self) -> Self {
        let clamp = |v: u8| v.clamp(*TASTE_LEVEL_RANGE.start(), *TASTE_LEVEL_RANGE.end());
        self.body = clamp(self.body);
        self.tannin = clamp(self.tannin);
        self.acidity = clamp(self.acidity);
        self.sweetness = clamp(self.sweetness);
        self
    }
}

/// Webhookへ送信するワイン記録
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WineSubmission {
    pub name_en: String,
    pub name_kr: String,
    #[serde(rename = "type")]
    pub wine_type: WineType,
    /// 0〜5
    pub rating: u8,
    /// 試飲日（YYYY-MM-DD）
    pub date: NaiveDate,
    pub producer: Option<String>,
    pub vintage: Option<u16>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub variety: Option<String>,
    pub abv: Option<f64>,
    pub price: Option<f64>,
    pub note: Option<String>,
    pub purchased_at: Option<String>,
    #[serde(flatten)]
    pub taste: TasteProfile,
    /// ラベル写真（Data URI）
    pub photo: Option<String>,
}

impl WineSubmission {
    /// 表示用の名前（英語名優先）
    pub fn display_name(&self) -> &str {
        if self.name_en.trim().is_empty() {
            &self.name_kr
        } else {
            &self.name_en
        }
    }
}

/// キー揺れを含む解析・一覧レコード
///
/// 正規キー（`nameEn`）と旧来のローカライズキー（`와인명`, `property_name_en`）が
/// 混在しうるため、型付けせずにマップのまま保持する。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisResult(pub Map<String, Value>);

impl AnalysisResult {
    /// JSON値から生成
    ///
    /// 配列の場合は先頭要素を採用する（n8nは単一結果も配列で返すことがある）。
    pub fn from_value(value: Value) -> Result<Self> {
        let obj = match value {
            Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
            other => other,
        };

        match obj {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(Error::Parse("JSONオブジェクトが見つかりません".into())),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// 文字列として取得（数値などは文字列化、nullは None）
    pub fn get_string(&self, key: &str) -> Option<String> {
        value_to_string(self.0.get(key)?)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for AnalysisResult {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// JSON値を文字列化する
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
