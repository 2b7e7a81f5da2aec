//! コレクション（セラー）一覧
//!
//! 一覧Webhookのレコードを表示用の `CellarEntry` に変換し、
//! 検索・種類フィルタ・統計を提供する。

use crate::alias::{resolve, resolve_number, resolve_string, CanonicalField};
use crate::sanitize::classify_wine_type;
use crate::types::{AnalysisResult, WineType};
use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::HashMap;

/// 一覧表示用のワイン
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellarEntry {
    pub id: String,
    pub name_en: String,
    pub name_kr: String,
    pub producer: String,
    pub vintage: Option<i32>,
    #[serde(rename = "type")]
    pub wine_type: WineType,
    pub country: String,
    pub region: String,
    pub variety: String,
    pub rating: f64,
    pub price: Option<f64>,
    pub abv: Option<f64>,
    pub date: Option<String>,
    pub note: String,
    pub image_url: Option<String>,
}

impl CellarEntry {
    /// 一覧レコードから生成
    ///
    /// `index` はIDが無いレコードの代替ID生成に使う。
    pub fn from_record(record: &AnalysisResult, index: usize) -> Self {
        let text = |field| resolve_string(record, field).unwrap_or_default();

        let wine_type = resolve_string(record, CanonicalField::WineType)
            .map(|t| t.parse().unwrap_or_else(|_| classify_wine_type(&t)))
            .unwrap_or_default();

        Self {
            id: resolve_string(record, CanonicalField::Id)
                .unwrap_or_else(|| format!("entry-{}", index)),
            name_en: text(CanonicalField::NameEn),
            name_kr: text(CanonicalField::NameKr),
            producer: text(CanonicalField::Producer),
            vintage: resolve_number(record, CanonicalField::Vintage)
                .filter(|v| *v > 0.0)
                .map(|v| v as i32),
            wine_type,
            country: text(CanonicalField::Country),
            region: text(CanonicalField::Region),
            variety: resolve_variety(record),
            rating: resolve_number(record, CanonicalField::Rating).unwrap_or(0.0),
            price: resolve_number(record, CanonicalField::Price).filter(|p| *p > 0.0),
            abv: resolve_number(record, CanonicalField::Abv),
            date: resolve_string(record, CanonicalField::Date),
            note: text(CanonicalField::Note),
            image_url: picture_url(record.get("property_label_picture"))
                .or_else(|| picture_url(record.get("property_main_picture"))),
        }
    }

    /// 表示名（英語名優先）
    pub fn display_name(&self) -> &str {
        if self.name_en.is_empty() {
            &self.name_kr
        } else {
            &self.name_en
        }
    }

    /// 試飲日（`YYYY-MM-DD` で始まらない値は None）
    pub fn tasting_date(&self) -> Option<NaiveDate> {
        let raw = self.date.as_deref()?.trim();
        NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()
    }
}

/// 一覧レスポンス全体を変換
pub fn entries_from_records(records: &[AnalysisResult]) -> Vec<CellarEntry> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| CellarEntry::from_record(r, i))
        .collect()
}

/// 品種はNotionのリッチテキスト形式で届くことがある
fn resolve_variety(record: &AnalysisResult) -> String {
    if let Some(text) = record
        .get("variety")
        .or_else(|| record.get("properties").and_then(|p| p.get("variety")))
        .and_then(rich_text_plain)
    {
        return text;
    }

    match resolve(record, CanonicalField::Variety) {
        Some(Value::String(s)) => s.trim().to_string(),
        _ => String::new(),
    }
}

fn rich_text_plain(value: &Value) -> Option<String> {
    value
        .get("rich_text")?
        .get(0)?
        .get("plain_text")?
        .as_str()
        .map(|s| s.to_string())
}

/// ファイルプロパティ配列から画像URLを取り出す
///
/// 優先順: `file.url` → `external.url` → `url`
fn picture_url(files: Option<&Value>) -> Option<String> {
    let first = files?.as_array()?.first()?;
    [
        first.get("file").and_then(|f| f.get("url")),
        first.get("external").and_then(|f| f.get("url")),
        first.get("url"),
    ]
    .into_iter()
    .flatten()
    .find_map(|v| v.as_str().map(|s| s.to_string()))
}

/// 検索条件
#[derive(Debug, Clone, Default)]
pub struct CellarFilter {
    /// 韓国語名・英語名・生産者に対する部分一致（大文字小文字無視）
    pub query: String,
    /// None は「全て」
    pub wine_type: Option<WineType>,
    /// テイスティングノートも検索対象にする
    pub include_notes: bool,
}

impl CellarFilter {
    pub fn matches(&self, entry: &CellarEntry) -> bool {
        let query = self.query.trim().to_lowercase();
        let notes = if self.include_notes { Some(&entry.note) } else { None };
        let matches_search = query.is_empty()
            || [Some(&entry.name_kr), Some(&entry.name_en), Some(&entry.producer), notes]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&query));
        let matches_type = self.wine_type.map_or(true, |t| entry.wine_type == t);

        matches_search && matches_type
    }

    pub fn apply<'a>(&self, entries: &'a [CellarEntry]) -> Vec<&'a CellarEntry> {
        entries.iter().filter(|e| self.matches(e)).collect()
    }
}

/// テイスティングノート一覧
///
/// 名前・生産者・ノート本文で検索し、試飲日の新しい順に並べる。
/// 日付の無い記録は末尾（元の順序を保つ）。
pub fn tasting_journal<'a>(entries: &'a [CellarEntry], query: &str) -> Vec<&'a CellarEntry> {
    let filter = CellarFilter {
        query: query.to_string(),
        wine_type: None,
        include_notes: true,
    };
    let mut notes = filter.apply(entries);
    notes.sort_by(|a, b| b.tasting_date().cmp(&a.tasting_date()));
    notes
}

/// コレクション統計
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellarStats {
    pub total_wines: usize,
    /// 価格の合計（価格未設定は0扱い）
    pub total_value: f64,
    pub average_rating: f64,
    /// 種類ごとの本数（WineType::ALL の順）
    pub by_type: Vec<(WineType, usize)>,
}

impl CellarStats {
    pub fn compute(entries: &[CellarEntry]) -> Self {
        let total_wines = entries.len();
        let total_value = entries.iter().map(|e| e.price.unwrap_or(0.0)).sum();
        let average_rating = if total_wines > 0 {
            entries.iter().map(|e| e.rating).sum::<f64>() / total_wines as f64
        } else {
            0.0
        };

        let mut counts: HashMap<WineType, usize> = HashMap::new();
        for entry in entries {
            *counts.entry(entry.wine_type).or_insert(0) += 1;
        }
        let by_type = WineType::ALL
            .iter()
            .map(|t| (*t, counts.get(t).copied().unwrap_or(0)))
            .collect();

        Self {
            total_wines,
            total_value,
            average_rating,
            by_type,
        }
    }

    /// 平均評価（小数1桁）
    pub fn average_rating_label(&self) -> String {
        format!("{:.1}", self.average_rating)
    }
}
