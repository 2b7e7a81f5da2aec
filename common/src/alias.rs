//! キーエイリアス解決モジュール
//!
//! Webhookのレスポンスは正規キー（`nameEn`）、Notion由来のキー（`property_name_en`）、
//! 旧フォームの韓国語キー（`와인명`）が混在する。フィールドごとに候補キーを
//! 優先順で並べ、空でない最初の値を採用する。

use crate::types::{value_to_string, AnalysisResult};
use serde_json::Value;

/// 正規フィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    Id,
    NameEn,
    NameKr,
    Producer,
    Vintage,
    WineType,
    Region,
    Country,
    Variety,
    Abv,
    Price,
    Rating,
    Date,
    Note,
    PurchasedAt,
}

impl CanonicalField {
    /// 候補キー（先頭ほど優先）
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            CanonicalField::Id => &["id"],
            CanonicalField::NameEn => &["nameEn", "property_name_en", "와인명"],
            CanonicalField::NameKr => &["nameKr", "property_name_kr"],
            CanonicalField::Producer => &["producer", "property_producer", "생산자"],
            CanonicalField::Vintage => &["vintage", "property_vintage", "빈티지"],
            CanonicalField::WineType => &["type", "property_type", "종류"],
            CanonicalField::Region => &["region", "property_region", "지역"],
            CanonicalField::Country => &["country", "property_country", "국가"],
            CanonicalField::Variety => &["variety", "property_variety", "품종"],
            CanonicalField::Abv => &["abv", "property_abv"],
            CanonicalField::Price => &["price", "property_price", "가격"],
            CanonicalField::Rating => &["rating", "property_rating", "평점"],
            CanonicalField::Date => &["date", "tastingDate", "property_date", "시음일"],
            CanonicalField::Note => &["note", "notes", "property_note", "노트"],
            CanonicalField::PurchasedAt => &["purchasedAt", "property_purchased_at"],
        }
    }

    /// 正規キー
    pub fn canonical_key(&self) -> &'static str {
        self.aliases()[0]
    }
}

/// 空とみなす値か
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// 候補キーを優先順に探し、空でない最初の値を返す
pub fn resolve<'a>(record: &'a AnalysisResult, field: CanonicalField) -> Option<&'a Value> {
    field
        .aliases()
        .iter()
        .filter_map(|key| record.get(key))
        .find(|value| !is_blank(value))
}

/// `resolve` の文字列版（前後の空白は除去）
pub fn resolve_string(record: &AnalysisResult, field: CanonicalField) -> Option<String> {
    resolve(record, field)
        .and_then(value_to_string)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `resolve` の数値版（文字列の数値も受け付ける）
pub fn resolve_number(record: &AnalysisResult, field: CanonicalField) -> Option<f64> {
    match resolve(record, field)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
