//! ラベル解析結果の正規化
//!
//! 解析Webhookのレスポンス（キー揺れあり）を入力フォームの値に変換する。
//! 失敗しない（ベストエフォート）。名前が一つも取れなかった場合のみ
//! `extraction_failed` を立て、呼び出し側でユーザーに再撮影を促す。

use crate::alias::{resolve_string, CanonicalField};
use crate::sanitize::{classify_wine_type, sanitize_abv, sanitize_price, sanitize_vintage};
use crate::types::{AnalysisResult, WineType};
use serde::{Deserialize, Serialize};

/// ラベルから自動入力される項目（フォーム上の文字列表現）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LabelFields {
    pub name_en: String,
    pub name_kr: String,
    pub producer: String,
    pub vintage: String,
    #[serde(rename = "type")]
    pub wine_type: WineType,
    pub region: String,
    pub country: String,
    pub variety: String,
    pub abv: String,
    pub price: String,
}

/// 正規化結果
#[derive(Debug, Clone, PartialEq)]
pub struct LabelExtraction {
    /// 反映後の項目（抽出失敗時は既存値そのまま）
    pub fields: LabelFields,
    /// 名前が英語・韓国語とも取得できなかった
    pub extraction_failed: bool,
}

/// 解析結果を既存の入力値に重ねて正規化する
pub fn normalize_analysis(result: &AnalysisResult, prior: &LabelFields) -> LabelExtraction {
    let name_en = resolve_string(result, CanonicalField::NameEn).unwrap_or_default();
    let name_kr = resolve_string(result, CanonicalField::NameKr).unwrap_or_default();

    if name_en.is_empty() && name_kr.is_empty() {
        return LabelExtraction {
            fields: prior.clone(),
            extraction_failed: true,
        };
    }

    let raw = |field| resolve_string(result, field);
    let or_prior = |value: Option<String>, prior: &str| value.unwrap_or_else(|| prior.to_string());

    let fields = LabelFields {
        // 英語名が無ければ韓国語名で代用
        name_en: if name_en.is_empty() { name_kr.clone() } else { name_en },
        name_kr,
        producer: raw(CanonicalField::Producer).unwrap_or_default(),
        vintage: sanitize_vintage(raw(CanonicalField::Vintage).as_deref(), &prior.vintage),
        wine_type: raw(CanonicalField::WineType)
            .map(|t| classify_wine_type(&t))
            .unwrap_or(prior.wine_type),
        region: or_prior(raw(CanonicalField::Region), &prior.region),
        country: or_prior(raw(CanonicalField::Country), &prior.country),
        variety: or_prior(raw(CanonicalField::Variety), &prior.variety),
        abv: sanitize_abv(raw(CanonicalField::Abv).as_deref(), &prior.abv),
        price: sanitize_price(raw(CanonicalField::Price).as_deref(), &prior.price),
    };

    LabelExtraction {
        fields,
        extraction_failed: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn analysis(value: serde_json::Value) -> AnalysisResult {
        AnalysisResult::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_names_flag_failure() {
        let prior = LabelFields {
            name_en: "Previous".into(),
            ..Default::default()
        };
        let extraction = normalize_analysis(&analysis(json!({"nameEn": "", "nameKr": ""})), &prior);
        assert!(extraction.extraction_failed);
        assert_eq!(extraction.fields.name_en, "Previous");
    }

    #[test]
    fn test_legacy_empty_names_flag_failure() {
        let extraction = normalize_analysis(
            &analysis(json!({"와인명": "", "property_name_kr": " ", "vintage": "2015"})),
            &LabelFields::default(),
        );
        assert!(extraction.extraction_failed);
    }

    #[test]
    fn test_opus_one_example() {
        let extraction = normalize_analysis(
            &analysis(json!({"nameEn": "Opus One", "vintage": "2018 Vintage", "type": "red wine"})),
            &LabelFields::default(),
        );
        assert!(!extraction.extraction_failed);
        assert_eq!(extraction.fields.name_en, "Opus One");
        assert_eq!(extraction.fields.vintage, "2018");
        assert_eq!(extraction.fields.wine_type, WineType::Red);
    }

    #[test]
    fn test_korean_name_fills_english_name() {
        let extraction = normalize_analysis(
            &analysis(json!({"nameKr": "샤또 마고"})),
            &LabelFields::default(),
        );
        assert_eq!(extraction.fields.name_en, "샤또 마고");
        assert_eq!(extraction.fields.name_kr, "샤또 마고");
    }

    #[test]
    fn test_sanitizers_keep_prior_values() {
        let prior = LabelFields {
            vintage: "2019".into(),
            price: "30000".into(),
            abv: "13".into(),
            region: "Napa".into(),
            wine_type: WineType::White,
            ..Default::default()
        };
        let extraction = normalize_analysis(
            &analysis(json!({
                "nameEn": "Mystery",
                "vintage": "NV",
                "price": "ask",
                "abv": "unknown"
            })),
            &prior,
        );
        let fields = extraction.fields;
        assert_eq!(fields.vintage, "2019");
        assert_eq!(fields.price, "30000");
        assert_eq!(fields.abv, "13");
        assert_eq!(fields.region, "Napa");
        assert_eq!(fields.wine_type, WineType::White);
    }

    #[test]
    fn test_numeric_and_localized_values() {
        let extraction = normalize_analysis(
            &analysis(json!([{
                "nameEn": "Sassicaia",
                "생산자": "Tenuta San Guido",
                "빈티지": 2017,
                "종류": "Rosso",
                "가격": "₩450,000",
                "abv": 14,
                "국가": "Italy"
            }])),
            &LabelFields::default(),
        );
        let fields = extraction.fields;
        assert_eq!(fields.producer, "Tenuta San Guido");
        assert_eq!(fields.vintage, "2017");
        assert_eq!(fields.wine_type, WineType::Red);
        assert_eq!(fields.price, "450000");
        assert_eq!(fields.abv, "14");
        assert_eq!(fields.country, "Italy");
    }
}
