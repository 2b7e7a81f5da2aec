//! フィールドサニタイザ
//!
//! AIが返す値は「Vintage 2015 Edition」「₩50,000」「13.5% vol」のように
//! 装飾を含むため、フィールドごとに値を抽出する。
//! 抽出できなかった場合は既存の値を保持し、エラーにはしない。

use crate::types::WineType;
use regex::Regex;

lazy_static::lazy_static! {
    static ref YEAR_RE: Regex = Regex::new(r"\d{4}").unwrap();
    static ref ABV_RE: Regex = Regex::new(r"\d+(?:\.\d+)?").unwrap();
}

/// 最初に現れる4桁の数字を年として抽出
pub fn extract_vintage(raw: &str) -> Option<String> {
    YEAR_RE.find(raw).map(|m| m.as_str().to_string())
}

/// 価格から数字と小数点以外を除去
pub fn extract_price(raw: &str) -> Option<String> {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

/// 最初の数値（小数点を含んでよい）をアルコール度数として抽出
pub fn extract_abv(raw: &str) -> Option<String> {
    ABV_RE.find(raw).map(|m| m.as_str().to_string())
}

/// ヴィンテージ: 抽出できなければ既存値を保持
pub fn sanitize_vintage(raw: Option<&str>, prior: &str) -> String {
    raw.and_then(extract_vintage).unwrap_or_else(|| prior.to_string())
}

/// 価格: 抽出できなければ既存値を保持
pub fn sanitize_price(raw: Option<&str>, prior: &str) -> String {
    raw.and_then(extract_price).unwrap_or_else(|| prior.to_string())
}

/// アルコール度数: 抽出できなければ既存値を保持
pub fn sanitize_abv(raw: Option<&str>, prior: &str) -> String {
    raw.and_then(extract_abv).unwrap_or_else(|| prior.to_string())
}

/// 種類の文字列をキーワードで分類
///
/// 判定順: ロゼ → スパークリング → 白 → デザート → 酒精強化。
/// どれにも一致しない場合（空文字を含む）は Red とみなす。
pub fn classify_wine_type(raw: &str) -> WineType {
    let lower = raw.to_lowercase();
    let has = |keywords: &[&str]| keywords.iter().any(|k| lower.contains(k));

    if has(&["rosé", "rose"]) {
        WineType::Rose
    } else if has(&["sparkling", "champagne"]) {
        WineType::Sparkling
    } else if has(&["white"]) {
        WineType::White
    } else if has(&["dessert", "port", "sherry"]) {
        WineType::Dessert
    } else if has(&["fortified"]) {
        WineType::Fortified
    } else {
        WineType::Red
    }
}
