//! 入力途中のワイン記録

use crate::photo::EncodedImage;
use chrono::NaiveDate;
use wine_diary_common::{LabelFields, TasteProfile, WineSubmission, WineType, RATING_RANGE};

/// Step2: 基本情報
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BasicInfo {
    pub name_kr: String,
    pub name_en: String,
    pub producer: String,
    pub vintage: String,
    pub wine_type: WineType,
    pub country: String,
    pub region: String,
    pub variety: String,
    pub abv: String,
}

/// Step4: 評価・価格・メモ
#[derive(Debug, Clone, PartialEq)]
pub struct FinalDetails {
    pub date: NaiveDate,
    pub price: String,
    pub note: String,
    pub rating: u8,
    pub purchased_at: String,
}

/// 各ステップの入力値
#[derive(Debug, Clone, PartialEq)]
pub enum StepInput {
    Photo(Option<EncodedImage>),
    BasicInfo(BasicInfo),
    Taste(TasteProfile),
    Final(FinalDetails),
}

/// ウィザードで蓄積中の記録
#[derive(Debug, Clone, PartialEq)]
pub struct WineDraft {
    pub photo: Option<EncodedImage>,
    pub label: LabelFields,
    pub taste: TasteProfile,
    pub rating: u8,
    pub date: NaiveDate,
    pub note: String,
    pub purchased_at: String,
}

impl WineDraft {
    /// 空の記録（テイスティングは中央値、評価0、日付は当日）
    pub fn new(today: NaiveDate) -> Self {
        Self {
            photo: None,
            label: LabelFields::default(),
            taste: TasteProfile::default(),
            rating: 0,
            date: today,
            note: String::new(),
            purchased_at: String::new(),
        }
    }

    pub fn basic_info(&self) -> BasicInfo {
        BasicInfo {
            name_kr: self.label.name_kr.clone(),
            name_en: self.label.name_en.clone(),
            producer: self.label.producer.clone(),
            vintage: self.label.vintage.clone(),
            wine_type: self.label.wine_type,
            country: self.label.country.clone(),
            region: self.label.region.clone(),
            variety: self.label.variety.clone(),
            abv: self.label.abv.clone(),
        }
    }

    pub fn final_details(&self) -> FinalDetails {
        FinalDetails {
            date: self.date,
            price: self.label.price.clone(),
            note: self.note.clone(),
            rating: self.rating,
            purchased_at: self.purchased_at.clone(),
        }
    }

    /// ステップの入力値を取り込む
    pub fn merge(&mut self, input: StepInput) {
        match input {
            StepInput::Photo(photo) => self.photo = photo,
            StepInput::BasicInfo(info) => {
                self.label = LabelFields {
                    name_en: info.name_en,
                    name_kr: info.name_kr,
                    producer: info.producer,
                    vintage: info.vintage,
                    wine_type: info.wine_type,
                    region: info.region,
                    country: info.country,
                    variety: info.variety,
                    abv: info.abv,
                    price: std::mem::take(&mut self.label.price),
                };
            }
            StepInput::Taste(taste) => self.taste = taste.clamped(),
            StepInput::Final(details) => {
                self.date = details.date;
                self.label.price = details.price;
                self.note = details.note;
                self.rating = details.rating.min(*RATING_RANGE.end());
                self.purchased_at = details.purchased_at;
            }
        }
    }

    /// 名前が一つでも入力されているか
    pub fn has_name(&self) -> bool {
        !self.label.name_en.trim().is_empty() || !self.label.name_kr.trim().is_empty()
    }

    /// 送信用レコードを組み立てる
    ///
    /// 数値に変換できない項目は未設定として扱う。
    pub fn to_submission(&self) -> WineSubmission {
        let label = &self.label;
        WineSubmission {
            name_en: label.name_en.trim().to_string(),
            name_kr: label.name_kr.trim().to_string(),
            wine_type: label.wine_type,
            rating: self.rating.min(*RATING_RANGE.end()),
            date: self.date,
            producer: non_empty(&label.producer),
            vintage: label.vintage.trim().parse::<u16>().ok().filter(|y| *y >= 1000),
            country: non_empty(&label.country),
            region: non_empty(&label.region),
            variety: non_empty(&label.variety),
            abv: label.abv.trim().parse::<f64>().ok(),
            price: label.price.trim().parse::<f64>().ok(),
            note: non_empty(&self.note),
            purchased_at: non_empty(&self.purchased_at),
            taste: self.taste.clone().clamped(),
            photo: self.photo.as_ref().map(|p| p.data_url.clone()),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn test_new_draft_defaults() {
        let draft = WineDraft::new(today());
        assert_eq!(draft.taste, TasteProfile::default());
        assert_eq!(draft.rating, 0);
        assert_eq!(draft.date, today());
        assert!(!draft.has_name());
    }

    #[test]
    fn test_basic_info_merge_keeps_price() {
        let mut draft = WineDraft::new(today());
        draft.label.price = "45000".into();
        draft.merge(StepInput::BasicInfo(BasicInfo {
            name_en: "Cloudy Bay".into(),
            wine_type: WineType::White,
            ..Default::default()
        }));
        assert_eq!(draft.label.name_en, "Cloudy Bay");
        assert_eq!(draft.label.wine_type, WineType::White);
        assert_eq!(draft.label.price, "45000");
    }

    #[test]
    fn test_to_submission_conversions() {
        let mut draft = WineDraft::new(today());
        draft.merge(StepInput::BasicInfo(BasicInfo {
            name_kr: " 오퍼스 원 ".into(),
            vintage: "2018".into(),
            abv: "14.5".into(),
            country: "  ".into(),
            ..Default::default()
        }));
        draft.merge(StepInput::Final(FinalDetails {
            date: today(),
            price: "abc".into(),
            note: "좋았다".into(),
            rating: 9,
            purchased_at: String::new(),
        }));

        let submission = draft.to_submission();
        assert_eq!(submission.name_kr, "오퍼스 원");
        assert_eq!(submission.wine_type, WineType::Red);
        assert_eq!(submission.vintage, Some(2018));
        assert_eq!(submission.abv, Some(14.5));
        assert_eq!(submission.price, None);
        assert_eq!(submission.country, None);
        assert_eq!(submission.rating, 5);
        assert_eq!(submission.note.as_deref(), Some("좋았다"));
    }

    #[test]
    fn test_rating_clamped_to_range_end() {
        let mut draft = WineDraft::new(today());
        draft.rating = u8::MAX;
        assert_eq!(draft.to_submission().rating, *RATING_RANGE.end());
        assert!(RATING_RANGE.contains(&draft.to_submission().rating));
    }

    #[test]
    fn test_invalid_vintage_is_absent() {
        let mut draft = WineDraft::new(today());
        draft.label.vintage = "NV".into();
        assert_eq!(draft.to_submission().vintage, None);
        draft.label.vintage = "15".into();
        assert_eq!(draft.to_submission().vintage, None);
    }
}
