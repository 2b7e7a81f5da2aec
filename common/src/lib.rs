//! Wine Diary Common Library
//!
//! CLIと将来のフロントエンドで共有される型と正規化ロジック

pub mod types;
pub mod error;
pub mod alias;
pub mod sanitize;
pub mod normalizer;
pub mod cellar;
pub mod data_url;

pub use types::{AnalysisResult, TasteProfile, WineSubmission, WineType, AROMA_OPTIONS, RATING_RANGE};
pub use error::{Error, Result};
pub use alias::CanonicalField;
pub use normalizer::{normalize_analysis, LabelExtraction, LabelFields};
pub use cellar::{entries_from_records, tasting_journal, CellarEntry, CellarFilter, CellarStats};
pub use data_url::{build_data_url, extract_base64_from_data_url};
