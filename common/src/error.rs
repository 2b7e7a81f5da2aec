//! 共通ライブラリのエラー

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// 解析・一覧レコードのJSONが壊れている
    #[error("レコードのJSONが不正です: {0}")]
    Json(#[from] serde_json::Error),

    /// 値を期待した型に変換できない（ワイン種別・レコード形状など）
    #[error("値を解釈できません: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, Error>;
