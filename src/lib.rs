//! wine-diary
//!
//! ワインラベルを撮影して解析し、テイスティング記録をn8n Webhookへ登録する。

pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod interactive;
pub mod photo;
pub mod wizard;
