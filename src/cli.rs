use clap::{Parser, Subcommand};
use std::path::PathBuf;
use wine_diary_common::WineType;

#[derive(Parser)]
#[command(name = "wine-diary")]
#[command(about = "ワインラベル撮影・テイスティング記録ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// RUST_LOG 未設定時のログフィルタ
pub fn default_log_directives(verbose: bool) -> &'static str {
    if verbose {
        "wine_diary=debug,wine_diary_common=debug"
    } else {
        "warn"
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// コレクション一覧を表示
    List {
        /// 種類で絞り込み (red/white/rose/sparkling/dessert/fortified)
        #[arg(short = 't', long = "type")]
        wine_type: Option<WineType>,

        /// 名前・生産者で検索
        #[arg(short, long)]
        query: Option<String>,

        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// テイスティングノートを新しい順に表示
    Notes {
        /// 名前・生産者・ノート本文で検索
        #[arg(short, long)]
        query: Option<String>,

        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// コレクションの統計を表示
    Stats,

    /// ラベル写真を解析
    Analyze {
        /// 写真ファイル
        #[arg(required = true)]
        image: PathBuf,

        /// 解析結果をそのままJSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 対話的に記録を追加
    Add {
        /// ラベル写真（指定するとStep1で解析する）
        #[arg(short, long)]
        photo: Option<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// 一覧取得Webhook
        #[arg(long)]
        set_list_url: Option<String>,

        /// 登録Webhook（ベースURLも可）
        #[arg(long)]
        set_entry_url: Option<String>,

        /// ラベル解析Webhook
        #[arg(long)]
        set_analysis_url: Option<String>,
    },

    /// Webhookの疎通確認
    Health,
}
