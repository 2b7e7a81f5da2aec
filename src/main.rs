use anyhow::Context;
use clap::Parser;
use std::path::Path;
use tracing_subscriber::EnvFilter;
use wine_diary::cli::{default_log_directives, Cli, Commands};
use wine_diary::config::{Config, Endpoint};
use wine_diary::error::Result;
use wine_diary::gateway::Gateway;
use wine_diary::interactive::{create_spinner, run_add_wizard};
use wine_diary::photo::{normalize_image_async, RawImage};
use wine_diary_common::{
    entries_from_records, normalize_analysis, tasting_journal, CellarEntry, CellarFilter, CellarStats,
    LabelFields,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load().context("設定の読み込みに失敗しました")?;

    if let Err(e) = run(cli.command, config).await {
        tracing::debug!("{:?}", e);
        eprintln!("✖ {}", e.user_message());
        std::process::exit(1);
    }

    Ok(())
}

/// RUST_LOG があればそれを優先し、無ければ --verbose に応じた既定値
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_directives(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::List { wine_type, query, json } => {
            let gateway = Gateway::with_reqwest(config);

            let spinner = create_spinner("컬렉션 불러오는 중...");
            let records = gateway.list_entries().await;
            spinner.finish_and_clear();

            let entries = entries_from_records(&records?);
            let filter = CellarFilter {
                query: query.unwrap_or_default(),
                wine_type,
                include_notes: false,
            };
            let filtered = filter.apply(&entries);

            if json {
                println!("{}", serde_json::to_string_pretty(&filtered)?);
            } else if filtered.is_empty() {
                println!("검색 결과가 없습니다");
            } else {
                println!("🍷 내 와인 셀러 ({}/{})\n", filtered.len(), entries.len());
                for entry in filtered {
                    print_entry(entry);
                }
            }
        }

        Commands::Notes { query, json } => {
            let gateway = Gateway::with_reqwest(config);

            let spinner = create_spinner("테이스팅 노트 불러오는 중...");
            let records = gateway.list_entries().await;
            spinner.finish_and_clear();

            let entries = entries_from_records(&records?);
            let notes = tasting_journal(&entries, query.as_deref().unwrap_or_default());

            if json {
                println!("{}", serde_json::to_string_pretty(&notes)?);
            } else if notes.is_empty() {
                println!("검색 결과가 없습니다");
            } else {
                println!("📝 테이스팅 노트 ({})\n", notes.len());
                for entry in notes {
                    print_note(entry);
                }
            }
        }

        Commands::Stats => {
            let gateway = Gateway::with_reqwest(config);

            let spinner = create_spinner("통계 계산 중...");
            let records = gateway.list_entries().await;
            spinner.finish_and_clear();

            let entries = entries_from_records(&records?);
            let stats = CellarStats::compute(&entries);

            println!("📊 와인 통계\n");
            println!("  총 와인: {}병", stats.total_wines);
            println!("  총 가치: ₩{:.0}", stats.total_value);
            println!("  평균 평점: {}", stats.average_rating_label());
            println!("\n  종류별:");
            for (wine_type, count) in &stats.by_type {
                if *count > 0 {
                    println!("    {:<6} {}", wine_type.label_kr(), count);
                }
            }
        }

        Commands::Analyze { image, json } => {
            let gateway = Gateway::with_reqwest(config);
            let raw = RawImage::from_path(&image)?;
            let encoded = normalize_image_async(raw, gateway.config().image).await?;

            let spinner = create_spinner("라벨 분석 중...");
            let result = gateway.analyze_label(&encoded).await;
            spinner.finish_and_clear();
            let result = result?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }

            let extraction = normalize_analysis(&result, &LabelFields::default());
            if extraction.extraction_failed {
                println!("⚠ 라벨을 인식하지 못했습니다. 다시 촬영해 주세요.");
                return Ok(());
            }
            print_label(&extraction.fields);
        }

        Commands::Add { photo } => {
            let gateway = Gateway::with_reqwest(config);
            run_add_wizard(&gateway, photo).await?;
        }

        Commands::Config { show, set_list_url, set_entry_url, set_analysis_url } => {
            let path = Config::config_path()?;
            let updates: Vec<(Endpoint, String)> = [
                (Endpoint::List, set_list_url),
                (Endpoint::Entry, set_entry_url),
                (Endpoint::Analyze, set_analysis_url),
            ]
            .into_iter()
            .filter_map(|(endpoint, url)| url.map(|url| (endpoint, url)))
            .collect();

            let config = if updates.is_empty() {
                config
            } else {
                Config::update_endpoints(&path, &updates)?;
                for (endpoint, _) in &updates {
                    println!("✔ {} を設定しました", endpoint.label());
                }
                Config::load_layered(&path, |key| std::env::var(key).ok())?
            };

            if show {
                print_config(&config, &path);
            }
        }

        Commands::Health => {
            let gateway = Gateway::with_reqwest(config);

            let spinner = create_spinner("Webhook 확인 중...");
            let statuses = gateway.health_check().await;
            spinner.finish_and_clear();

            for status in &statuses {
                let url = status.url.as_deref().unwrap_or("-");
                match &status.outcome {
                    Ok(code) => println!("✔ {} ({}) HTTP {}", status.endpoint.label(), url, code),
                    Err(reason) => println!("✖ {} ({}) {}", status.endpoint.label(), url, reason),
                }
            }
        }
    }

    Ok(())
}

fn print_entry(entry: &CellarEntry) {
    let vintage = entry.vintage.map(|v| v.to_string()).unwrap_or_else(|| "NV".into());
    let stars = "★".repeat(entry.rating.round().clamp(0.0, 5.0) as usize);
    println!(
        "  [{}] {} {} ({}) {}",
        entry.wine_type.label_kr(),
        entry.display_name(),
        vintage,
        if entry.producer.is_empty() { "-" } else { entry.producer.as_str() },
        stars
    );
}

fn print_note(entry: &CellarEntry) {
    let date = entry
        .tasting_date()
        .map(|d| d.to_string())
        .unwrap_or_else(|| "----------".into());
    let stars = "★".repeat(entry.rating.round().clamp(0.0, 5.0) as usize);
    println!("  {} {} {}", date, entry.display_name(), stars);
    if !entry.note.trim().is_empty() {
        println!("      {}", entry.note.trim());
    }
}

fn print_label(fields: &LabelFields) {
    let rows = [
        ("영문명", &fields.name_en),
        ("한글명", &fields.name_kr),
        ("생산자", &fields.producer),
        ("빈티지", &fields.vintage),
        ("국가", &fields.country),
        ("지역", &fields.region),
        ("품종", &fields.variety),
        ("도수", &fields.abv),
        ("가격", &fields.price),
    ];

    println!("🏷  라벨 분석 결과\n");
    println!("  {:<6} {}", "종류", fields.wine_type.label_kr());
    for (label, value) in rows {
        if !value.is_empty() {
            println!("  {:<6} {}", label, value);
        }
    }
}

fn print_config(config: &Config, path: &Path) {
    println!("設定 ({}):", path.display());
    for endpoint in Endpoint::ALL {
        match config.resolve_endpoint(endpoint) {
            Ok(url) => println!("  {}: {}", endpoint.label(), url),
            Err(_) => println!("  {}: 未設定 ({})", endpoint.label(), endpoint.env_var()),
        }
    }
    println!("  最大画像幅: {}px", config.image.max_width);
    println!("  JPEG品質: {}", config.image.jpeg_quality);
    println!("  解析タイムアウト: {}秒", config.analyze_timeout_seconds);
    println!("  再試行待機: {}ms", config.retry_backoff_ms);
}
