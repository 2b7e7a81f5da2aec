//! 設定ファイルのテスト

use tempfile::tempdir;
use wine_diary::config::{Config, Endpoint, ImageOptions, ENV_ANALYSIS_URL};
use wine_diary::error::WineDiaryError;

/// 設定ファイルが無ければデフォルト
#[test]
fn test_load_missing_file_defaults() {
    let dir = tempdir().expect("Failed to create temp dir");

    let config = Config::load_from(&dir.path().join("config.json")).unwrap();

    assert_eq!(config.list_url, None);
    assert_eq!(config.analyze_timeout_seconds, 30);
}

#[test]
fn test_save_and_load() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("nested").join("config.json");

    let config = Config {
        list_url: Some("https://n8n.example.com/webhook/get-wines".into()),
        retry_backoff_ms: 250,
        ..Config::default()
    };
    config.save_to(&path).expect("設定保存失敗");

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded.list_url, config.list_url);
    assert_eq!(loaded.retry_backoff_ms, 250);
    assert_eq!(loaded.image.max_width, 1024);
}

/// 一部の項目だけのファイルは残りをデフォルトで補う
#[test]
fn test_partial_file_uses_defaults() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"entry_url": "https://n8n.example.com", "image": {"max_width": 800}}"#).unwrap();

    let config = Config::load_from(&path).unwrap();

    assert_eq!(config.image.max_width, 800);
    assert_eq!(config.image.quality_percent(), 70);
    assert_eq!(
        config.resolve_endpoint(Endpoint::Entry).unwrap(),
        "https://n8n.example.com/webhook/wine-entry"
    );
}

#[test]
fn test_invalid_file_is_error() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{not json").unwrap();

    assert!(Config::load_from(&path).is_err());
}

/// 環境変数はファイルの値より優先
#[test]
fn test_env_overrides_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"analysis_url": "https://file.example.com"}"#).unwrap();

    let mut config = Config::load_from(&path).unwrap();
    config.apply_env(|key| (key == ENV_ANALYSIS_URL).then(|| "https://env.example.com/webhook/label".to_string()));

    assert_eq!(
        config.resolve_endpoint(Endpoint::Analyze).unwrap(),
        "https://env.example.com/webhook/label"
    );
}

/// URL更新後の再読み込みは新しい値を返し、環境変数は引き続き優先
#[test]
fn test_update_endpoints_then_reload() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"list_url": "https://old.example.com", "retry_backoff_ms": 250}"#).unwrap();

    let stored = Config::update_endpoints(
        &path,
        &[
            (Endpoint::List, "https://new.example.com".to_string()),
            (Endpoint::Analyze, "https://file.example.com".to_string()),
        ],
    )
    .unwrap();
    assert_eq!(stored.list_url.as_deref(), Some("https://new.example.com"));

    let reloaded = Config::load_layered(&path, |key| {
        (key == ENV_ANALYSIS_URL).then(|| "https://env.example.com".to_string())
    })
    .unwrap();

    assert_eq!(reloaded.list_url.as_deref(), Some("https://new.example.com"));
    assert_eq!(reloaded.analysis_url.as_deref(), Some("https://env.example.com"));
    assert_eq!(reloaded.retry_backoff_ms, 250);

    // 環境変数の値はファイルに書き込まれない
    let on_disk = Config::load_from(&path).unwrap();
    assert_eq!(on_disk.analysis_url.as_deref(), Some("https://file.example.com"));
}

#[test]
fn test_zero_max_width_rejected() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"image": {"max_width": 0}}"#).unwrap();

    let err = Config::load_from(&path).unwrap_err();

    assert!(matches!(err, WineDiaryError::Configuration(_)));
    assert!(err.to_string().contains("max_width"));
}

#[test]
fn test_out_of_range_quality_rejected() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");

    for quality in ["1.5", "0", "-0.2"] {
        std::fs::write(&path, format!(r#"{{"image": {{"jpeg_quality": {}}}}}"#, quality)).unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, WineDiaryError::Configuration(_)), "quality {}", quality);
    }
}

#[test]
fn test_validate_rejects_nan_quality() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.image = ImageOptions {
        jpeg_quality: f32::NAN,
        ..ImageOptions::default()
    };
    assert!(matches!(config.validate(), Err(WineDiaryError::Configuration(_))));

    let config = Config {
        analyze_timeout_seconds: 0,
        ..Config::default()
    };
    assert!(matches!(config.validate(), Err(WineDiaryError::Configuration(_))));
}
