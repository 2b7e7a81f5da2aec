use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;
use wine_diary::config::{Config, ENV_ANALYSIS_URL};
use wine_diary::error::WineDiaryError;
use wine_diary::gateway::Gateway;
use wine_diary::photo::{normalize_image, RawImage};

#[tokio::test]
async fn analysis_webhook_integration() {
    let url = match std::env::var(ENV_ANALYSIS_URL) {
        Ok(url) if !url.trim().is_empty() => url,
        _ => {
            eprintln!("{} not set; skipping integration test", ENV_ANALYSIS_URL);
            return;
        }
    };

    let config = Config {
        analysis_url: Some(url),
        ..Config::default()
    };
    let gateway = Gateway::with_reqwest(config);

    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 64, image::Rgb([200, 200, 200])));
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png).expect("png encode failed");
    let encoded = normalize_image(
        &RawImage::new(buf.into_inner(), Some("image/png".into())),
        &gateway.config().image,
    )
    .expect("normalize failed");

    // 空のラベルなので空レスポンスも正常な応答として扱う
    match gateway.analyze_label(&encoded).await {
        Ok(result) => eprintln!("analysis result: {:?}", result),
        Err(WineDiaryError::EmptyResponse) => eprintln!("empty response"),
        Err(e) => panic!("analysis webhook failed: {}", e),
    }
}
