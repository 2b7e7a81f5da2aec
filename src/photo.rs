//! ラベル写真の正規化
//!
//! 選択された写真をデコードし、最大幅を超える場合は縮小してから
//! JPEGで再エンコードし、Data URIとして保持する。

use crate::config::ImageOptions;
use crate::error::{Result, WineDiaryError};
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageDecoder, ImageReader};
use std::io::Cursor;
use std::path::Path;
use wine_diary_common::data_url::{approx_payload_bytes, build_data_url, extract_base64_from_data_url};

pub const JPEG_MIME: &str = "image/jpeg";

/// 読み込んだままの写真
#[derive(Debug, Clone)]
pub struct RawImage {
    pub bytes: Vec<u8>,
    /// 申告されたMIMEタイプ（拡張子からの推定）
    pub mime_type: Option<String>,
}

impl RawImage {
    pub fn new(bytes: Vec<u8>, mime_type: Option<String>) -> Self {
        Self { bytes, mime_type }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let mime_type = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| match ext.to_lowercase().as_str() {
                "jpg" | "jpeg" => "image/jpeg".to_string(),
                "png" => "image/png".to_string(),
                "webp" => "image/webp".to_string(),
                "heic" => "image/heic".to_string(),
                other => format!("image/{}", other),
            });
        Ok(Self { bytes, mime_type })
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// 正規化済み画像（JPEGのData URI）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub data_url: String,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    /// Base64部分
    pub fn base64_payload(&self) -> &str {
        extract_base64_from_data_url(&self.data_url).unwrap_or_default()
    }

    /// JPEGバイト列（multipart送信用）
    pub fn jpeg_bytes(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(self.base64_payload())
            .map_err(|e| WineDiaryError::Decode(format!("Base64デコード失敗: {}", e)))
    }

    /// 概算サイズ（Base64長 × 3/4）
    pub fn approx_bytes(&self) -> usize {
        approx_payload_bytes(&self.data_url)
    }
}

/// 縮小後のサイズを計算（拡大はしない）
pub fn target_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width {
        return (width, height);
    }
    let scaled = (height as f64 * max_width as f64 / width as f64).round() as u32;
    (max_width, scaled.max(1))
}

/// 写真を正規化する
pub fn normalize_image(raw: &RawImage, options: &ImageOptions) -> Result<EncodedImage> {
    if raw.bytes.is_empty() {
        return Err(WineDiaryError::Decode("空のファイルです".into()));
    }

    tracing::debug!(
        "写真を処理中: type={}, size={} bytes",
        raw.mime_type.as_deref().unwrap_or("unknown"),
        raw.size()
    );

    // 撮影時の向き（EXIF Orientation）を反映してから幅を判定する
    let mut decoder = ImageReader::new(Cursor::new(&raw.bytes))
        .with_guessed_format()?
        .into_decoder()
        .map_err(|e| decode_error(raw, e))?;
    let orientation = decoder.orientation().map_err(|e| decode_error(raw, e))?;
    let mut decoded = DynamicImage::from_decoder(decoder).map_err(|e| decode_error(raw, e))?;
    decoded.apply_orientation(orientation);

    let (width, height) = target_dimensions(decoded.width(), decoded.height(), options.max_width);
    let resized = if width != decoded.width() {
        decoded.resize_exact(width, height, FilterType::Triangle)
    } else {
        decoded
    };

    // JPEGはアルファを持てないのでRGBに落とす
    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());
    let mut jpeg = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut jpeg, options.quality_percent());
    rgb.write_with_encoder(encoder)
        .map_err(|e| WineDiaryError::Decode(format!("JPEGエンコード失敗: {}", e)))?;

    let payload = base64::engine::general_purpose::STANDARD.encode(&jpeg);
    let encoded = EncodedImage {
        data_url: build_data_url(JPEG_MIME, &payload),
        width,
        height,
    };

    tracing::info!(
        "リサイズ後のペイロード: {}x{}px, {}, ~{} bytes",
        encoded.width,
        encoded.height,
        JPEG_MIME,
        encoded.approx_bytes()
    );

    Ok(encoded)
}

fn decode_error(raw: &RawImage, e: image::ImageError) -> WineDiaryError {
    let hint = if raw.mime_type.as_deref() == Some("image/heic") {
        " (HEIC形式の場合はJPEGへの変換が必要です)"
    } else {
        ""
    };
    WineDiaryError::Decode(format!("{}{}", e, hint))
}

/// デコードはブロッキング処理なので専用スレッドで実行する
pub async fn normalize_image_async(raw: RawImage, options: ImageOptions) -> Result<EncodedImage> {
    tokio::task::spawn_blocking(move || normalize_image(&raw, &options))
        .await
        .map_err(|e| WineDiaryError::Decode(format!("画像処理タスクが失敗しました: {}", e)))?
}
