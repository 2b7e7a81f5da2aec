//! Data URI ユーティリティ
//!
//! 正規化済み画像は `data:image/jpeg;base64,...` 形式で保持する。

/// Data URIからBase64データ部分を抽出
///
/// # Arguments
/// * `data_url` - "data:image/jpeg;base64,/9j/4AAQ..." 形式のData URI
///
/// # Returns
/// Base64エンコードされたデータ部分、または抽出失敗時はNone
pub fn extract_base64_from_data_url(data_url: &str) -> Option<&str> {
    data_url.split(',').nth(1)
}

/// Base64データからData URIを組み立て
pub fn build_data_url(mime_type: &str, base64_data: &str) -> String {
    format!("data:{};base64,{}", mime_type, base64_data)
}

/// Base64部分の長さから概算バイト数を求める（長さ × 3/4）
pub fn approx_payload_bytes(data_url: &str) -> usize {
    extract_base64_from_data_url(data_url)
        .map(|b64| b64.len() * 3 / 4)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_base64_from_data_url_jpeg() {
        let data_url = "data:image/jpeg;base64,/9j/4AAQSkZJRg==";
        assert_eq!(extract_base64_from_data_url(data_url), Some("/9j/4AAQSkZJRg=="));
    }

    #[test]
    fn test_extract_base64_from_data_url_invalid() {
        assert_eq!(extract_base64_from_data_url("not a data url"), None);
        assert_eq!(extract_base64_from_data_url(""), None);
    }

    #[test]
    fn test_build_data_url() {
        assert_eq!(build_data_url("image/jpeg", "AAAA"), "data:image/jpeg;base64,AAAA");
    }

    #[test]
    fn test_approx_payload_bytes() {
        assert_eq!(approx_payload_bytes("data:image/jpeg;base64,AAAAAAAA"), 6);
        assert_eq!(approx_payload_bytes("garbage"), 0);
    }
}
