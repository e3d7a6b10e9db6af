use crate::config::normalize_extension;

const FALLBACK: &str = "application/octet-stream";

/// 확장자만으로 MIME 타입을 결정한다. 파일 내용은 보지 않는다.
pub fn mime_for_extension(ext: &str) -> &'static str {
    match normalize_extension(ext).as_str() {
        ".gif" => "image/gif",
        ".mp4" => "video/mp4",
        ".webm" => "video/webm",
        ".mov" => "video/quicktime",
        ".avi" => "video/x-msvideo",
        ".jpg" | ".jpeg" => "image/jpeg",
        ".png" => "image/png",
        ".webp" => "image/webp",
        _ => FALLBACK,
    }
}
