use async_trait::async_trait;
use common::errors::AppError;
use std::path::Path;

/// 图片处理协作方：解码/缩放由外部实现提供
#[async_trait]
pub trait ImageService: Send + Sync {
    /// 原地等比缩放到目标宽度
    async fn resize(&self, path: &Path, width: u32) -> Result<(), AppError>;
}

/// 按魔数嗅探图片 MIME 类型
pub fn mime_from_bytes(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("image/png");
    }
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    if bytes.starts_with(b"BM") {
        return Some("image/bmp");
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return Some("image/gif");
    }
    None
}

/// MIME 对应的文件扩展名
pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    match mime {
        "image/png" => Some(".png"),
        "image/jpeg" => Some(".jpg"),
        "image/bmp" => Some(".bmp"),
        "image/gif" => Some(".gif"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniffs_known_signatures() {
        assert_eq!(mime_from_bytes(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0]), Some("image/png"));
        assert_eq!(mime_from_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(mime_from_bytes(b"BM1234"), Some("image/bmp"));
        assert_eq!(mime_from_bytes(b"GIF89a..."), Some("image/gif"));
    }

    #[test]
    fn test_unknown_bytes_have_no_type() {
        assert_eq!(mime_from_bytes(b"plain text"), None);
        assert_eq!(mime_from_bytes(&[]), None);
    }
}
