//! Saving the pairing QR code to disk.

use crate::error::{Error, Result};
use base64::{prelude::BASE64_STANDARD, Engine};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl QrImage {
    /// Parse a `data:<mime>;base64,<payload>` URI.
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let rest = uri
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| Error::Parse("QR image is not a data URI".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| Error::Parse("QR data URI has no payload".to_string()))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| Error::Parse("QR data URI is not base64 encoded".to_string()))?;

        let bytes = BASE64_STANDARD
            .decode(payload.trim())
            .map_err(|e| Error::Parse(format!("invalid QR payload: {}", e)))?;

        Ok(Self {
            mime_type: if mime_type.is_empty() {
                "text/plain".to_string()
            } else {
                mime_type.to_string()
            },
            bytes,
        })
    }

    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/png" => "png",
            "image/jpeg" => "jpg",
            "image/svg+xml" => "svg",
            "image/gif" => "gif",
            _ => "bin",
        }
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        tokio::fs::write(path, &self.bytes).await?;
        info!(path = %path.display(), bytes = self.bytes.len(), "QR image written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    #[test]
    fn test_decode_png_uri() {
        let uri = format!("data:image/png;base64,{}", BASE64_STANDARD.encode(PNG_MAGIC));
        let image = QrImage::from_data_uri(&uri).unwrap();

        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.extension(), "png");
        assert_eq!(image.bytes, PNG_MAGIC);
    }

    #[test]
    fn test_rejects_non_data_uri() {
        assert!(matches!(
            QrImage::from_data_uri("https://example.test/qr.png"),
            Err(Error::Parse(_))
        ));
        assert!(matches!(QrImage::from_data_uri("data:image/png,abc"), Err(Error::Parse(_))));
        assert!(matches!(
            QrImage::from_data_uri("data:image/png;base64,@@@"),
            Err(Error::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_save_writes_bytes() {
        let uri = format!("data:image/png;base64,{}", BASE64_STANDARD.encode(PNG_MAGIC));
        let image = QrImage::from_data_uri(&uri).unwrap();
        let path = std::env::temp_dir().join(format!("wabot-qr-{}.png", std::process::id()));

        image.save(&path).await.unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), PNG_MAGIC);
        let _ = tokio::fs::remove_file(&path).await;
    }
}
