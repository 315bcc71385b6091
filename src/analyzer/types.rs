use crate::error::{PlantScanError, Result};
use bytes::Bytes;
use image::{ImageFormat, ImageReader};
use std::io::Cursor;

/// Gemini が受け付けるが `image` クレートでは判定できない形式
const PASSTHROUGH_MIME_TYPES: &[&str] = &["image/heic", "image/heif"];

/// アップロードされた画像（メモリ上のみ）
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub bytes: Bytes,
    /// multipart で申告されたMIMEタイプ
    pub mime_type: Option<String>,
    pub file_name: Option<String>,
}

impl UploadedImage {
    pub fn new(bytes: impl Into<Bytes>, mime_type: Option<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type,
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// 画像であることを確認し、送信に使うMIMEタイプを決める
    ///
    /// 申告が `image/*` ならそれを使い、無い・`application/octet-stream` などの場合は
    /// マジックバイトから判定する。判定できた形式はヘッダまで読んで確認する。
    pub fn resolve_mime_type(&self) -> Result<String> {
        if self.bytes.is_empty() {
            return Err(PlantScanError::InvalidUpload("empty file".into()));
        }

        let declared = self
            .mime_type
            .as_deref()
            .map(|m| m.trim().to_ascii_lowercase())
            .filter(|m| !m.is_empty());

        match image::guess_format(&self.bytes) {
            Ok(format) => {
                self.check_header(format)?;
                Ok(declared
                    .filter(|m| m.starts_with("image/"))
                    .unwrap_or_else(|| format.to_mime_type().to_string()))
            }
            Err(_) => match declared {
                Some(m) if PASSTHROUGH_MIME_TYPES.contains(&m.as_str()) => Ok(m),
                other => Err(PlantScanError::InvalidUpload(
                    other.unwrap_or_else(|| "unknown format".into()),
                )),
            },
        }
    }

    /// 先頭のシグネチャだけ正しい壊れたファイルを弾く
    fn check_header(&self, format: ImageFormat) -> Result<()> {
        let (width, height) = ImageReader::with_format(Cursor::new(&self.bytes[..]), format)
            .into_dimensions()
            .map_err(|e| PlantScanError::InvalidUpload(format!("{}: {}", format.to_mime_type(), e)))?;
        if width == 0 || height == 0 {
            return Err(PlantScanError::InvalidUpload(format!(
                "{}: empty image",
                format.to_mime_type()
            )));
        }
        Ok(())
    }
}

/// 解析APIへ渡すインライン画像
#[derive(Debug, Clone, Copy)]
pub struct InlineImage<'a> {
    pub mime_type: &'a str,
    /// Base64エンコード済み
    pub data: &'a str,
}
