//! Data URI の生成と解析
//!
//! `data:<mime>;base64,<payload>` 形式のみ扱う

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// MIMEタイプが取れないときの既定値
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Base64ペイロードを保持するData URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime_type: String,
    /// Base64エンコード済みデータ
    pub data: String,
}

impl DataUri {
    /// 生バイト列からData URIを作成
    pub fn encode(mime_type: &str, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            data: STANDARD.encode(bytes),
        }
    }

    /// エンコード済みのBase64文字列からData URIを作成
    pub fn from_base64(mime_type: &str, data: String) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            data,
        }
    }

    /// "data:image/jpeg;base64,/9j/4AAQ..." を解析
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| Error::DataUri("missing `data:` prefix".into()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| Error::DataUri("missing `,` separator".into()))?;

        let mut params = header.split(';');
        let mime_type = params
            .next()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();
        if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
            return Err(Error::DataUri("only base64 payloads are supported".into()));
        }

        Ok(Self {
            mime_type,
            data: payload.trim().to_string(),
        })
    }

    /// ペイロードをデコード
    pub fn decode(&self) -> Result<Vec<u8>> {
        Ok(STANDARD.decode(self.data.as_bytes())?)
    }

    pub fn is_data_uri(reference: &str) -> bool {
        reference.trim_start().starts_with("data:")
    }
}

impl std::fmt::Display for DataUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.data)
    }
}
