//! レポート用画像の取得と変換
//!
//! 画像参照（Data URI / http(s) URL）からバイト列を取得し、PNGへ正規化する。
//! レポート生成では画像の失敗を致命扱いしない。

mod convert;
mod orientation;

pub use convert::{normalize_to_png, PreparedImage};

use crate::error::{PlantScanError, Result};
use plant_scan_common::DataUri;
use std::time::Duration;

/// 画像参照の種類
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    DataUri(DataUri),
    Url(String),
}

impl ImageSource {
    pub fn parse(reference: &str) -> Result<Self> {
        let reference = reference.trim();
        if DataUri::is_data_uri(reference) {
            return Ok(ImageSource::DataUri(DataUri::parse(reference)?));
        }

        let lower = reference.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Ok(ImageSource::Url(reference.to_string()));
        }

        Err(PlantScanError::ImageLoad(
            "unsupported image reference (expected data URI or http(s) URL)".into(),
        ))
    }
}

/// 画像参照からバイト列を取得
pub async fn acquire(
    reference: &str,
    http: &reqwest::Client,
    timeout: Duration,
    max_bytes: usize,
) -> Result<Vec<u8>> {
    match ImageSource::parse(reference)? {
        ImageSource::DataUri(uri) => Ok(uri.decode()?),
        ImageSource::Url(url) => fetch(&url, http, timeout, max_bytes).await,
    }
}

async fn fetch(
    url: &str,
    http: &reqwest::Client,
    timeout: Duration,
    max_bytes: usize,
) -> Result<Vec<u8>> {
    let fetch_error = |e: reqwest::Error| {
        if e.is_timeout() {
            PlantScanError::Timeout {
                operation: "image fetch",
                seconds: timeout.as_secs(),
            }
        } else {
            PlantScanError::ImageFetch(e.to_string())
        }
    };

    let response = http
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(fetch_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(PlantScanError::ImageFetch(format!("status {} from {}", status.as_u16(), url)));
    }
    if response.content_length().is_some_and(|len| len as usize > max_bytes) {
        return Err(PlantScanError::ImageFetch(format!("image larger than {} bytes", max_bytes)));
    }

    let bytes = response.bytes().await.map_err(fetch_error)?;
    if bytes.len() > max_bytes {
        return Err(PlantScanError::ImageFetch(format!("image larger than {} bytes", max_bytes)));
    }
    Ok(bytes.to_vec())
}
