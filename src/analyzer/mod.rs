//! 植物写真の解析
//!
//! アップロード画像をBase64化して解析APIへ1回だけ送り、
//! 応答形式の違いを吸収したテキストと画像のData URIを返す。

mod gemini;
mod types;

pub use gemini::GeminiClient;
pub use types::{InlineImage, UploadedImage};

use crate::error::Result;
use async_trait::async_trait;
use plant_scan_common::{build_analysis_prompt, AnalyzeResponse, DataUri, ModelOutput};

/// 画像+プロンプトからテキストを返す外部解析機能
#[async_trait]
pub trait AnalysisCapability: Send + Sync {
    async fn analyze(&self, prompt: &str, image: InlineImage<'_>) -> Result<ModelOutput>;
}

/// 画像1枚を解析してレスポンスを組み立てる
pub async fn analyze_upload(
    capability: &dyn AnalysisCapability,
    upload: UploadedImage,
) -> Result<AnalyzeResponse> {
    let mime_type = upload.resolve_mime_type()?;
    let data_uri = DataUri::encode(&mime_type, &upload.bytes);
    tracing::info!(
        operation = "analyze",
        mime_type = %mime_type,
        bytes = upload.len(),
        file_name = upload.file_name.as_deref().unwrap_or("-"),
        "sending image for analysis"
    );
    drop(upload);

    let prompt = build_analysis_prompt();
    let output = capability
        .analyze(
            &prompt,
            InlineImage {
                mime_type: &data_uri.mime_type,
                data: &data_uri.data,
            },
        )
        .await?;

    let shape = match &output {
        ModelOutput::DirectText(_) => "direct_text",
        ModelOutput::CandidateList(_) => "candidate_list",
        ModelOutput::Unrecognized => "unrecognized",
    };
    let results = output.into_text();
    tracing::info!(operation = "analyze", shape, chars = results.len(), "analysis complete");

    Ok(AnalyzeResponse::new(results, data_uri.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlantScanError;
    use base64::Engine;
    use plant_scan_common::NO_ANALYSIS_FOUND;
    use std::io::Cursor;
    use std::sync::Mutex;

    fn leaf_png() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([34, 139, 34]));
        let mut png = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        png
    }

    struct FixedOutput {
        output: ModelOutput,
        seen: Mutex<Option<(String, String)>>,
    }

    #[async_trait]
    impl AnalysisCapability for FixedOutput {
        async fn analyze(&self, _prompt: &str, image: InlineImage<'_>) -> Result<ModelOutput> {
            *self.seen.lock().unwrap() = Some((image.mime_type.to_string(), image.data.to_string()));
            Ok(self.output.clone())
        }
    }

    struct Failing;

    #[async_trait]
    impl AnalysisCapability for Failing {
        async fn analyze(&self, _prompt: &str, _image: InlineImage<'_>) -> Result<ModelOutput> {
            Err(PlantScanError::ApiCall("quota exceeded".into()))
        }
    }

    fn fixed(output: ModelOutput) -> FixedOutput {
        FixedOutput {
            output,
            seen: Mutex::new(None),
        }
    }

    fn upload() -> UploadedImage {
        UploadedImage::new(leaf_png(), Some("image/png".into()))
    }

    #[tokio::test]
    async fn test_direct_text_shape() {
        let capability = fixed(ModelOutput::DirectText("Plant Name: Fern".into()));
        let response = analyze_upload(&capability, upload()).await.unwrap();
        assert!(response.success);
        assert_eq!(response.results, "Plant Name: Fern");
    }

    #[tokio::test]
    async fn test_unrecognized_shape_falls_back() {
        let capability = fixed(ModelOutput::Unrecognized);
        let response = analyze_upload(&capability, upload()).await.unwrap();
        assert_eq!(response.results, NO_ANALYSIS_FOUND);
    }

    #[tokio::test]
    async fn test_image_round_trips_through_data_uri() {
        let capability = fixed(ModelOutput::DirectText("ok".into()));
        let response = analyze_upload(&capability, upload()).await.unwrap();

        let uri = DataUri::parse(&response.image).unwrap();
        assert_eq!(uri.mime_type, "image/png");
        assert_eq!(uri.decode().unwrap(), leaf_png());

        let (mime, data) = capability.seen.lock().unwrap().clone().unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(
            base64::engine::general_purpose::STANDARD.decode(data).unwrap(),
            leaf_png()
        );
    }

    #[tokio::test]
    async fn test_capability_error_is_surfaced() {
        let err = analyze_upload(&Failing, upload()).await.unwrap_err();
        assert!(matches!(err, PlantScanError::ApiCall(ref m) if m == "quota exceeded"));
    }

    #[tokio::test]
    async fn test_invalid_upload_never_reaches_capability() {
        let capability = fixed(ModelOutput::DirectText("unused".into()));
        let err = analyze_upload(&capability, UploadedImage::new(b"not an image".to_vec(), None))
            .await
            .unwrap_err();
        assert!(matches!(err, PlantScanError::InvalidUpload(_)));
        assert!(capability.seen.lock().unwrap().is_none());
    }
}
