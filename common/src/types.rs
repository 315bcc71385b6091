//! HTTP APIで受け渡す型

use serde::{Deserialize, Serialize};

/// `POST /analyze` の成功レスポンス
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalyzeResponse {
    pub success: bool,
    /// 解析テキスト（"ラベル: 説明" 形式の行の集まり）
    pub results: String,
    /// アップロード画像をそのまま返すData URI
    pub image: String,
}

impl AnalyzeResponse {
    pub fn new(results: String, image: String) -> Self {
        Self {
            success: true,
            results,
            image,
        }
    }
}

/// `POST /download` のリクエストボディ
///
/// `results` が欠けていてもデシリアライズ自体は成功させ、
/// 400の判定はハンドラ側で行う。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReportRequest {
    #[serde(default)]
    pub results: Option<String>,

    /// Data URI または http(s) URL
    #[serde(default)]
    pub image: Option<String>,
}

impl ReportRequest {
    /// 空白のみの解析テキストは未指定扱い
    pub fn analysis_text(&self) -> Option<&str> {
        self.results
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }

    /// 空文字の画像参照は未指定扱い
    pub fn image_reference(&self) -> Option<&str> {
        self.image
            .as_deref()
            .map(str::trim)
            .filter(|reference| !reference.is_empty())
    }
}

/// エラーレスポンス `{ "error": "..." }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_response_serialization() {
        let response = AnalyzeResponse::new("Plant Name: Fern".into(), "data:image/png;base64,AA==".into());
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["results"], "Plant Name: Fern");
        assert_eq!(json["image"], "data:image/png;base64,AA==");
    }

    #[test]
    fn test_report_request_missing_results() {
        let request: ReportRequest = serde_json::from_str("{}").unwrap();
        assert!(request.analysis_text().is_none());
        assert!(request.image_reference().is_none());
    }

    #[test]
    fn test_report_request_whitespace_results() {
        let request: ReportRequest =
            serde_json::from_str(r#"{"results": "  \n ", "image": ""}"#).unwrap();
        assert!(request.analysis_text().is_none());
        assert!(request.image_reference().is_none());
    }

    #[test]
    fn test_report_request_full() {
        let request: ReportRequest = serde_json::from_str(
            r#"{"results": "Plant Name: Fern", "image": "https://example.com/fern.png"}"#,
        )
        .unwrap();
        assert_eq!(request.analysis_text(), Some("Plant Name: Fern"));
        assert_eq!(request.image_reference(), Some("https://example.com/fern.png"));
    }
}
