use super::AppState;
use crate::analyzer::{self, UploadedImage};
use crate::error::{PlantScanError, Result};
use crate::export::{RenderedReport, REPORT_FILE_NAME};
use crate::imaging;
use axum::body::Body;
use axum::extract::multipart::MultipartError;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::Json;
use futures::StreamExt;
use plant_scan_common::{AnalyzeResponse, DataUri, ReportRequest};
use tokio_util::io::ReaderStream;

/// multipart のファイルフィールド名
const IMAGE_FIELD: &str = "image";

pub async fn analyze(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalyzeResponse>> {
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!(operation = "analyze", rejection = %e, "not a multipart request");
        PlantScanError::MissingUpload
    })?;

    let upload = read_image_field(&mut multipart)
        .await?
        .ok_or(PlantScanError::MissingUpload)?;

    let response = analyzer::analyze_upload(state.analyzer.as_ref(), upload).await?;
    Ok(Json(response))
}

/// `image` フィールドを読む（空ファイルは未アップロード扱い）
async fn read_image_field(multipart: &mut Multipart) -> Result<Option<UploadedImage>> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let mime_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;
        if bytes.is_empty() {
            return Ok(None);
        }

        let upload = UploadedImage::new(bytes, mime_type);
        return Ok(Some(match file_name {
            Some(name) => upload.with_file_name(name),
            None => upload,
        }));
    }
    Ok(None)
}

fn multipart_error(e: MultipartError) -> PlantScanError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        PlantScanError::PayloadTooLarge(e.body_text())
    } else {
        PlantScanError::InvalidRequest(e.body_text())
    }
}

pub async fn download(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ReportRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(request) = payload.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            PlantScanError::PayloadTooLarge(e.body_text())
        } else {
            PlantScanError::InvalidRequest(e.body_text())
        }
    })?;

    let results = request
        .analysis_text()
        .ok_or(PlantScanError::MissingResults)?
        .to_string();

    let image_bytes = match request.image_reference() {
        Some(reference) => {
            let kind = if DataUri::is_data_uri(reference) { "data_uri" } else { "url" };
            match imaging::acquire(
                reference,
                &state.http,
                state.config.image_fetch_timeout(),
                state.config.max_upload_bytes,
            )
            .await
            {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    tracing::warn!(operation = "download", image = kind, error = %e, "image acquisition failed; rendering without image");
                    None
                }
            }
        }
        None => None,
    };

    tracing::info!(
        operation = "download",
        chars = results.len(),
        image_bytes = image_bytes.as_ref().map_or(0, Vec::len),
        "rendering report"
    );

    let renderer = state.renderer.clone();
    let report = tokio::task::spawn_blocking(move || renderer.render(&results, image_bytes.as_deref()))
        .await
        .map_err(|e| PlantScanError::PdfGeneration(format!("render task failed: {}", e)))??;

    report_response(report).await
}

/// 完成したPDFをレスポンスにする
async fn report_response(report: RenderedReport) -> Result<Response> {
    let len = report.len();
    let body = match report {
        RenderedReport::InMemory(bytes) => Body::from(bytes),
        RenderedReport::TempFile { path, .. } => {
            let file = tokio::fs::File::open(&path).await?;
            // 一時ファイルはボディがドロップされるまで保持し、その後削除
            let stream = ReaderStream::new(file).map(move |chunk| {
                let _keep = &path;
                chunk
            });
            Body::from_stream(stream)
        }
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", REPORT_FILE_NAME),
        )
        .header(header::CONTENT_LENGTH, len)
        .body(body)
        .map_err(|e| PlantScanError::PdfGeneration(e.to_string()))
}
