//! PDF出力の統合テスト

use plant_scan::config::OutputMode;
use plant_scan::export::{pdf, RenderedReport, ReportRenderer};
use plant_scan::imaging::normalize_to_png;
use plant_scan_common::{parse_report_blocks, plan_report, ReportLayout};
use std::io::Cursor;
use tempfile::tempdir;

const ANALYSIS: &str = "Plant Name: Ficus lyrata\n\
Health Status: Some brown spots near the leaf edges.\n\
Care Suggestions: Keep away from cold drafts and water evenly.";

fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 255) as u8, (y % 255) as u8, 120])
    });
    let mut jpeg = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut jpeg), image::ImageFormat::Jpeg)
        .expect("Failed to encode JPEG");
    jpeg
}

#[test]
fn test_pdf_generation_without_image() {
    let dir = tempdir().expect("Failed to create temp dir");
    let output_path = dir.path().join("report.pdf");

    let renderer = ReportRenderer::new(1600, OutputMode::Memory, None);
    let report = renderer.render(ANALYSIS, None).expect("PDF生成に失敗");
    std::fs::write(&output_path, report.into_bytes().unwrap()).unwrap();

    let metadata = std::fs::metadata(&output_path).expect("ファイルメタデータ取得失敗");
    assert!(metadata.len() > 0, "PDFファイルが空");

    println!("PDF size: {} bytes", metadata.len());
}

#[test]
fn test_pdf_generation_with_jpeg() {
    let renderer = ReportRenderer::new(1600, OutputMode::Memory, None);
    let jpeg = sample_jpeg(320, 240);

    let with_image = renderer.render(ANALYSIS, Some(&jpeg)).unwrap().into_bytes().unwrap();
    let without_image = renderer.render(ANALYSIS, None).unwrap().into_bytes().unwrap();

    assert!(with_image.starts_with(b"%PDF-"));
    assert!(with_image.len() > without_image.len(), "画像が埋め込まれていない");
}

#[test]
fn test_large_image_is_downscaled_before_embedding() {
    let jpeg = sample_jpeg(1200, 600);
    let prepared = normalize_to_png(&jpeg, 400).unwrap();
    assert_eq!((prepared.width, prepared.height), (400, 200));

    let renderer = ReportRenderer::new(400, OutputMode::Memory, None);
    let plan = renderer.plan(ANALYSIS, Some(&prepared));
    let placement = plan.image().expect("画像配置がない");
    assert!((placement.height_pt - 120.0).abs() < 0.01, "{:?}", placement);
    assert!((placement.width_pt - 240.0).abs() < 0.01, "{:?}", placement);
}

#[test]
fn test_long_report_spans_pages() {
    let text = (0..120)
        .map(|i| format!("Observation {}: The leaves show healthy variegation and steady growth.", i))
        .collect::<Vec<_>>()
        .join("\n");

    let layout = ReportLayout::a4();
    let plan = plan_report(&layout, &parse_report_blocks(&text), None);
    assert!(plan.pages.len() > 1);

    let bytes = pdf::render_to_bytes(&plan, None).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
}

#[test]
fn test_temp_file_output_is_removed_after_use() {
    let dir = tempdir().expect("Failed to create temp dir");
    let renderer = ReportRenderer::new(1600, OutputMode::TempFile, Some(dir.path().to_path_buf()));

    let report = renderer.render(ANALYSIS, None).unwrap();
    let path = match &report {
        RenderedReport::TempFile { path, len } => {
            assert!(*len > 0);
            path.to_path_buf()
        }
        RenderedReport::InMemory(_) => panic!("temp-file モードなのにメモリ出力"),
    };
    assert!(path.exists());

    let bytes = report.into_bytes().unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    assert!(!path.exists(), "一時ファイルが残っている");
}
