//! 実APIを使う統合テスト（GEMINI_API_KEY 未設定ならスキップ）

use plant_scan::analyzer::{analyze_upload, GeminiClient, UploadedImage};
use plant_scan::config::Config;
use std::io::Cursor;

#[tokio::test]
async fn gemini_analyze_integration() {
    let api_key = match std::env::var("GEMINI_API_KEY") {
        Ok(key) if !key.trim().is_empty() => key,
        _ => {
            eprintln!("GEMINI_API_KEY not set; skipping integration test");
            return;
        }
    };

    let mut config = Config {
        api_key: Some(api_key),
        ..Config::default()
    };
    if let Ok(model) = std::env::var("GEMINI_MODEL") {
        config.model = model;
    }

    let img = image::RgbImage::from_fn(64, 64, |x, y| {
        if (x / 8 + y / 8) % 2 == 0 {
            image::Rgb([34, 139, 34])
        } else {
            image::Rgb([240, 240, 220])
        }
    });
    let mut png = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .expect("Failed to encode PNG");

    let client = GeminiClient::new(&config).expect("client");
    let response = analyze_upload(&client, UploadedImage::new(png, Some("image/png".into())))
        .await
        .expect("gemini request failed");

    assert!(response.success);
    assert!(!response.results.trim().is_empty());
    println!("{}", response.results);
}
