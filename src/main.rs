use anyhow::Context;
use clap::Parser;
use plant_scan::analyzer::{self, GeminiClient, UploadedImage};
use plant_scan::cli::{Cli, Commands};
use plant_scan::config::Config;
use plant_scan::export::{ReportRenderer, REPORT_FILE_NAME};
use plant_scan::{imaging, server};
use plant_scan_common::DataUri;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load().context("failed to load config")?;

    match cli.command {
        Commands::Serve { host, port, output_mode, public_dir } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(mode) = output_mode {
                config.output_mode = mode;
            }
            if public_dir.is_some() {
                config.public_dir = public_dir;
            }
            server::serve(config).await?;
        }

        Commands::Analyze { image, output } => {
            println!("🌱 plant-scan - 写真解析\n");

            let bytes = std::fs::read(&image)
                .with_context(|| format!("failed to read {}", image.display()))?;
            let mut upload = UploadedImage::new(bytes, None);
            if let Some(name) = image.file_name() {
                upload = upload.with_file_name(name.to_string_lossy());
            }

            println!("[1/2] AI解析中...");
            let client = GeminiClient::new(&config)?;
            let response = analyzer::analyze_upload(&client, upload).await?;
            println!("✔ 解析完了\n");

            match output {
                Some(path) => {
                    std::fs::write(&path, &response.results)?;
                    println!("[2/2] 結果を保存: {}", path.display());
                }
                None => println!("{}", response.results),
            }
        }

        Commands::Report { input, image, output } => {
            println!("📄 plant-scan - レポート生成\n");

            let results = std::fs::read_to_string(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;

            let image_bytes = match image {
                Some(reference) => Some(load_image_reference(&reference, &config).await?),
                None => None,
            };

            let renderer = ReportRenderer::from_config(&config);
            let report = renderer.render(&results, image_bytes.as_deref())?;
            let output = output.unwrap_or_else(|| PathBuf::from(REPORT_FILE_NAME));
            std::fs::write(&output, report.into_bytes()?)?;

            println!("✔ PDFを保存: {}", output.display());
        }

        Commands::Config { set_api_key, show } => {
            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                println!("設定:");
                println!("  モデル: {}", config.model);
                println!("  APIエンドポイント: {}", config.api_base_url);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  最大画像サイズ: {}px", config.max_image_size);
                println!("  待ち受け: {}:{}", config.host, config.port);
                println!("  出力モード: {}", config.output_mode);
                println!("  APIキー: {}", if config.api_key.is_some() { "設定済み" } else { "未設定" });
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "plant_scan=debug,tower_http=debug"
    } else {
        "plant_scan=info,tower_http=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

/// パス / data URI / URL のいずれかから画像を読む
async fn load_image_reference(reference: &str, config: &Config) -> anyhow::Result<Vec<u8>> {
    if DataUri::is_data_uri(reference)
        || reference.starts_with("http://")
        || reference.starts_with("https://")
    {
        let http = reqwest::Client::new();
        let bytes = imaging::acquire(
            reference,
            &http,
            config.image_fetch_timeout(),
            config.max_upload_bytes,
        )
        .await?;
        return Ok(bytes);
    }

    std::fs::read(reference).with_context(|| format!("failed to read {}", reference))
}
