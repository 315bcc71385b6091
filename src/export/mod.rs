pub mod pdf;

use crate::config::{Config, OutputMode};
use crate::error::Result;
use crate::imaging::{normalize_to_png, PreparedImage};
use plant_scan_common::{parse_report_blocks, plan_report, ReportLayout, ReportPlan};
use std::path::PathBuf;
use tempfile::TempPath;

/// ダウンロード時のファイル名
pub const REPORT_FILE_NAME: &str = "Plant_Analysis_Report.pdf";

/// 生成済みレポート
///
/// `TempFile` の一時ファイルは `TempPath` のドロップ時に削除される。
#[derive(Debug)]
pub enum RenderedReport {
    InMemory(Vec<u8>),
    TempFile { path: TempPath, len: u64 },
}

impl RenderedReport {
    pub fn len(&self) -> u64 {
        match self {
            RenderedReport::InMemory(bytes) => bytes.len() as u64,
            RenderedReport::TempFile { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 全バイトを読み出す（CLI出力用）
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            RenderedReport::InMemory(bytes) => Ok(bytes),
            RenderedReport::TempFile { path, .. } => Ok(std::fs::read(&path)?),
        }
    }
}

/// 解析テキスト+画像からPDFを生成する
#[derive(Debug, Clone)]
pub struct ReportRenderer {
    layout: ReportLayout,
    max_image_size: u32,
    output_mode: OutputMode,
    output_dir: Option<PathBuf>,
}

impl ReportRenderer {
    pub fn new(max_image_size: u32, output_mode: OutputMode, output_dir: Option<PathBuf>) -> Self {
        Self {
            layout: ReportLayout::a4(),
            max_image_size,
            output_mode,
            output_dir,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.max_image_size,
            config.output_mode,
            config.output_dir.clone(),
        )
    }

    /// 画像の正規化（失敗しても画像なしで続行）
    pub fn prepare_image(&self, bytes: &[u8]) -> Option<PreparedImage> {
        match normalize_to_png(bytes, self.max_image_size) {
            Ok(prepared) => Some(prepared),
            Err(e) => {
                tracing::warn!(operation = "download", error = %e, "image conversion failed; rendering without image");
                None
            }
        }
    }

    pub fn plan(&self, results: &str, image: Option<&PreparedImage>) -> ReportPlan {
        let blocks = parse_report_blocks(results);
        plan_report(&self.layout, &blocks, image.map(|img| (img.width, img.height)))
    }

    /// レポートを生成（同期処理。非同期文脈では spawn_blocking から呼ぶ）
    pub fn render(&self, results: &str, image_bytes: Option<&[u8]>) -> Result<RenderedReport> {
        let image = image_bytes.and_then(|bytes| self.prepare_image(bytes));
        let plan = self.plan(results, image.as_ref());

        let report = match self.output_mode {
            OutputMode::Memory => RenderedReport::InMemory(pdf::render_to_bytes(&plan, image.as_ref())?),
            OutputMode::TempFile => self.render_to_temp_file(&plan, image.as_ref())?,
        };

        tracing::info!(
            operation = "download",
            mode = %self.output_mode,
            pages = plan.pages.len(),
            with_image = image.is_some(),
            bytes = report.len(),
            "report rendered"
        );
        Ok(report)
    }

    fn render_to_temp_file(
        &self,
        plan: &ReportPlan,
        image: Option<&PreparedImage>,
    ) -> Result<RenderedReport> {
        let dir = self.output_dir.clone().unwrap_or_else(std::env::temp_dir);
        std::fs::create_dir_all(&dir)?;

        // 途中で失敗しても NamedTempFile のドロップで削除される
        let file = tempfile::Builder::new()
            .prefix("Plant_Report_")
            .suffix(".pdf")
            .tempfile_in(&dir)?;
        pdf::render_to_writer(plan, image, file.as_file())?;
        file.as_file().sync_all()?;

        let len = file.as_file().metadata()?.len();
        Ok(RenderedReport::TempFile {
            path: file.into_temp_path(),
            len,
        })
    }
}
