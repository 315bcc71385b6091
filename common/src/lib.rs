//! Plant Scan Common Library
//!
//! CLIとHTTPサーバーで共有される型とユーティリティ

pub mod data_uri;
pub mod error;
pub mod export;
pub mod layout;
pub mod parser;
pub mod prompts;
pub mod types;

pub use data_uri::DataUri;
pub use error::{Error, Result};
pub use export::report_core::{
    parse_report_blocks, plan_report, DrawOp, ImagePlacement, ReportBlock, ReportPlan, TextRole,
    TextRun,
};
pub use layout::{FontFace, ReportLayout, Rgb8};
pub use parser::{extract_analysis_text, ModelOutput, NO_ANALYSIS_FOUND};
pub use prompts::build_analysis_prompt;
pub use types::{AnalyzeResponse, ErrorResponse, ReportRequest};
