//! Report layout core shared by the CLI and the HTTP server.

pub mod report_core;
pub mod text_metrics;
