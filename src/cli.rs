use crate::config::OutputMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "plant-scan")]
#[command(about = "植物写真AI解析・PDFレポート生成サーバー", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// HTTPサーバーを起動
    Serve {
        /// 待ち受けアドレス（デフォルト: 設定値）
        #[arg(long)]
        host: Option<String>,

        /// 待ち受けポート（デフォルト: 設定値 / PORT）
        #[arg(short, long)]
        port: Option<u16>,

        /// PDFの返し方 (memory/temp-file)
        #[arg(long)]
        output_mode: Option<OutputMode>,

        /// 静的ファイルのディレクトリ
        #[arg(long)]
        public_dir: Option<PathBuf>,
    },

    /// 写真1枚を解析してテキストを出力
    Analyze {
        /// 画像ファイルのパス
        #[arg(required = true)]
        image: PathBuf,

        /// 出力テキストファイル（未指定なら標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 解析テキストからPDFレポートを生成
    Report {
        /// 解析テキストファイル
        #[arg(required = true)]
        input: PathBuf,

        /// 埋め込む画像（パス / data URI / URL）
        #[arg(short, long)]
        image: Option<String>,

        /// 出力PDF（デフォルト: Plant_Analysis_Report.pdf）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 設定を表示・変更
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 現在の設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::parse_from([
            "plant-scan",
            "serve",
            "--port",
            "8080",
            "--output-mode",
            "temp-file",
        ]);
        match cli.command {
            Commands::Serve { host, port, output_mode, public_dir } => {
                assert_eq!(host, None);
                assert_eq!(port, Some(8080));
                assert_eq!(output_mode, Some(OutputMode::TempFile));
                assert_eq!(public_dir, None);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_report_with_global_verbose() {
        let cli = Cli::parse_from(["plant-scan", "report", "analysis.txt", "-i", "leaf.jpg", "-v"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Report { input, image, output } => {
                assert_eq!(input, PathBuf::from("analysis.txt"));
                assert_eq!(image.as_deref(), Some("leaf.jpg"));
                assert!(output.is_none());
            }
            _ => panic!("expected report"),
        }
    }

    #[test]
    fn test_analyze_requires_image() {
        assert!(Cli::try_parse_from(["plant-scan", "analyze"]).is_err());
    }
}
