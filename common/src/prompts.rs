//! プロンプト生成モジュール
//!
//! 植物写真解析用の固定プロンプト:
//! - REPORT_SECTIONS: レポートの6セクション
//! - GROWING_CONDITIONS: 生育条件の小項目
//! - build_analysis_prompt: 解析プロンプト

/// レポートのセクション（出力順）
pub const REPORT_SECTIONS: &[&str] = &[
    "Plant Name",
    "Scientific Name",
    "Description",
    "Ideal Weather & Environment",
    "Best Growing Conditions",
    "Summary",
];

/// "Best Growing Conditions" の小項目
pub const GROWING_CONDITIONS: &[(&str, &str)] = &[
    ("Light", "light requirements"),
    ("Watering", "watering frequency and style"),
    ("Soil", "the suitable soil type"),
    ("Humidity", "preferred humidity"),
];

/// 解析プロンプト生成
///
/// プレーンテキスト（Markdown禁止）で "ラベル: 説明" の行を返すよう指示する。
/// レンダラーはこの6セクションに依存せず任意のラベル行を扱える。
pub fn build_analysis_prompt() -> String {
    let conditions = GROWING_CONDITIONS
        .iter()
        .map(|(label, hint)| format!("   - {}: (Mention {})", label, hint))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are an expert botanist and plant care assistant.

Analyze the uploaded plant image carefully and provide a natural, human-readable description of it.

Format the output in plain text (NO markdown, NO symbols like ### or **).

The output should follow this clear structure:

1. {name}: (Write the common name)
2. {scientific}: (Write the scientific name)
3. {description}: Write 3-5 lines describing the plant's appearance (leaves, color, size, and general traits).
4. {environment}: Describe the type of climate or weather this plant thrives in (temperature, humidity, etc.).
5. {conditions_label}:
{conditions}
6. {summary}: A short summary (2-3 lines) giving care tips and how this plant can be best maintained at home.

Make the response simple, elegant, and written like you're explaining to a beginner plant lover."#,
        name = REPORT_SECTIONS[0],
        scientific = REPORT_SECTIONS[1],
        description = REPORT_SECTIONS[2],
        environment = REPORT_SECTIONS[3],
        conditions_label = REPORT_SECTIONS[4],
        conditions = conditions,
        summary = REPORT_SECTIONS[5],
    )
}
