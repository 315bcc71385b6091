//! モデル応答パーサー
//!
//! 解析APIの応答形式は固定されていないため、次の順で本文を取り出す:
//! 1. `text` フィールド（直接テキスト）
//! 2. 先頭候補の `content.parts[].text` を改行で連結
//! 3. どちらも無ければ [`NO_ANALYSIS_FOUND`]

use serde::Deserialize;
use serde_json::Value;

/// 本文が取り出せなかったときの固定文言
pub const NO_ANALYSIS_FOUND: &str = "No analysis found.";

/// 解析APIの応答形式
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutput {
    /// `{"text": "..."}` 形式
    DirectText(String),
    /// `{"candidates": [{"content": {"parts": [...]}}]}` 形式（先頭候補は content を持つ）
    CandidateList(Vec<Candidate>),
    /// どちらでもない（ブロックされた応答など）
    Unrecognized,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ContentPart>,
}

/// 画像など text を持たないパートもある
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ContentPart {
    #[serde(default)]
    pub text: Option<String>,
}

impl ModelOutput {
    /// 生のJSON応答を分類
    pub fn from_value(value: &Value) -> Self {
        if let Some(text) = value.get("text").and_then(Value::as_str) {
            return ModelOutput::DirectText(text.to_string());
        }

        let candidates = value
            .get("candidates")
            .cloned()
            .and_then(|raw| serde_json::from_value::<Vec<Candidate>>(raw).ok())
            .unwrap_or_default();

        match candidates.first() {
            Some(first) if first.content.is_some() => ModelOutput::CandidateList(candidates),
            _ => ModelOutput::Unrecognized,
        }
    }

    /// 応答から表示用テキストを取り出す
    pub fn into_text(self) -> String {
        match self {
            ModelOutput::DirectText(text) => text,
            ModelOutput::CandidateList(candidates) => candidates
                .into_iter()
                .next()
                .and_then(|candidate| candidate.content)
                .map(|content| {
                    content
                        .parts
                        .into_iter()
                        .map(|part| part.text.unwrap_or_default())
                        .collect::<Vec<_>>()
                        .join("\n")
                })
                .unwrap_or_else(|| NO_ANALYSIS_FOUND.to_string()),
            ModelOutput::Unrecognized => NO_ANALYSIS_FOUND.to_string(),
        }
    }
}

/// JSON応答から解析テキストを取り出す
pub fn extract_analysis_text(value: &Value) -> String {
    ModelOutput::from_value(value).into_text()
}
