//! Real-time research source (chat completions with web search).
//!
//! `POST {base}/chat/completions`; the answer text becomes the summary,
//! bullet or numbered lines become key points.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::enrichment::{ResearchSnapshot, SourceData, SourceKind};
use crate::ports::{SourceError, SourceProvider, SourceRequest};

use super::http::{map_send_error, read_json, HttpSourceConfig};

const DEFAULT_MODEL: &str = "sonar";

const SYSTEM_PROMPT: &str = "You are a UK property market research assistant. \
Provide concise, factual information with sources. \
Focus on recent developments, trends and context.";

/// Research API client.
pub struct ResearchSource {
    config: HttpSourceConfig,
    client: reqwest::Client,
    model: String,
}

impl ResearchSource {
    pub fn new(config: HttpSourceConfig) -> Self {
        let client = config.client();
        Self {
            config,
            client,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn prompt(area_code: &str) -> String {
        format!(
            "Research the {} area of London for housing and neighbourhood context. \
             List recent developments, property market trends, regeneration schemes, \
             transport improvements and community or safety news from the last 12 months \
             as short bullet points, citing sources.",
            area_code
        )
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    citations: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

/// Strips a leading bullet (`-`, `*`, `•`) or list number (`1.`, `2)`).
fn key_point(line: &str) -> Option<String> {
    let line = line.trim();
    let rest = if let Some(rest) = line.strip_prefix(['-', '*', '•']) {
        rest
    } else {
        let digits = line.chars().take_while(char::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }
        line[digits..].strip_prefix(['.', ')'])?
    };
    let point = rest.trim();
    (!point.is_empty()).then(|| point.to_string())
}

fn normalize(raw: ChatResponse) -> Result<ResearchSnapshot, SourceError> {
    let content = raw
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| SourceError::invalid_response("No content in research response"))?;

    Ok(ResearchSnapshot {
        key_points: content.lines().filter_map(key_point).collect(),
        summary: content.trim().to_string(),
        citations: raw.citations,
    })
}

#[async_trait]
impl SourceProvider for ResearchSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Research
    }

    async fn fetch(&self, request: &SourceRequest) -> Result<SourceData, SourceError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: Self::prompt(request.area_code.as_str()),
                },
            ],
            max_tokens: 1000,
            temperature: 0.2,
        };

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .json(&body);
        if let Some(key) = self.config.api_key() {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(map_send_error)?;
        let raw: ChatResponse = read_json(response).await?;
        normalize(raw).map(SourceData::Research)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_key_points_and_citations() {
        let raw: ChatResponse = serde_json::from_str(
            r#"{
                "choices": [{"message": {"content": "Overview of E1.\n- New Elizabeth line station\n2. Rents up 4%\n\nMore text."}}],
                "citations": ["https://example.org/a"]
            }"#,
        )
        .unwrap();

        let snapshot = normalize(raw).unwrap();

        assert_eq!(snapshot.key_points, vec!["New Elizabeth line station", "Rents up 4%"]);
        assert_eq!(snapshot.citations, vec!["https://example.org/a"]);
        assert!(snapshot.summary.starts_with("Overview of E1."));
    }

    #[test]
    fn empty_answer_is_invalid() {
        let raw: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(normalize(raw).is_err());
    }

    #[test]
    fn plain_lines_are_not_key_points() {
        assert_eq!(key_point("Just prose"), None);
        assert_eq!(key_point("2024 was busy"), None);
        assert_eq!(key_point("* starred"), Some("starred".to_string()));
    }
}
