use crate::config::GeminiConfig;
use deadliner_domain::{build_extraction_prompt, parse_extraction_response, ExtractedDeadline};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};

/// Generative text model: prompt in, raw text out
#[async_trait::async_trait]
pub trait ITextModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}

const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiTextModel {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiTextModel {
    pub fn new(config: &GeminiConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

#[async_trait::async_trait]
impl ITextModel for GeminiTextModel {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
        };
        let res = self
            .client
            .post(&format!(
                "{}/models/{}:generateContent",
                GEMINI_API_BASE_URL, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<GenerateContentResponse>()
            .await?;

        let text = res
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .ok_or_else(|| anyhow::anyhow!("Gemini returned no candidates"))?;

        Ok(text)
    }
}

/// Turns document text into deadlines with a text model.
///
/// Never fails: a model that cannot be reached and a response that cannot
/// be parsed both give an empty list, and are logged at different levels.
#[derive(Clone)]
pub struct DeadlineExtractor {
    model: Option<Arc<dyn ITextModel>>,
}

impl DeadlineExtractor {
    pub fn new(model: Arc<dyn ITextModel>) -> Self {
        Self { model: Some(model) }
    }

    pub fn unconfigured() -> Self {
        Self { model: None }
    }

    pub async fn extract(&self, document_text: &str) -> Vec<ExtractedDeadline> {
        let model = match &self.model {
            Some(model) => model,
            None => {
                warn!("No text model is configured, extraction is skipped");
                return vec![];
            }
        };

        let prompt = build_extraction_prompt(document_text);
        let raw = match model.generate(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                error!("[Network Error] Text model request failed. Error message: {:?}", e);
                return vec![];
            }
        };

        match parse_extraction_response(&raw) {
            Ok(deadlines) => deadlines,
            Err(e) => {
                warn!("[Unexpected Response] Text model output was not usable: {}", e);
                vec![]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticModel(anyhow::Result<String>);

    #[async_trait::async_trait]
    impl ITextModel for StaticModel {
        async fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
            match &self.0 {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(anyhow::anyhow!("{}", e)),
            }
        }
    }

    fn extractor(response: anyhow::Result<String>) -> DeadlineExtractor {
        DeadlineExtractor::new(Arc::new(StaticModel(response)))
    }

    #[tokio::test]
    async fn extracts_deadlines_from_model_output() {
        let raw = r#"```json
[{"title": "Essay", "description": "Write it", "date": "2025-10-15", "priority": "high"}]
```"#;
        let deadlines = extractor(Ok(raw.into())).extract("Essay due 15th").await;
        assert_eq!(deadlines.len(), 1);
        assert_eq!(deadlines[0].course, "General");
    }

    #[tokio::test]
    async fn yields_nothing_on_failures() {
        let unreachable = extractor(Err(anyhow::anyhow!("connection refused")));
        assert!(unreachable.extract("text").await.is_empty());

        let garbage = extractor(Ok("Sorry, I cannot help with that".into()));
        assert!(garbage.extract("text").await.is_empty());

        assert!(DeadlineExtractor::unconfigured()
            .extract("text")
            .await
            .is_empty());
    }
}
