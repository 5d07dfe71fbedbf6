//! Reasoning service client
//!
//! Talks to an OpenAI-compatible multimodal endpoint. Documents travel as
//! base64 `data:` URLs inside a chat completion request; the model is
//! instructed to answer with raw JSON, which is parsed into the domain's
//! insight types. Markdown code fences around the payload are tolerated.

use async_trait::async_trait;
use base64::Engine as _;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{DomainPort, PortError};
use domain_claims::{DamageAssessment, DamageInsight, Document, DocumentInsight, ReasoningPort};

const RESTRICTION: &str = "\
Do NOT include anything besides valid JSON in your answer.

Do NOT format as markdown - return raw JSON document.";

const DOCUMENT_PROMPT: &str = "\
Here is the primary document of a customer claim, typically an invoice or a
receipt, followed by the customer's own description of the claim.

Give a JSON object with following structure:

{
    \"relevant\": <true if the document relates to the described purchase or product, false otherwise>,
    \"material\": <integer material number of the claimed item if identifiable, else null>,
    \"summary\": <free-form, short textual summary of the document>
}";

const DOCUMENT_SET_PROMPT: &str = "\
Here are photos of a possibly damaged product from a customer claim.

Give a JSON object with following structure:

{
    \"description\": <free-form, short description of the claimed issue>,
    \"department\": <short lowercase name of the department that handles this kind of product, e.g. kitchen>,
    \"damage\": {
        \"factor\": <float from 0.0 to 1.0, where 0.0 - not damaged, 1.0 - completely destroyed>,
        \"damage\": <short name of the most significant damage type, e.g. scratches>
    }
}

If no damage is visible, set \"damage\" to null.
If a more significant damage type implies a less significant one - include only the more significant one.";

/// Configuration for the reasoning service client
#[derive(Debug, Clone)]
pub struct ReasoningConfig {
    /// Base URL of the OpenAI-compatible endpoint
    pub base_url: String,
    /// Bearer token; empty disables the Authorization header
    pub api_key: String,
    /// Model identifier
    pub model: String,
    /// Maximum tokens in a response
    pub max_tokens: u32,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 800,
            timeout_secs: 120,
        }
    }
}

/// Errors from the reasoning service boundary
#[derive(Debug, thiserror::Error)]
pub enum ReasoningError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Unsupported content: {0}")]
    UnsupportedContent(String),
}

/// Transport and API failures are transient from the analyzer's point of
/// view; a claim just gets retried on the next poll.
impl From<ReasoningError> for PortError {
    fn from(error: ReasoningError) -> Self {
        match error {
            ReasoningError::Connection(message) => PortError::Connection {
                message,
                source: None,
            },
            ReasoningError::Api { status, message } => PortError::Connection {
                message: format!("reasoning service returned HTTP {}: {}", status, message),
                source: None,
            },
            ReasoningError::Parse(message) => PortError::Transformation { message },
            ReasoningError::UnsupportedContent(message) => PortError::Validation { message },
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Client for the external multimodal reasoning service
pub struct ReasoningClient {
    config: ReasoningConfig,
    client: Client,
}

impl ReasoningClient {
    pub fn new(config: ReasoningConfig) -> Result<Self, ReasoningError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ReasoningError::Connection(e.to_string()))?;
        Ok(Self { config, client })
    }

    fn image_part(document: &Document) -> Result<ContentPart, ReasoningError> {
        if !document.is_image() {
            return Err(ReasoningError::UnsupportedContent(format!(
                "only image/* content is supported, got {}",
                document.content_type
            )));
        }
        let data = base64::engine::general_purpose::STANDARD.encode(&document.data);
        Ok(ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: format!("data:{};base64,{}", document.content_type, data),
            },
        })
    }

    async fn complete(&self, content: Vec<ContentPart>) -> Result<String, ReasoningError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content,
            }],
            max_tokens: self.config.max_tokens,
            stream: false,
        };

        let url = format!("{}/v1/chat/completions", self.config.base_url);
        let mut builder = self.client.post(&url).json(&request);
        if !self.config.api_key.is_empty() {
            builder = builder.bearer_auth(&self.config.api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ReasoningError::Connection(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ReasoningError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payload: ChatResponse = response
            .json()
            .await
            .map_err(|e| ReasoningError::Parse(e.to_string()))?;
        payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ReasoningError::Parse("response carried no choices".to_string()))
    }

    fn parse_payload<T: DeserializeOwned>(raw: &str) -> Result<T, ReasoningError> {
        let stripped = strip_fences(raw);
        serde_json::from_str(stripped).map_err(|e| {
            ReasoningError::Parse(format!("unparsable structured output: {}", e))
        })
    }
}

/// Removes a markdown code fence around a JSON payload, if present
fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop the info string of the opening fence
    let rest = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest,
    };
    rest.trim_end().trim_end_matches("```").trim()
}

impl DomainPort for ReasoningClient {}

#[async_trait]
impl ReasoningPort for ReasoningClient {
    async fn analyze_document(
        &self,
        document: &Document,
        claim_description: &str,
    ) -> Result<DocumentInsight, PortError> {
        let content = vec![
            ContentPart::Text {
                text: format!("{}\n{}", DOCUMENT_PROMPT, RESTRICTION),
            },
            ContentPart::Text {
                text: claim_description.to_string(),
            },
            Self::image_part(document)?,
        ];
        let raw = self.complete(content).await?;
        debug!(document = %document.id, "primary document analyzed");
        Ok(Self::parse_payload(&raw)?)
    }

    async fn analyze_document_set(
        &self,
        documents: &[Document],
    ) -> Result<DamageInsight, PortError> {
        if documents.is_empty() {
            return Err(ReasoningError::UnsupportedContent(
                "document set is empty".to_string(),
            )
            .into());
        }
        let mut content = vec![ContentPart::Text {
            text: format!("{}\n{}", DOCUMENT_SET_PROMPT, RESTRICTION),
        }];
        for document in documents {
            content.push(Self::image_part(document)?);
        }
        let raw = self.complete(content).await?;
        let insight: DamageInsight = Self::parse_payload(&raw)?;
        if let Some(damage) = &insight.damage {
            // re-validate the model-provided factor
            DamageAssessment::new(damage.factor, damage.damage.clone())
                .map_err(|e| ReasoningError::Parse(e.to_string()))?;
        }
        debug!(documents = documents.len(), "document set analyzed");
        Ok(insight)
    }
}
