//! Annotator backed by the Anthropic Messages API.
//!
//! Sends one review per request with a JSON-only prompt at temperature 0 and
//! parses the JSON object out of the reply. Empty reviews are labeled
//! `unknown` locally without a network call.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use reviewscope_core::SentimentLabel;
use serde::{Deserialize, Serialize};

use crate::annotator::{Annotation, Annotator};
use crate::error::AnnotationError;
use crate::tags::normalize_tags;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1000;

/// Client for annotating reviews through the Anthropic Messages API.
///
/// Use [`ClaudeAnnotator::new`] for production or
/// [`ClaudeAnnotator::with_base_url`] to point at a mock server in tests.
pub struct ClaudeAnnotator {
    client: Client,
    api_key: String,
    model: String,
    endpoint: Url,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: [ChatMessage; 1],
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// The object the prompt asks the model to return. Every key is required.
#[derive(Deserialize)]
struct ProviderAnnotation {
    sentiment: String,
    topics: Vec<String>,
    issues: Vec<String>,
    praises: Vec<String>,
}

impl ClaudeAnnotator {
    /// Creates an annotator pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotationError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, model: &str) -> Result<Self, AnnotationError> {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL)
    }

    /// Creates an annotator with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`AnnotationError::Http`] if the client cannot be constructed,
    /// or [`AnnotationError::Provider`] if `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        base_url: &str,
    ) -> Result<Self, AnnotationError> {
        // The runner owns the per-call timeout; this only bounds connection setup.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent("reviewscope/0.1 (review-insights)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised)
            .and_then(|base| base.join("v1/messages"))
            .map_err(|e| AnnotationError::Provider(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            endpoint,
        })
    }

    async fn call_api(&self, prompt: String) -> Result<String, AnnotationError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            temperature: 0.0,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            return Err(AnnotationError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            return Err(AnnotationError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| AnnotationError::MalformedResponse(format!("response body: {e}")))?;

        body.content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .ok_or_else(|| {
                AnnotationError::MalformedResponse("response contained no text block".to_owned())
            })
    }
}

#[async_trait]
impl Annotator for ClaudeAnnotator {
    fn name(&self) -> &'static str {
        "claude"
    }

    async fn annotate(&self, text: &str) -> Result<Annotation, AnnotationError> {
        if text.trim().is_empty() {
            return Ok(Annotation::unknown());
        }

        tracing::debug!(
            model = %self.model,
            text_length = text.len(),
            "requesting review annotation"
        );
        let reply = self.call_api(build_prompt(text)).await?;
        parse_annotation(&reply)
    }
}

pub(crate) fn build_prompt(review_text: &str) -> String {
    format!(
        r#"Analyze this app review and provide a JSON response with the following structure:
{{
    "sentiment": "positive/negative/neutral",
    "topics": ["topic1", "topic2", ...],
    "issues": ["issue1", "issue2", ...],
    "praises": ["praise1", "praise2", ...]
}}

Review text: {review_text}

Respond ONLY with the JSON object, no other text."#
    )
}

/// Extract the annotation object from a model reply.
///
/// Takes the span from the first `{` to the last `}` so stray prose around
/// the object is tolerated. `mixed` is recorded as `neutral`.
pub(crate) fn parse_annotation(reply: &str) -> Result<Annotation, AnnotationError> {
    let start = reply.find('{');
    let end = reply.rfind('}');
    let json = match (start, end) {
        (Some(s), Some(e)) if s < e => &reply[s..=e],
        _ => {
            return Err(AnnotationError::MalformedResponse(
                "no JSON object found in response".to_owned(),
            ))
        }
    };

    let parsed: ProviderAnnotation = serde_json::from_str(json)
        .map_err(|e| AnnotationError::MalformedResponse(e.to_string()))?;

    let label = match parsed.sentiment.trim().to_ascii_lowercase().as_str() {
        "positive" => SentimentLabel::Positive,
        "negative" => SentimentLabel::Negative,
        "neutral" | "mixed" => SentimentLabel::Neutral,
        other => {
            return Err(AnnotationError::MalformedResponse(format!(
                "invalid sentiment value: {other}"
            )))
        }
    };

    Ok(Annotation {
        label,
        topics: normalize_tags(parsed.topics),
        issues: normalize_tags(parsed.issues),
        praises: normalize_tags(parsed.praises),
    })
}
