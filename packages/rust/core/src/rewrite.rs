//! Article rewriting through an OpenAI-compatible chat completions provider.
//!
//! The prompt combines the original article with both reference excerpts.
//! Before the request goes out, the estimated cost is reserved on the shared
//! [`RateBudget`]; a request is never sent without a reservation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use articleflow_shared::{ArticleflowError, PipelineConfig, Result, RewriteConfig};

use crate::budget::{RateBudget, estimate_units};

/// User-Agent string for provider requests.
const USER_AGENT: &str = concat!("articleflow/", env!("CARGO_PKG_VERSION"));

/// System message sent with every rewrite.
pub const SYSTEM_INSTRUCTION: &str = "You are an expert content editor.";

// ---------------------------------------------------------------------------
// Rewrite seam
// ---------------------------------------------------------------------------

/// Produces an enriched version of an article. Failures are item-fatal.
#[async_trait]
pub trait TextRewriter: Send + Sync {
    /// Rewrite `original` using the two reference excerpts (either may be empty).
    async fn rewrite(&self, original: &str, references: [&str; 2]) -> Result<String>;
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Provider settings for [`ChatRewriter`].
#[derive(Debug, Clone)]
pub struct RewriteOptions {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout_secs: u64,
    /// Fixed units added to every estimate for the instructions and the reply.
    pub prompt_overhead_tokens: u64,
}

impl RewriteOptions {
    pub fn new(rewrite: &RewriteConfig, pipeline: &PipelineConfig) -> Self {
        Self {
            endpoint: rewrite.endpoint.clone(),
            model: rewrite.model.clone(),
            temperature: rewrite.temperature,
            max_output_tokens: rewrite.max_output_tokens,
            timeout_secs: rewrite.timeout_secs,
            prompt_overhead_tokens: pipeline.prompt_overhead_tokens,
        }
    }
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self::new(&RewriteConfig::default(), &PipelineConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Provider wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<Usage>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

// ---------------------------------------------------------------------------
// ChatRewriter
// ---------------------------------------------------------------------------

/// Budgeted chat-completions client implementing [`TextRewriter`].
pub struct ChatRewriter {
    client: Client,
    api_key: String,
    options: RewriteOptions,
    budget: Arc<RateBudget>,
}

impl ChatRewriter {
    pub fn new(
        api_key: impl Into<String>,
        options: RewriteOptions,
        budget: Arc<RateBudget>,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()
            .map_err(|e| ArticleflowError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            options,
            budget,
        })
    }

    async fn complete(&self, prompt: &str) -> Result<ChatResponse> {
        let request = ChatRequest {
            model: &self.options.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_INSTRUCTION,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.options.temperature,
            max_tokens: self.options.max_output_tokens,
        };

        let response = self
            .client
            .post(&self.options.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ArticleflowError::Rewrite(format!("provider request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(300).collect();
            return Err(ArticleflowError::Rewrite(format!(
                "provider returned HTTP {status}: {snippet}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ArticleflowError::Rewrite(format!("invalid provider response: {e}")))
    }
}

#[async_trait]
impl TextRewriter for ChatRewriter {
    #[instrument(skip_all, fields(model = %self.options.model))]
    async fn rewrite(&self, original: &str, references: [&str; 2]) -> Result<String> {
        let units = estimate_request_units(original, references, self.options.prompt_overhead_tokens);
        let waited = self.budget.reserve(units).await;
        info!(units, waited_ms = waited.as_millis() as u64, "rate budget reserved");

        let prompt = build_prompt(original, references);
        let start = Instant::now();
        let response = self.complete(&prompt).await?;
        let latency_ms = start.elapsed().as_millis() as u64;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| ArticleflowError::Rewrite("provider returned no content".into()))?;

        match response.usage {
            Some(usage) => info!(
                tokens_in = usage.prompt_tokens,
                tokens_out = usage.completion_tokens,
                model = response.model.as_deref().unwrap_or(&self.options.model),
                latency_ms,
                "rewrite complete"
            ),
            None => info!(latency_ms, "rewrite complete"),
        }

        Ok(text)
    }
}

/// Estimated units for one rewrite request.
pub fn estimate_request_units(original: &str, references: [&str; 2], overhead: u64) -> u64 {
    estimate_units(original) + estimate_units(references[0]) + estimate_units(references[1]) + overhead
}

/// Instruction prompt for one article.
pub fn build_prompt(original: &str, references: [&str; 2]) -> String {
    let [first, second] = references;
    format!(
        "You are a professional SEO content writer.

Rewrite the article below by:
- Improving structure and clarity
- Enhancing SEO
- Using tone inspired by the reference articles
- Avoiding plagiarism
- Returning clean, well-formatted MARKDOWN
Rules:
- Do NOT shorten the article
- Expand explanations where helpful
- Maintain or exceed the original article length
- Use clear section headings
- Preserve the original intent and depth
Original Article:
{original}

Reference Article 1:
{first}

Reference Article 2:
{second}
"
    )
}
