//! Remote outline strategy: delegate planning to a language-model endpoint.
//!
//! One bounded HTTP call per invocation. Every failure mode surfaces as an
//! [`Error`]; nothing degrades silently. The caller decides whether to
//! substitute [`heuristic_outline`](super::heuristic_outline). The supplied
//! credential is forwarded on the wire and never persisted or logged.

use std::str::FromStr;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::model::Outline;

/// Ceiling for the single network call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Known language-model providers.
///
/// Modeled as a closed enum so "unsupported provider" is a parse-time case,
/// not a scattering of string comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// OpenAI chat completions.
    OpenAi,
    /// Anthropic messages API.
    Anthropic,
    /// Google Gemini generateContent.
    Gemini,
    /// Any OpenAI-compatible endpoint; requires an explicit base URL.
    OpenAiCompatible,
}

impl Provider {
    /// Canonical identifier.
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Gemini => "gemini",
            Provider::OpenAiCompatible => "openai-compatible",
        }
    }

    /// Default model, overridable through the environment.
    fn default_model(&self) -> String {
        match self {
            Provider::OpenAi | Provider::OpenAiCompatible => std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            Provider::Anthropic => std::env::var("ANTHROPIC_MODEL")
                .unwrap_or_else(|_| "claude-3-5-sonnet-20240620".to_string()),
            Provider::Gemini => std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
        }
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "oai" => Ok(Provider::OpenAi),
            "anthropic" | "claude" => Ok(Provider::Anthropic),
            "gemini" | "google" | "vertex" => Ok(Provider::Gemini),
            "openai-compatible" | "oai-compatible" | "compatible" => {
                Ok(Provider::OpenAiCompatible)
            }
            other => Err(Error::UnsupportedProvider(other.to_string())),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Configuration for a remote planning call.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Which provider to call.
    pub provider: Provider,
    /// Pass-through credential; never stored beyond the call.
    pub api_key: String,
    /// Model name; provider default when `None`.
    pub model: Option<String>,
    /// Alternate endpoint base; required for [`Provider::OpenAiCompatible`].
    pub base_url: Option<String>,
}

impl RemoteConfig {
    /// Build a config for a provider identifier string.
    pub fn new(provider: &str, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            provider: provider.parse()?,
            api_key: api_key.into(),
            model: None,
            base_url: None,
        })
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        self.model = (!model.is_empty()).then_some(model);
        self
    }

    /// Set the endpoint base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = (!base_url.is_empty()).then_some(base_url);
        self
    }
}

/// Build the system/user prompt pair describing the strict JSON contract.
pub fn outline_prompt(text: &str, guidance: &str, include_notes: bool) -> (String, String) {
    let notes_field = if include_notes { "\"notes\": string, " } else { "" };
    let system = format!(
        "You are a presentation planning assistant. \
         Given raw text or markdown and a short guidance string, produce a slide outline.\n\
         Return STRICT JSON with this schema:\n\
         {{\n\
         \x20 \"title\": string,\n\
         \x20 \"slides\": [\n\
         \x20    {{\"title\": string, \"bullets\": [string, ...], {}\"layout\": string}}\n\
         \x20 ],\n\
         \x20 \"estimated_slide_count\": number\n\
         }}\n\
         Pick a reasonable number of slides (8-25 typical). Use concise bullets (max ~14 words). \
         Prefer 'Title and Content' layout unless an image would help, then 'Content with Caption' or 'Two Content'. \
         If no layout hint, set layout to \"auto\".",
        notes_field
    );
    let user = format!(
        "GUIDANCE: {}\nINPUT TEXT:\n{}\n\nOutput ONLY valid JSON object, no markdown fences.",
        if guidance.is_empty() { "none" } else { guidance },
        text
    );
    (system, user)
}

/// Remote outline planner.
///
/// # Example
///
/// ```no_run
/// use deckify::{RemoteConfig, RemotePlanner};
///
/// # async fn run() -> deckify::Result<()> {
/// let config = RemoteConfig::new("openai", "sk-...")?;
/// let planner = RemotePlanner::new(config)?;
/// let outline = planner.plan("# Agenda\n- intro", "Q3", false).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RemotePlanner {
    client: reqwest::Client,
    config: RemoteConfig,
}

impl RemotePlanner {
    /// Create a planner; validates provider-specific configuration.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        if config.provider == Provider::OpenAiCompatible && config.base_url.is_none() {
            return Err(Error::MissingConfiguration(
                "base_url required for openai-compatible provider".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, config })
    }

    /// Plan an outline remotely.
    ///
    /// Transport failures and non-JSON replies surface as errors; a parsed
    /// outline is clamped to the model invariants before returning.
    pub async fn plan(&self, text: &str, guidance: &str, include_notes: bool) -> Result<Outline> {
        let model = self
            .config
            .model
            .clone()
            .unwrap_or_else(|| self.config.provider.default_model());
        let (system, user) = outline_prompt(text, guidance, include_notes);

        tracing::debug!(provider = %self.config.provider, %model, "planning outline remotely");

        let content = match self.config.provider {
            Provider::OpenAi | Provider::OpenAiCompatible => {
                self.openai_chat(&model, &system, &user).await?
            }
            Provider::Anthropic => self.anthropic_messages(&model, &system, &user).await?,
            Provider::Gemini => self.gemini_generate(&model, &system, &user).await?,
        };

        let outline: Outline = serde_json::from_str(&content)
            .map_err(|e| Error::MalformedResponse(format!("outline JSON: {}", e)))?;
        Ok(outline.enforce_limits(include_notes))
    }

    /// POST a JSON body and return the parsed response, mapping non-2xx
    /// statuses to transport errors.
    async fn post_json(&self, url: &str, headers: HeaderMap, body: Value) -> Result<Value> {
        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Transport(format!("{}: {}", status, detail)));
        }

        response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(format!("response body: {}", e)))
    }

    async fn openai_chat(&self, model: &str, system: &str, user: &str) -> Result<String> {
        let base = self
            .config
            .base_url
            .as_deref()
            .unwrap_or("https://api.openai.com")
            .trim_end_matches('/');
        let url = format!("{}/v1/chat/completions", base);

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.config.api_key))
                .map_err(|_| Error::InvalidData("api key is not a valid header value".into()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let body = json!({
            "model": model,
            "temperature": 0.2,
            "response_format": {"type": "json_object"},
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
        });

        let data = self.post_json(&url, headers, body).await?;
        data["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::MalformedResponse("missing chat completion content".to_string()))
    }

    async fn anthropic_messages(&self, model: &str, system: &str, user: &str) -> Result<String> {
        let url = "https://api.anthropic.com/v1/messages";

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.config.api_key)
                .map_err(|_| Error::InvalidData("api key is not a valid header value".into()))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static("2023-06-01"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let body = json!({
            "model": model,
            "max_tokens": 2000,
            "temperature": 0.2,
            "system": system,
            "messages": [
                {"role": "user", "content": [{"type": "text", "text": user}]},
            ],
        });

        let data = self.post_json(url, headers, body).await?;

        // The messages API returns a list of content blocks; concatenate
        // the text blocks.
        let mut text = String::new();
        if let Some(blocks) = data["content"].as_array() {
            for block in blocks {
                if block["type"].as_str() == Some("text") {
                    text.push_str(block["text"].as_str().unwrap_or_default());
                }
            }
        }
        if text.is_empty() {
            return Err(Error::MalformedResponse(
                "no text content in messages response".to_string(),
            ));
        }
        Ok(text)
    }

    async fn gemini_generate(&self, model: &str, system: &str, user: &str) -> Result<String> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            model, self.config.api_key
        );

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let body = json!({
            "contents": [
                {"role": "user", "parts": [{"text": format!("{}\n\n{}", system, user)}]},
            ],
            "generationConfig": {"temperature": 0.2, "maxOutputTokens": 2000},
        });

        let data = self.post_json(&url, headers, body).await?;
        data["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::MalformedResponse("missing candidate text".to_string()))
    }
}
