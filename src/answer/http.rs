//! HTTP answer source for chat-completions compatible endpoints

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use super::traits::{measure_async, AnswerSource, Invocation};
use crate::config::HttpSourceConfig;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: String,
}

/// Answer source that POSTs each question to an HTTP endpoint
pub struct HttpAnswerSource {
    client: reqwest::Client,
    name: String,
    url: String,
    model: String,
    api_key: String,
    temperature: f32,
    max_tokens: u32,
}

impl HttpAnswerSource {
    pub fn new(config: &HttpSourceConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            name: format!("http:{}", config.model),
            url: config.url.clone(),
            model: config.model.clone(),
            api_key: api_key.into(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    async fn request(&self, question: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: question,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", self.url))?
            .error_for_status()?;

        let text = response.text().await.context("Failed to read response body")?;
        parse_answer(&text)
    }
}

/// Extract `choices[0].message.content` from a chat-completions body
pub fn parse_answer(body: &str) -> Result<String> {
    let parsed: ChatResponse = serde_json::from_str(body).context("Malformed chat-completions response")?;
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("Response contained no choices"))?;
    Ok(choice.message.content.trim().to_string())
}

#[async_trait::async_trait]
impl AnswerSource for HttpAnswerSource {
    fn name(&self) -> &str {
        &self.name
    }

    /// The debug flag has no HTTP equivalent and is ignored.
    async fn invoke(&self, question: &str, _debug: bool) -> Invocation {
        let (result, duration) = measure_async(self.request(question)).await;

        match result {
            Ok(answer) => Invocation::success(answer, duration),
            Err(e) => Invocation::failure(format!("{:#}", e), duration),
        }
    }
}
