//! Local Ollama chat backend and the narrative month insight built on it.

pub mod insight;

pub use crate::insight::{build_insight_prompt, month_insight, INSIGHT_FALLBACK};

use anyhow::{anyhow, bail, Context, Result};
use reqwest::blocking::Client;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

const DEFAULT_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama3.2";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const TEMPERATURE: f64 = 0.4;

/// Anything that can answer a single-turn chat prompt.
pub trait ChatBackend {
    fn chat(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

/// Where the local model lives. Month figures never leave the machine:
/// only loopback hosts over plain http are accepted.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: Url,
    pub model: String,
    pub timeout: Duration,
}

impl OllamaConfig {
    pub fn new(base_url: &str, model: impl Into<String>) -> Result<Self> {
        Ok(Self {
            base_url: parse_local_url(base_url)?,
            model: model.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Reads `OLLAMA_BASE_URL`, `OLLAMA_MODEL` and `OLLAMA_TIMEOUT_SECS`,
    /// each optional.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("OLLAMA_BASE_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
        let model = std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let mut config = Self::new(&base_url, model)?;

        if let Ok(raw) = std::env::var("OLLAMA_TIMEOUT_SECS") {
            let secs: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid OLLAMA_TIMEOUT_SECS: {raw}"))?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

fn parse_local_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("Invalid Ollama URL: {raw}"))?;
    if url.scheme() != "http" {
        bail!("Ollama URL must use http://, got '{}'", url.scheme());
    }

    let host = url.host_str().ok_or_else(|| anyhow!("Ollama URL {raw} has no host"))?;
    let loopback = host.eq_ignore_ascii_case("localhost")
        || host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .map(|ip| ip.is_loopback())
            .unwrap_or(false);
    if !loopback {
        bail!("Refusing non-local Ollama host '{host}'");
    }

    Ok(url)
}

/// Blocking client for Ollama's `/api/chat`.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: Client,
    chat_url: Url,
    model: String,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let chat_url = config
            .base_url
            .join("api/chat")
            .context("Failed to build Ollama chat URL")?;
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            chat_url,
            model: config.model,
        })
    }
}

impl ChatBackend for OllamaClient {
    fn chat(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let request = ChatRequest::new(&self.model, system_prompt, user_prompt);

        let reply: ChatReply = self
            .http
            .post(self.chat_url.clone())
            .json(&request)
            .send()
            .with_context(|| format!("Ollama is not reachable at {}", self.chat_url))?
            .error_for_status()
            .context("Ollama rejected the chat request")?
            .json()
            .context("Ollama sent an unreadable chat reply")?;
        tracing::debug!(model = %self.model, "Received chat reply");

        reply
            .message
            .map(|m| m.content.trim().to_string())
            .ok_or_else(|| anyhow!("Ollama reply carried no message"))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    stream: bool,
    options: ChatOptions,
}

impl<'a> ChatRequest<'a> {
    fn new(model: &'a str, system_prompt: &'a str, user_prompt: &'a str) -> Self {
        Self {
            model,
            messages: [
                ChatMessage { role: "system", content: system_prompt },
                ChatMessage { role: "user", content: user_prompt },
            ],
            stream: false,
            options: ChatOptions { temperature: TEMPERATURE },
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    message: Option<ReplyMessage>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: String,
}
