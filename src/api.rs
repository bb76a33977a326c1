// API client module: contains a small blocking HTTP client that talks to
// the ShopLite RAG server. The server exposes a single POST /chat endpoint;
// everything else (retrieval, ranking, inference) lives behind it.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Request timeout in seconds when `SHOPLITE_TIMEOUT` is not set.
pub const DEFAULT_TIMEOUT_SECS: f64 = 45.0;

/// Body sent to POST /chat. The `debug` field is omitted entirely when
/// debug mode is off, so the server only sees it when asked for.
#[derive(Serialize, Debug)]
pub struct ChatRequest<'a> {
    pub query: &'a str,
    pub session_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
}

/// Reply from POST /chat. Every field is optional: the server contract is
/// loose, so `sources`, `confidence` and `debug` stay as `serde_json::Value`
/// to avoid parse failures when the shape drifts.
#[derive(Deserialize, Debug, Default)]
pub struct ChatReply {
    pub answer: Option<String>,
    pub sources: Option<serde_json::Value>,
    pub confidence: Option<serde_json::Value>,
    pub debug: Option<serde_json::Value>,
}

/// Blocking client that holds the base URL and the per-process session id.
/// The session id never changes after construction; the server uses it to
/// correlate turns within one conversation.
pub struct ChatClient {
    client: Client,
    base_url: String,
    session_id: String,
    debug: bool,
}

impl ChatClient {
    /// Build a client for `base_url`, reading the rest of the configuration
    /// from the environment:
    /// - `SHOPLITE_SESSION`: session id override (a fresh UUID otherwise)
    /// - `SHOPLITE_DEBUG=1`: request debug payloads from the server
    /// - `SHOPLITE_TIMEOUT`: request timeout in seconds (default 45)
    pub fn from_env(base_url: String) -> Result<Self> {
        let session_id = std::env::var("SHOPLITE_SESSION")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let debug = std::env::var("SHOPLITE_DEBUG").map(|v| v == "1").unwrap_or(false);
        let timeout_secs = match std::env::var("SHOPLITE_TIMEOUT") {
            Ok(v) => v
                .trim()
                .parse::<f64>()
                .with_context(|| format!("SHOPLITE_TIMEOUT is not a number: {:?}", v))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        Self::new(base_url, session_id, debug, timeout_secs)
    }

    /// Build a client with explicit settings. `from_env` delegates here.
    pub fn new(base_url: String, session_id: String, debug: bool, timeout_secs: f64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs_f64(timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ChatClient {
            client,
            base_url,
            session_id,
            debug,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug
    }

    /// POST the question to `<base>/chat` and parse the JSON reply.
    ///
    /// Failure surfacing follows two paths:
    /// - non-2xx status: the error body is parsed as JSON if possible,
    ///   otherwise up to 400 chars of raw text are kept, and the returned
    ///   error carries the status code plus that detail;
    /// - 2xx but non-JSON body: the error shows up to 600 chars of raw text.
    pub fn send_query(&self, query: &str) -> Result<ChatReply> {
        let url = format!("{}/chat", &self.base_url);
        let payload = ChatRequest {
            query,
            session_id: &self.session_id,
            debug: if self.debug { Some(true) } else { None },
        };
        let res = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .with_context(|| format!("Failed to send chat request to {}", url))?;

        let status = res.status();
        let body = res.text().unwrap_or_else(|_| "".into());
        if !status.is_success() {
            let detail = match serde_json::from_str::<serde_json::Value>(&body) {
                Ok(err) => err.to_string(),
                Err(_) => truncate_chars(&body, 400).to_string(),
            };
            anyhow::bail!("[server {}] request failed\nDetails: {}", status.as_u16(), detail);
        }
        match serde_json::from_str(&body) {
            Ok(reply) => Ok(reply),
            Err(_) => anyhow::bail!("Response was not JSON:\n{}", truncate_chars(&body, 600)),
        }
    }
}

/// Take at most `max` characters, staying on a char boundary.
pub(crate) fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
