// src/completion.rs
use std::future::Future;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::{error::CompletionError, settings::Settings};

/// Labels some models echo in front of their reply.
const ECHOED_LABELS: &[&str] = &["Assistant:", "assistant:", "AI:", "TechPal:"];

/// A text-completion backend: prompt in, reply out.
///
/// Implementations must catch every backend failure and report it as a
/// `CompletionError`; nothing else may escape.
pub trait CompletionClient: Send + Sync {
    fn model(&self) -> &str;

    fn complete(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, CompletionError>> + Send;
}

/// Normalize raw model text before it is shown or stored.
///
/// The session applies this to every successful completion, whatever the client.
pub fn clean_completion(raw: &str) -> String {
    let mut text = raw.trim();
    for label in ECHOED_LABELS {
        if let Some(rest) = text.strip_prefix(label) {
            text = rest.trim_start();
            break;
        }
    }
    text.to_string()
}

/// Run a completion that the user can abort with `token`.
pub async fn complete_cancellable<C: CompletionClient>(
    client: &C,
    prompt: &str,
    token: &CancellationToken,
) -> Result<String, CompletionError> {
    tokio::select! {
        _ = token.cancelled() => Err(CompletionError::Cancelled),
        result = client.complete(prompt) => result,
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
    error: Option<String>,
}

/// Client for a local Ollama server's `/api/generate` endpoint.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: Client,
    host: String,
    model: String,
}

impl OllamaClient {
    pub fn new(host: &str, model: &str) -> Self {
        Self {
            http: Client::new(),
            host: host.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.ollama_host, &settings.model)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    async fn generate(&self, prompt: &str) -> Result<String, CompletionError> {
        let url = format!("{}/api/generate", self.host);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        log::debug!("Sending {} prompt bytes to {url} ({})", prompt.len(), self.model);
        let response = self.http.post(&url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        let parsed: Option<GenerateResponse> = serde_json::from_str(&text).ok();

        if !status.is_success() {
            let detail = parsed
                .and_then(|body| body.error)
                .unwrap_or_else(|| text.trim().to_string());
            return Err(CompletionError::Backend(format!("{status}: {detail}")));
        }

        match parsed {
            Some(GenerateResponse {
                response: Some(reply),
                ..
            }) => Ok(reply),
            Some(GenerateResponse {
                error: Some(error), ..
            }) => Err(CompletionError::Backend(error)),
            Some(_) => Err(CompletionError::Backend(
                "response body has no completion text".to_string(),
            )),
            None => Err(CompletionError::Backend(format!(
                "could not decode response body: {}",
                text.trim()
            ))),
        }
    }
}

impl CompletionClient for OllamaClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.generate(prompt).await
    }
}
