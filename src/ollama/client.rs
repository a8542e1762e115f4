use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use tracing::debug;

use super::wire::{
    decode_ndjson, ChatChunk, ChatRequest, ErrorBody, GenerateChunk, GenerateRequest,
    GenerationOptions, ShowRequest, ShowResponse, TagEntry, TagsResponse,
};
use crate::app::Config;
use crate::constants::DEFAULT_OLLAMA_PORT;
use crate::models::{ChatMessage, FragmentStream, ModelDetails, ModelHost};
use crate::utils::{Result, TermchatError};

/// HTTP client for an Ollama model host
pub struct OllamaClient {
    http: Client,
    base_url: String,
    options: GenerationOptions,
    /// Bound on whole non-streaming exchanges (`list`, `show`)
    request_timeout: Duration,
}

impl OllamaClient {
    /// Build a client from the resolved configuration
    ///
    /// Streamed replies have no overall deadline, only an idle limit
    /// between reads, so long generations are never cut short.
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(config.host.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.host.read_timeout_secs))
            .build()
            .map_err(|e| TermchatError::UpstreamError(e.to_string()))?;

        Ok(Self {
            http,
            base_url: normalize_host(&config.host.url),
            options: GenerationOptions {
                temperature: config.model.temperature,
            },
            request_timeout: Duration::from_secs(config.host.request_timeout_secs),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn options(&self) -> Option<&GenerationOptions> {
        (!self.options.is_empty()).then_some(&self.options)
    }

    /// Only a failed connection means the host is unreachable; once it has
    /// answered, anything else is an upstream failure
    fn transport_error(&self, err: reqwest::Error) -> TermchatError {
        if err.is_connect() {
            TermchatError::HostUnreachable {
                host: self.base_url.clone(),
            }
        } else if err.is_timeout() {
            TermchatError::UpstreamError(format!(
                "model host at {} stopped responding",
                self.base_url
            ))
        } else {
            TermchatError::UpstreamError(err.to_string())
        }
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        model: &str,
    ) -> Result<Response> {
        let url = self.url(path);
        debug!("POST {} (model {})", url, model);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        check_status(response, Some(model)).await
    }

    fn into_fragments<L>(&self, response: Response) -> FragmentStream
    where
        L: super::wire::StreamLine + 'static,
    {
        let host = self.base_url.clone();
        let body = response.bytes_stream().map_err(move |e| {
            if e.is_timeout() {
                TermchatError::UpstreamError(format!(
                    "model host at {} stopped sending the reply",
                    host
                ))
            } else {
                TermchatError::UpstreamError(e.to_string())
            }
        });
        decode_ndjson::<_, L>(body)
    }
}

#[async_trait]
impl ModelHost for OllamaClient {
    async fn list(&self) -> Result<Vec<String>> {
        let url = self.url("/api/tags");
        debug!("GET {}", url);
        let response = self
            .http
            .get(&url)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = check_status(response, None).await?;
        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| TermchatError::UpstreamError(e.to_string()))?;

        Ok(tags
            .models
            .into_iter()
            .filter_map(TagEntry::into_identifier)
            .collect())
    }

    async fn chat(&self, model: &str, messages: &[ChatMessage]) -> Result<FragmentStream> {
        let request = ChatRequest {
            model,
            messages,
            stream: true,
            options: self.options(),
        };
        let response = self.post("/api/chat", &request, model).await?;
        Ok(self.into_fragments::<ChatChunk>(response))
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<FragmentStream> {
        let request = GenerateRequest {
            model,
            prompt,
            stream: true,
            options: self.options(),
        };
        let response = self.post("/api/generate", &request, model).await?;
        Ok(self.into_fragments::<GenerateChunk>(response))
    }

    async fn show(&self, model: &str) -> Result<ModelDetails> {
        let url = self.url("/api/show");
        debug!("POST {} (model {})", url, model);
        let response = self
            .http
            .post(&url)
            .json(&ShowRequest { model })
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let response = check_status(response, Some(model)).await?;
        let raw: ShowResponse = response
            .json()
            .await
            .map_err(|e| TermchatError::UpstreamError(e.to_string()))?;
        Ok(ModelDetails::from_raw(raw))
    }
}

/// Map a non-success status to the error taxonomy
async fn check_status(response: Response, model: Option<&str>) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if let (StatusCode::NOT_FOUND, Some(model)) = (status, model) {
        return Err(TermchatError::ModelNotFound {
            model: model.to_string(),
        });
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error)
        .unwrap_or(body);
    Err(TermchatError::UpstreamError(format!("{}: {}", status, message)))
}

/// Accept `host`, `host:port` and full URLs, as the ollama CLI does
///
/// Without a scheme the port defaults to 11434; with an explicit scheme the
/// scheme's own default port applies.
pub fn normalize_host(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    let (scheme, rest, explicit_scheme) = match trimmed.split_once("://") {
        Some((scheme, rest)) => (scheme, rest, true),
        None => ("http", trimmed, false),
    };
    let (authority, path) = match rest.find('/') {
        Some(i) => rest.split_at(i),
        None => (rest, ""),
    };

    // IPv6 literals carry colons of their own
    let has_port = match authority.rfind(']') {
        Some(end) => authority[end..].contains(':'),
        None => authority.contains(':'),
    };

    if has_port || explicit_scheme || authority.is_empty() {
        format!("{}://{}{}", scheme, authority, path)
    } else {
        format!("{}://{}:{}{}", scheme, authority, DEFAULT_OLLAMA_PORT, path)
    }
}
