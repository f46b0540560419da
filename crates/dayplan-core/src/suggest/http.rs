//! Suggestion source reached over HTTP.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use super::prompt::extract_json;
use super::{SuggestionRequest, SuggestionSource};
use crate::error::{ConfigError, CoreError, Result};
use crate::storage::SuggestionConfig;
use crate::task::Task;

const SERVICE: &str = "suggestion source";

#[derive(Serialize)]
struct RequestBody<'a> {
    prompt: &'a str,
    tasks: &'a [Task],
}

/// POSTs `{prompt, tasks}` as JSON and reads back the suggested tasks.
///
/// The reply may be the task array itself, or `{"text": "..."}` whose text
/// holds the array, possibly inside a fenced code block.
pub struct HttpSuggestionSource {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl HttpSuggestionSource {
    pub fn new(endpoint: Url) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into()).filter(|k: &String| !k.trim().is_empty());
        self
    }

    /// Builds a source from `[suggestion]`. The bearer token is read from
    /// the environment variable named by `api_key_env`.
    ///
    /// # Errors
    /// No endpoint configured, or it is not a valid URL.
    pub fn from_config(config: &SuggestionConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .as_deref()
            .ok_or_else(|| ConfigError::MissingKey("suggestion.endpoint".into()))?;
        let endpoint = Url::parse(endpoint).map_err(|e| ConfigError::InvalidValue {
            key: "suggestion.endpoint".into(),
            message: e.to_string(),
        })?;
        let source = Self::new(endpoint);
        Ok(match std::env::var(&config.api_key_env) {
            Ok(key) => source.with_api_key(key),
            Err(_) => source,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// Plain JSON first; failing that, whatever sits inside a code fence.
fn parse_json_text(text: &str) -> serde_json::Result<Value> {
    serde_json::from_str(text.trim()).or_else(|_| serde_json::from_str(extract_json(text)))
}

/// Turns a response body into the suggested task array.
pub(crate) fn parse_reply(body: &str) -> Result<Value> {
    let value = parse_json_text(body)
        .map_err(|e| CoreError::InvalidResponse(format!("reply is not JSON: {e}")))?;
    match value {
        Value::Object(mut map) => match map.remove("text") {
            Some(Value::String(text)) => parse_json_text(&text)
                .map_err(|e| CoreError::InvalidResponse(format!("reply text is not JSON: {e}"))),
            _ => Err(CoreError::InvalidResponse(
                "reply object has no \"text\" field".into(),
            )),
        },
        other => Ok(other),
    }
}

#[async_trait]
impl SuggestionSource for HttpSuggestionSource {
    async fn suggest(&self, request: &SuggestionRequest) -> Result<Value> {
        let body = RequestBody {
            prompt: &request.prompt,
            tasks: &request.tasks,
        };

        let mut builder = self.client.post(self.endpoint.clone()).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| CoreError::upstream(SERVICE, format!("request failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CoreError::upstream(SERVICE, format!("failed reading reply: {e}")))?;

        if !status.is_success() {
            return Err(CoreError::upstream(SERVICE, format!("HTTP {status}: {text}")));
        }

        tracing::debug!(bytes = text.len(), "suggestion reply received");
        parse_reply(&text)
    }
}
