//! Hosted text-completion client.

use std::time::Duration;

use reqwest::blocking::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::CompletionError;
use crate::http::build_client;
use crate::sanitize::truncate_for_log;

/// A service that continues a prompt.
///
/// Treated as a black box: the only contract is prompt in, text out.
pub trait CompletionService: Send + Sync {
    fn complete(
        &self,
        prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, CompletionError>;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// OpenAI `/completions` endpoint client.
pub struct OpenAiCompletion {
    client: Client,
    api_key: SecretString,
    model: String,
    endpoint: String,
}

impl OpenAiCompletion {
    pub fn new(
        api_key: SecretString,
        model: &str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, CompletionError> {
        Ok(Self {
            client: build_client(timeout)?,
            api_key,
            model: model.to_string(),
            endpoint: completions_endpoint(base_url),
        })
    }

    #[cfg(test)]
    fn model(&self) -> &str {
        &self.model
    }

    #[cfg(test)]
    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl CompletionService for OpenAiCompletion {
    fn complete(
        &self,
        prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, CompletionError> {
        let _span = tracing::debug_span!("completion", model = %self.model, max_tokens).entered();

        let body = CompletionRequest {
            model: &self.model,
            prompt,
            temperature,
            max_tokens,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()?;

        let status = response.status();
        let text = response.text()?;
        debug!("Completion service responded with {}", status);

        if !status.is_success() {
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message: api_error_message(&text),
            });
        }

        parse_completion(&text)
    }
}

fn completions_endpoint(base_url: &str) -> String {
    format!("{}/completions", base_url.trim_end_matches('/'))
}

/// Extracts the first choice's text from a successful response body.
fn parse_completion(body: &str) -> Result<String, CompletionError> {
    let response: CompletionResponse =
        serde_json::from_str(body).map_err(|e| CompletionError::Decode(e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.text)
        .ok_or(CompletionError::EmptyResponse)
}

/// Prefers the structured error message; falls back to the raw body.
fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(parsed) => truncate_for_log(&parsed.error.message),
        Err(_) => truncate_for_log(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_from_base_url() {
        assert_eq!(
            completions_endpoint("https://api.openai.com/v1"),
            "https://api.openai.com/v1/completions"
        );
        assert_eq!(
            completions_endpoint("http://localhost:8080/v1/"),
            "http://localhost:8080/v1/completions"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let body = CompletionRequest {
            model: "gpt-3.5-turbo-instruct",
            prompt: "Correct this",
            temperature: 0.5,
            max_tokens: 2000,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo-instruct");
        assert_eq!(json["prompt"], "Correct this");
        assert_eq!(json["temperature"], 0.5);
        assert_eq!(json["max_tokens"], 2000);
    }

    #[test]
    fn test_parse_first_choice() {
        let body = r#"{"id":"cmpl-1","choices":[{"text":"\n\nHello","index":0},{"text":"other"}]}"#;
        assert_eq!(parse_completion(body).unwrap(), "\n\nHello");
    }

    #[test]
    fn test_parse_no_choices() {
        let result = parse_completion(r#"{"choices":[]}"#);
        assert!(matches!(result, Err(CompletionError::EmptyResponse)));
    }

    #[test]
    fn test_parse_invalid_json() {
        let result = parse_completion("<html>gateway timeout</html>");
        assert!(matches!(result, Err(CompletionError::Decode(_))));
    }

    #[test]
    fn test_api_error_message_structured() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
        assert_eq!(api_error_message(body), "Incorrect API key provided");
    }

    #[test]
    fn test_api_error_message_raw_body_truncated() {
        let body = "e".repeat(1000);
        assert!(api_error_message(&body).ends_with("(truncated)"));
    }

    #[test]
    fn test_client_construction() {
        let client = OpenAiCompletion::new(
            SecretString::from("sk-test".to_string()),
            "gpt-3.5-turbo-instruct",
            "https://api.openai.com/v1",
            Duration::from_secs(5),
        )
        .unwrap();

        assert_eq!(client.model(), "gpt-3.5-turbo-instruct");
        assert_eq!(client.endpoint(), "https://api.openai.com/v1/completions");
    }
}
