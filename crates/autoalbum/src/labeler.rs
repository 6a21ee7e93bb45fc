//! Descriptive labels for photographs via Google Cloud Vision.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::blocking::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::http::build_client;
use crate::sanitize::truncate_for_log;

/// Produces labels describing the content of an image.
///
/// Failures never abort processing; implementations log them and return no
/// labels.
pub trait PhotoLabeler: Send + Sync {
    fn label(&self, image: &[u8]) -> Vec<String>;
}

#[derive(Debug, Serialize)]
struct AnnotateRequest {
    requests: Vec<AnnotateImageRequest>,
}

#[derive(Debug, Serialize)]
struct AnnotateImageRequest {
    image: ImageContent,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Debug, Serialize)]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(rename = "maxResults")]
    max_results: u32,
}

#[derive(Debug, Default, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
    #[serde(default)]
    error: Option<StatusBody>,
}

#[derive(Debug, Default, Deserialize)]
struct AnnotateImageResponse {
    #[serde(default, rename = "labelAnnotations")]
    label_annotations: Vec<EntityAnnotation>,
    #[serde(default)]
    error: Option<StatusBody>,
}

#[derive(Debug, Deserialize)]
struct EntityAnnotation {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    #[serde(default)]
    message: String,
}

/// `images:annotate` client requesting `LABEL_DETECTION`.
pub struct GoogleVisionLabeler {
    client: Client,
    api_key: SecretString,
    endpoint: String,
    max_results: u32,
}

impl GoogleVisionLabeler {
    pub fn new(
        api_key: SecretString,
        endpoint: &str,
        max_results: u32,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_client(timeout)?,
            api_key,
            endpoint: endpoint.to_string(),
            max_results,
        })
    }

    fn request_labels(&self, image: &[u8]) -> Result<Vec<String>, String> {
        let body = build_request(image, self.max_results);

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.expose_secret())])
            .json(&body)
            .send()
            .map_err(|e| e.without_url().to_string())?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|e| e.without_url().to_string())?;

        if !status.is_success() {
            return Err(format!("HTTP {}: {}", status, truncate_for_log(&text)));
        }

        parse_labels(&text)
    }
}

impl PhotoLabeler for GoogleVisionLabeler {
    fn label(&self, image: &[u8]) -> Vec<String> {
        let _span = tracing::info_span!("label_photo", bytes = image.len()).entered();

        match self.request_labels(image) {
            Ok(labels) => {
                debug!("Vision returned {} label(s)", labels.len());
                labels
            }
            Err(e) => {
                warn!("Label detection failed: {}", e);
                Vec::new()
            }
        }
    }
}

fn build_request(image: &[u8], max_results: u32) -> AnnotateRequest {
    AnnotateRequest {
        requests: vec![AnnotateImageRequest {
            image: ImageContent {
                content: STANDARD.encode(image),
            },
            features: vec![Feature {
                kind: "LABEL_DETECTION",
                max_results,
            }],
        }],
    }
}

/// Pulls label descriptions from an annotate response, in service order.
fn parse_labels(body: &str) -> Result<Vec<String>, String> {
    let response: AnnotateResponse =
        serde_json::from_str(body).map_err(|e| format!("invalid response: {}", e))?;

    if let Some(error) = response.error {
        return Err(error.message);
    }

    let Some(first) = response.responses.into_iter().next() else {
        return Ok(Vec::new());
    };

    if let Some(error) = first.error {
        return Err(error.message);
    }

    Ok(first
        .label_annotations
        .into_iter()
        .map(|annotation| annotation.description)
        .filter(|description| !description.is_empty())
        .collect())
}
