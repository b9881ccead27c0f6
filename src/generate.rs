use std::time::Duration;

use crate::{
    decode::encode_data_uri,
    error::{CoverforgeError, CoverforgeResult},
    prompt::{Genre, build_prompt, request_aspect_ratio},
    templates::TemplateDetails,
};

/// Imagen predict endpoint used when none is supplied.
pub const DEFAULT_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/imagen-4.0-generate-001:predict";

/// Environment variable carrying the service credential.
pub const API_KEY_VAR: &str = "API_KEY";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, serde::Serialize)]
struct GenerateRequest<'a> {
    instances: Vec<Instance<'a>>,
    parameters: Parameters<'a>,
}

#[derive(Debug, serde::Serialize)]
struct Instance<'a> {
    prompt: &'a str,
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct Parameters<'a> {
    sample_count: u32,
    output_mime_type: &'a str,
    aspect_ratio: &'a str,
}

#[derive(Debug, serde::Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
}

/// Client for the external image-generation service.
///
/// Each call requests exactly one JPEG at the template's aspect ratio and
/// returns it as a self-describing data URI. Failures are surfaced as single
/// human-readable errors and never retried; the client mutates no local
/// state beyond the outbound call.
#[derive(Debug)]
pub struct ArtClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
}

impl ArtClient {
    /// Build a client from the `API_KEY` environment variable. A missing or
    /// empty credential is a configuration error, detected before any
    /// network traffic.
    pub fn from_env() -> CoverforgeResult<Self> {
        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                CoverforgeError::configuration(format!(
                    "API key is missing; set the {API_KEY_VAR} environment variable"
                ))
            })?;
        Self::new(api_key, DEFAULT_ENDPOINT)
    }

    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> CoverforgeResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(CoverforgeError::configuration("API key is empty"));
        }

        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                CoverforgeError::configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    /// Request one background artwork image for the given inputs.
    ///
    /// On success the result is a complete `data:image/jpeg;base64,...` URI,
    /// usable directly as a drawable source or re-decoded for export.
    #[tracing::instrument(skip(self, title, author))]
    pub fn generate(
        &self,
        title: &str,
        author: &str,
        genre: Genre,
        template: &TemplateDetails,
    ) -> CoverforgeResult<String> {
        let prompt = build_prompt(title, author, genre);
        let request = GenerateRequest {
            instances: vec![Instance { prompt: &prompt }],
            parameters: Parameters {
                sample_count: 1,
                output_mime_type: "image/jpeg",
                aspect_ratio: request_aspect_ratio(template),
            },
        };

        tracing::debug!(
            aspect_ratio = request_aspect_ratio(template),
            "requesting cover artwork"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .map_err(|e| CoverforgeError::generation(format!("generation request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(CoverforgeError::generation(format!(
                "generation service returned {status}: {}",
                detail.trim()
            )));
        }

        let body: GenerateResponse = response.json().map_err(|e| {
            CoverforgeError::generation(format!("failed to parse generation response: {e}"))
        })?;

        let payload = body
            .predictions
            .into_iter()
            .find_map(|p| p.bytes_base64_encoded)
            .ok_or_else(|| CoverforgeError::generation("no image was generated"))?;

        Ok(format!("data:image/jpeg;base64,{payload}"))
    }
}

/// Wrap raw JPEG bytes the way a successful generation response is wrapped.
/// Exposed for tests and for importing externally produced artwork.
pub fn jpeg_data_uri(bytes: &[u8]) -> String {
    encode_data_uri("image/jpeg", bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_is_a_configuration_error() {
        let err = ArtClient::new("   ", DEFAULT_ENDPOINT).unwrap_err();
        assert!(matches!(err, CoverforgeError::Configuration(_)));
    }

    #[test]
    fn request_body_carries_one_jpeg_at_template_aspect() {
        let template = crate::templates::TemplateKey::Ebook.details();
        let request = GenerateRequest {
            instances: vec![Instance { prompt: "p" }],
            parameters: Parameters {
                sample_count: 1,
                output_mime_type: "image/jpeg",
                aspect_ratio: template.aspect_ratio.as_str(),
            },
        };

        let body = serde_json::to_string(&request).unwrap();
        assert!(body.contains("\"sampleCount\":1"));
        assert!(body.contains("\"outputMimeType\":\"image/jpeg\""));
        assert!(body.contains("\"aspectRatio\":\"9:16\""));
    }

    #[test]
    fn response_without_payload_fields_parses_as_empty() {
        let body: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(body.predictions.is_empty());

        let body: GenerateResponse =
            serde_json::from_str("{\"predictions\":[{\"mimeType\":\"image/jpeg\"}]}").unwrap();
        assert!(body.predictions[0].bytes_base64_encoded.is_none());
    }
}
