//! HTTP client for the generative language API
//!
//! Each method performs exactly one request with one key and reports failure
//! as a classified `ProviderError`. This is the boundary where raw provider
//! failures become `ErrorClassification`: HTTP errors go through
//! `classify_status`, transport errors are transient.

use std::time::Duration;

use common::ApiKey;
use provider::{ErrorClassification, ProviderError, classify_status, error_message_from_body};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::constants::{API_KEY_HEADER, DEFAULT_BASE_URL};
use crate::types::{GenerateRequest, GenerateResponse, InlineData, Operation};

/// Thin wrapper over `reqwest::Client` bound to one API base URL.
#[derive(Debug, Clone)]
pub struct GenAiClient {
    http: reqwest::Client,
    base_url: String,
}

impl Default for GenAiClient {
    fn default() -> Self {
        Self::new(reqwest::Client::new(), DEFAULT_BASE_URL)
    }
}

impl GenAiClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST models/{model}:generateContent`
    pub async fn generate_content(
        &self,
        key: &ApiKey,
        model: &str,
        request: &GenerateRequest,
    ) -> provider::Result<GenerateResponse> {
        let url = format!("{}/models/{model}:generateContent", self.base_url);
        debug!(model, key = %key.masked(), "generateContent");
        send(
            self.http
                .post(&url)
                .header(API_KEY_HEADER, key.expose())
                .json(request),
        )
        .await
    }

    /// `POST models/{model}:predictLongRunning` for image-to-video.
    pub async fn start_video(
        &self,
        key: &ApiKey,
        model: &str,
        prompt: &str,
        image: &InlineData,
    ) -> provider::Result<Operation> {
        let url = format!("{}/models/{model}:predictLongRunning", self.base_url);
        let body = serde_json::json!({
            "instances": [{
                "prompt": prompt,
                "image": {
                    "bytesBase64Encoded": image.data,
                    "mimeType": image.mime_type,
                }
            }]
        });
        debug!(model, key = %key.masked(), "predictLongRunning");
        send(
            self.http
                .post(&url)
                .header(API_KEY_HEADER, key.expose())
                .json(&body),
        )
        .await
    }

    /// `GET {operation name}` to refresh a long-running operation.
    pub async fn poll_operation(&self, key: &ApiKey, name: &str) -> provider::Result<Operation> {
        let url = format!("{}/{}", self.base_url, name.trim_start_matches('/'));
        send(self.http.get(&url).header(API_KEY_HEADER, key.expose())).await
    }
}

/// Send a request and decode a JSON success body.
async fn send<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> provider::Result<T> {
    let response = request.send().await.map_err(transport_error)?;

    let status = response.status();
    if !status.is_success() {
        let retry_after = retry_after_header(response.headers());
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        return Err(status_error(status.as_u16(), &body, retry_after));
    }

    response.json::<T>().await.map_err(|e| {
        if e.is_decode() {
            ProviderError::permanent(format!("invalid response body: {e}"))
        } else {
            ProviderError::transient(format!("fetch failed while reading body: {e}"))
        }
    })
}

/// Connection, timeout and other transport failures are retryable; a request
/// that could not even be built is not.
fn transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_builder() {
        ProviderError::permanent(format!("invalid request: {e}"))
    } else {
        ProviderError::transient(format!("fetch failed: {e}"))
    }
}

fn status_error(status: u16, body: &str, retry_after: Option<Duration>) -> ProviderError {
    let classification = match classify_status(status, body) {
        ErrorClassification::RateLimited { retry_after: hint } => ErrorClassification::RateLimited {
            retry_after: hint.or(retry_after),
        },
        other => other,
    };
    let mut message = error_message_from_body(body);
    if message.is_empty() {
        message = format!("HTTP {status}");
    }
    ProviderError::new(classification, message).with_status(status)
}

/// `Retry-After` in delta-seconds form. HTTP-date values are ignored.
fn retry_after_header(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GenAiClient {
        GenAiClient::new(reqwest::Client::new(), format!("{}/", server.uri()))
    }

    #[tokio::test]
    async fn generate_content_sends_key_header_and_parses_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "key-1"))
            .and(body_partial_json(json!({"contents": [{"parts": [{"text": "hi"}]}]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "hello there"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = client(&server)
            .generate_content(
                &ApiKey::new("key-1"),
                "gemini-2.5-flash",
                &GenerateRequest::text("hi"),
            )
            .await
            .unwrap();
        assert_eq!(response.text().as_deref(), Some("hello there"));
    }

    #[tokio::test]
    async fn invalid_key_response_is_permanent_with_provider_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {
                    "code": 400,
                    "message": "API key not valid. Please pass a valid API key.",
                    "status": "INVALID_ARGUMENT"
                }
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .generate_content(&ApiKey::new("bad"), "m", &GenerateRequest::text("x"))
            .await
            .unwrap_err();
        assert_eq!(err.classification, ErrorClassification::Permanent);
        assert_eq!(err.status, Some(400));
        assert_eq!(
            err.message,
            "[400] [INVALID_ARGUMENT] API key not valid. Please pass a valid API key."
        );
    }

    #[tokio::test]
    async fn overloaded_response_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({
                "error": {"code": 503, "message": "The model is overloaded.", "status": "UNAVAILABLE"}
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .generate_content(&ApiKey::new("k"), "m", &GenerateRequest::text("x"))
            .await
            .unwrap_err();
        assert!(err.is_transient());
        assert_eq!(err.message, "[503] [UNAVAILABLE] The model is overloaded.");
    }

    #[tokio::test]
    async fn rate_limit_uses_retry_after_header_when_body_has_no_hint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("retry-after", "7")
                    .set_body_string("Resource has been exhausted"),
            )
            .mount(&server)
            .await;

        let err = client(&server)
            .generate_content(&ApiKey::new("k"), "m", &GenerateRequest::text("x"))
            .await
            .unwrap_err();
        assert_eq!(
            err.classification,
            ErrorClassification::RateLimited {
                retry_after: Some(Duration::from_secs(7))
            }
        );
        assert_eq!(err.message, "Resource has been exhausted");
    }

    #[tokio::test]
    async fn malformed_success_body_is_permanent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client(&server)
            .generate_content(&ApiKey::new("k"), "m", &GenerateRequest::text("x"))
            .await
            .unwrap_err();
        assert_eq!(err.classification, ErrorClassification::Permanent);
    }

    #[tokio::test]
    async fn connection_refused_is_transient() {
        let client = GenAiClient::new(reqwest::Client::new(), "http://127.0.0.1:1");
        let err = client
            .generate_content(&ApiKey::new("k"), "m", &GenerateRequest::text("x"))
            .await
            .unwrap_err();
        assert!(err.is_transient(), "got: {err:?}");
        assert!(err.message.starts_with("fetch failed"));
    }

    #[tokio::test]
    async fn start_and_poll_video_operation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/veo-test:predictLongRunning"))
            .and(body_partial_json(json!({
                "instances": [{"prompt": "waves", "image": {"mimeType": "image/png"}}]
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"name": "models/veo-test/operations/op1"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/models/veo-test/operations/op1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "models/veo-test/operations/op1",
                "done": true
            })))
            .mount(&server)
            .await;

        let client = client(&server);
        let key = ApiKey::new("k");
        let image = InlineData {
            mime_type: "image/png".into(),
            data: "iVBOR".into(),
        };
        let op = client.start_video(&key, "veo-test", "waves", &image).await.unwrap();
        assert!(!op.done);
        let polled = client.poll_operation(&key, &op.name).await.unwrap();
        assert!(polled.done);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = GenAiClient::new(reqwest::Client::new(), "https://example.test/v1beta/");
        assert_eq!(client.base_url(), "https://example.test/v1beta");
        assert_eq!(GenAiClient::default().base_url(), DEFAULT_BASE_URL);
    }
}
