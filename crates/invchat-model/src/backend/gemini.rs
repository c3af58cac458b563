//! Google Gemini backend over the `generateContent` REST endpoint.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ModelBackend;
use crate::{ImageInput, ModelError, Result, RetryPolicy};

/// Default Gemini model.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";

/// Default API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection settings for [`GeminiBackend`].
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl GeminiConfig {
    /// Settings with the default model, endpoint, timeout and retries.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    /// Read the API key from the environment variable `var`.
    ///
    /// A missing or blank variable is reported as [`ModelError::MissingApiKey`].
    pub fn from_env(var: &str) -> Result<Self> {
        match std::env::var(var) {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key.trim())),
            _ => Err(ModelError::MissingApiKey(var.to_string())),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Full URL of the `generateContent` method for the configured model.
    pub fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

/// Blocking Gemini client.
pub struct GeminiBackend {
    client: Client,
    config: GeminiConfig,
}

impl GeminiBackend {
    /// Create a backend, building an HTTP client with the configured timeout.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ModelError::MissingApiKey("api_key".to_string()));
        }

        let client = Client::builder()
            .user_agent(concat!("invchat/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| ModelError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn send(&self, body: &GenerateRequest) -> Result<String> {
        let url = self.config.url();

        self.config.retry.run(|| {
            debug!(model = %self.config.model, "Sending request to Gemini");

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.config.api_key)
                .json(body)
                .send()?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().unwrap_or_default();
                return Err(ModelError::Status {
                    status: status.as_u16(),
                    body: truncate(&body, 500),
                });
            }

            let parsed: GenerateResponse = response
                .json()
                .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

            extract_text(parsed)
        })
    }
}

impl ModelBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    fn generate(&self, prompt: &str) -> Result<String> {
        self.send(&GenerateRequest::text(prompt))
    }

    fn generate_with_image(&self, image: &ImageInput, prompt: &str) -> Result<String> {
        self.send(&GenerateRequest::with_image(prompt, image))
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

impl GenerateRequest {
    fn text(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part::text(prompt)],
            }],
        }
    }

    fn with_image(prompt: &str, image: &ImageInput) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part::text(prompt),
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: image.mime_type().to_string(),
                            data: image.to_base64(),
                        }),
                    },
                ],
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            inline_data: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

/// Concatenate the text parts of the first candidate.
fn extract_text(response: GenerateResponse) -> Result<String> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response.prompt_feedback.and_then(|f| f.block_reason);
        return Err(ModelError::EmptyResponse(reason));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| p.text)
        .collect();

    if text.trim().is_empty() {
        return Err(ModelError::EmptyResponse(candidate.finish_reason));
    }

    Ok(text)
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max_chars).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_url() {
        let config = GeminiConfig::new("key").with_endpoint("http://localhost:8080/");
        assert_eq!(
            config.url(),
            "http://localhost:8080/v1beta/models/gemini-1.5-flash-latest:generateContent"
        );
    }

    #[test]
    fn test_text_request_body() {
        let body = serde_json::to_value(GenerateRequest::text("hello")).unwrap();
        assert_eq!(
            body,
            json!({ "contents": [{ "role": "user", "parts": [{ "text": "hello" }] }] })
        );
    }

    #[test]
    fn test_image_request_body() {
        let image = ImageInput::with_mime_type(b"abc".to_vec(), "image/png");
        let body = serde_json::to_value(GenerateRequest::with_image("read this", &image)).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        { "text": "read this" },
                        { "inlineData": { "mimeType": "image/png", "data": "YWJj" } }
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "{\"vendor\":" }, { "text": " \"ACME\"}" }] },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();

        assert_eq!(extract_text(response).unwrap(), "{\"vendor\": \"ACME\"}");
    }

    #[test]
    fn test_extract_text_blocked_prompt() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap();

        match extract_text(response) {
            Err(ModelError::EmptyResponse(reason)) => assert_eq!(reason.as_deref(), Some("SAFETY")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_extract_text_empty_candidate() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{ "finishReason": "MAX_TOKENS" }]
        }))
        .unwrap();

        assert!(matches!(extract_text(response), Err(ModelError::EmptyResponse(Some(_)))));
    }

    #[test]
    fn test_blank_key_rejected() {
        assert!(matches!(
            GeminiBackend::new(GeminiConfig::new("  ")),
            Err(ModelError::MissingApiKey(_))
        ));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc…");
    }

    mod http {
        //! Drives `GeminiBackend` against a local one-connection-per-response server.

        use super::*;
        use pretty_assertions::assert_eq;
        use std::io::{BufRead, BufReader, Read, Write};
        use std::net::{TcpListener, TcpStream};
        use std::sync::{Arc, Mutex};
        use std::thread;

        const OK_BODY: &str = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hello"}]},"finishReason":"STOP"}]}"#;

        struct StubServer {
            endpoint: String,
            requests: Arc<Mutex<Vec<String>>>,
            handle: thread::JoinHandle<()>,
        }

        impl StubServer {
            /// Serve `responses` in order, one per connection.
            fn start(responses: Vec<(u16, String)>) -> Self {
                let listener = TcpListener::bind("127.0.0.1:0").unwrap();
                let endpoint = format!("http://{}", listener.local_addr().unwrap());
                let requests = Arc::new(Mutex::new(Vec::new()));
                let seen = Arc::clone(&requests);

                let handle = thread::spawn(move || {
                    for (status, body) in responses {
                        let (mut stream, _) = listener.accept().unwrap();
                        let request = read_request(&mut stream);
                        seen.lock().unwrap().push(request);

                        let response = format!(
                            "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status,
                            body.len(),
                            body
                        );
                        stream.write_all(response.as_bytes()).unwrap();
                    }
                });

                Self { endpoint, requests, handle }
            }

            fn backend(&self, max_retries: u32) -> GeminiBackend {
                let config = GeminiConfig::new("test-key")
                    .with_endpoint(self.endpoint.clone())
                    .with_timeout(Duration::from_secs(5))
                    .with_retry(
                        RetryPolicy::default()
                            .with_max_retries(max_retries)
                            .with_initial_backoff(Duration::from_millis(1)),
                    );
                let client = Client::builder()
                    .no_proxy()
                    .timeout(config.timeout)
                    .build()
                    .unwrap();
                GeminiBackend { client, config }
            }

            /// Wait for every scripted response to be served and return the requests.
            fn finish(self) -> Vec<String> {
                self.handle.join().unwrap();
                let requests = self.requests.lock().unwrap();
                requests.clone()
            }
        }

        fn read_request(stream: &mut TcpStream) -> String {
            let mut reader = BufReader::new(stream);
            let mut head = String::new();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
                head.push_str(&line);
            }

            let length = head
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);

            let mut body = vec![0; length];
            reader.read_exact(&mut body).unwrap();
            format!("{}\r\n{}", head, String::from_utf8_lossy(&body))
        }

        #[test]
        fn test_retries_server_error_then_succeeds() {
            let server = StubServer::start(vec![
                (503, r#"{"error":"overloaded"}"#.to_string()),
                (200, OK_BODY.to_string()),
            ]);
            let backend = server.backend(2);

            assert_eq!(backend.generate("hi").unwrap(), "Hello");

            let requests = server.finish();
            assert_eq!(requests.len(), 2);
            assert!(requests[0].starts_with(
                "POST /v1beta/models/gemini-1.5-flash-latest:generateContent HTTP/1.1"
            ));
            assert!(requests[0].to_ascii_lowercase().contains("x-goog-api-key: test-key"));
            assert!(requests[1].contains(r#""text":"hi""#));
        }

        #[test]
        fn test_client_error_is_not_retried() {
            let long_body = "x".repeat(800);
            let server = StubServer::start(vec![(400, long_body)]);
            let backend = server.backend(2);

            match backend.generate("hi") {
                Err(ModelError::Status { status, body }) => {
                    assert_eq!(status, 400);
                    assert_eq!(body.chars().count(), 501);
                    assert!(body.ends_with('…'));
                }
                other => panic!("unexpected result: {:?}", other),
            }
            assert_eq!(server.finish().len(), 1);
        }

        #[test]
        fn test_gives_up_after_max_retries() {
            let server = StubServer::start(vec![
                (503, "busy".to_string()),
                (500, "busy".to_string()),
                (503, "still busy".to_string()),
            ]);
            let backend = server.backend(2);

            match backend.generate("hi") {
                Err(ModelError::Status { status, body }) => {
                    assert_eq!(status, 503);
                    assert_eq!(body, "still busy");
                }
                other => panic!("unexpected result: {:?}", other),
            }
            assert_eq!(server.finish().len(), 3);
        }

        #[test]
        fn test_malformed_success_body() {
            let server = StubServer::start(vec![(200, "not json".to_string())]);
            let backend = server.backend(2);

            assert!(matches!(
                backend.generate("hi"),
                Err(ModelError::InvalidResponse(_))
            ));
            assert_eq!(server.finish().len(), 1);
        }

        #[test]
        fn test_image_request_over_http() {
            let server = StubServer::start(vec![(
                200,
                r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#.to_string(),
            )]);
            let backend = server.backend(0);
            let image = ImageInput::with_mime_type(b"abc".to_vec(), "image/png");

            assert!(matches!(
                backend.generate_with_image(&image, "read"),
                Err(ModelError::EmptyResponse(Some(reason))) if reason == "SAFETY"
            ));

            let requests = server.finish();
            assert!(requests[0].contains(r#""inlineData":{"mimeType":"image/png","data":"YWJj"}"#));
        }
    }
}
