//! Backend client: the single point of entry for all calls to the remote medical API.
//!
//! The remote service owns every medical decision (drug data, toxicity, chat answers).
//! This module only knows the request/response contracts:
//!   GET  {base}/medicaments/{name}/   → JSON object of notice fields
//!   POST {base}/toxicite/  {name}     → {"toxicite": "..."}
//!   POST {base}/chat/      {message}  → {"response": "..."}

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

/// Shown when the toxicity endpoint answers without a value.
pub const TOXICITY_UNAVAILABLE: &str = "Non disponible";
/// Shown when the chat endpoint answers without a response.
pub const CHAT_NO_RESPONSE: &str = "🤖 Je n’ai pas pu générer de réponse.";

const MAX_ERROR_CHARS: usize = 300;
const MAX_SNIPPET_CHARS: usize = 80;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API {status}: {message}")]
    Api { status: u16, message: String },

    #[error("non-JSON response from {url}; body starts with: {snippet}")]
    NonJson { url: String, snippet: String },

    #[error("invalid backend URL: {0}")]
    InvalidUrl(String),
}

/// Everything the service asks of the remote medical API.
#[async_trait]
pub trait MedicalBackend: Send + Sync {
    /// Notice fields for a drug, in the backend's key order.
    async fn fetch_medicament(&self, name: &str) -> Result<Map<String, Value>, BackendError>;

    /// Free-text toxicity assessment for a drug.
    async fn fetch_toxicity(&self, name: &str) -> Result<String, BackendError>;

    /// One chat turn. The backend keeps no conversation state.
    async fn chat(&self, message: &str) -> Result<String, BackendError>;
}

#[derive(Debug, Serialize)]
struct ToxicityRequest<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct ToxicityResponse {
    toxicite: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    response: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Value,
}

/// reqwest implementation of [`MedicalBackend`].
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base: Url,
}

impl HttpBackend {
    /// `base_url` is the API root including its `/api` prefix, without a trailing slash.
    pub fn new(base_url: &str, timeout: std::time::Duration) -> Result<Self, BackendError> {
        let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))
            .map_err(|e| BackendError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(BackendError::InvalidUrl(base_url.to_string()));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    /// Builds `{base}/{segments...}/`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| BackendError::InvalidUrl(self.base.to_string()))?;
            path.pop_if_empty();
            path.extend(segments);
            // The backend routes require the trailing slash.
            path.push("");
        }
        Ok(url)
    }

    /// Sends a request and decodes the JSON body, reading it as text first so that
    /// error and non-JSON responses can be reported with their content.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        url: &Url,
    ) -> Result<T, BackendError> {
        let response = request
            .header("Accept", "application/json")
            .send()
            .await?;
        let status = response.status();
        let raw = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&raw)
                .map(|body| match body.error {
                    Value::String(s) => s,
                    other => other.to_string(),
                })
                .unwrap_or(raw);
            let message = truncate_chars(&message, MAX_ERROR_CHARS);
            warn!(%url, status = status.as_u16(), "Backend returned an error: {message}");
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&raw).map_err(|_| BackendError::NonJson {
            url: url.to_string(),
            snippet: truncate_chars(&raw, MAX_SNIPPET_CHARS),
        })
    }
}

#[async_trait]
impl MedicalBackend for HttpBackend {
    async fn fetch_medicament(&self, name: &str) -> Result<Map<String, Value>, BackendError> {
        let url = self.endpoint(&["medicaments", name])?;
        debug!(%url, "Fetching medicament");
        let fields: Map<String, Value> = self.send_json(self.client.get(url.clone()), &url).await?;
        debug!(fields = fields.len(), "Medicament fetched");
        Ok(fields)
    }

    async fn fetch_toxicity(&self, name: &str) -> Result<String, BackendError> {
        let url = self.endpoint(&["toxicite"])?;
        debug!(%url, "Fetching toxicity");
        let body = ToxicityRequest { name: name.trim() };
        let response: ToxicityResponse = self
            .send_json(self.client.post(url.clone()).json(&body), &url)
            .await?;
        Ok(response
            .toxicite
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| TOXICITY_UNAVAILABLE.to_string()))
    }

    async fn chat(&self, message: &str) -> Result<String, BackendError> {
        let url = self.endpoint(&["chat"])?;
        debug!(%url, "Sending chat message");
        let body = ChatRequest { message };
        let response: ChatResponse = self
            .send_json(self.client.post(url.clone()).json(&body), &url)
            .await?;
        Ok(response
            .response
            .unwrap_or_else(|| CHAT_NO_RESPONSE.to_string()))
    }
}

/// Keeps at most `max` characters (not bytes).
fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::Path,
        http::StatusCode,
        response::IntoResponse,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;
    use std::time::Duration;

    /// Starts a fake medical API on an ephemeral port and returns its `/api` base URL.
    async fn spawn_fake_backend() -> String {
        async fn medicament(Path(name): Path<String>) -> axum::response::Response {
            match name.as_str() {
                "abacavir" => Json(json!({
                    "DCI": "Abacavir",
                    "classe": "Antirétroviral",
                    "structure_image_url": "/img/abacavir.png"
                }))
                .into_response(),
                "html" => "<!doctype html><html><body>index</body></html>".into_response(),
                "acide acétylsalicylique" => Json(json!({ "DCI": "Aspirine" })).into_response(),
                _ => (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "error": "Médicament introuvable" })),
                )
                    .into_response(),
            }
        }

        async fn toxicite(Json(body): Json<Value>) -> Json<Value> {
            match body["name"].as_str() {
                Some("Abacavir") => Json(json!({ "toxicite": "Hypersensibilité" })),
                _ => Json(json!({})),
            }
        }

        async fn chat(Json(body): Json<Value>) -> axum::response::Response {
            match body["message"].as_str() {
                Some("boom") => (StatusCode::INTERNAL_SERVER_ERROR, "x".repeat(1000)).into_response(),
                Some("silent") => Json(json!({})).into_response(),
                Some(m) => Json(json!({ "response": format!("echo: {m}") })).into_response(),
                None => StatusCode::BAD_REQUEST.into_response(),
            }
        }

        let app = Router::new()
            .route("/api/medicaments/:name/", get(medicament))
            .route("/api/toxicite/", post(toxicite))
            .route("/api/chat/", post(chat));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/api")
    }

    async fn backend() -> HttpBackend {
        HttpBackend::new(&spawn_fake_backend().await, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_endpoint_encodes_and_keeps_trailing_slash() {
        let b = HttpBackend::new("http://localhost:8000/api/", Duration::from_secs(1)).unwrap();
        let url = b.endpoint(&["medicaments", "acide acétylsalicylique"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/medicaments/acide%20ac%C3%A9tylsalicylique/"
        );
        let url = b.endpoint(&["medicaments", "a/b"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/medicaments/a%2Fb/");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        assert!(matches!(
            HttpBackend::new("not a url", Duration::from_secs(1)),
            Err(BackendError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_truncate_chars_counts_characters() {
        assert_eq!(truncate_chars("éééé", 2), "éé");
        assert_eq!(truncate_chars("ab", 10), "ab");
    }

    #[tokio::test]
    async fn test_fetch_medicament_keeps_key_order() {
        let fields = backend().await.fetch_medicament("abacavir").await.unwrap();
        let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["DCI", "classe", "structure_image_url"]);
    }

    #[tokio::test]
    async fn test_fetch_medicament_encodes_name() {
        let fields = backend()
            .await
            .fetch_medicament("acide acétylsalicylique")
            .await
            .unwrap();
        assert_eq!(fields["DCI"], "Aspirine");
    }

    #[tokio::test]
    async fn test_fetch_medicament_api_error_uses_error_field() {
        let err = backend().await.fetch_medicament("unknown").await.unwrap_err();
        match err {
            BackendError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Médicament introuvable");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_medicament_non_json_body() {
        let err = backend().await.fetch_medicament("html").await.unwrap_err();
        match err {
            BackendError::NonJson { url, snippet } => {
                assert!(url.ends_with("/api/medicaments/html/"));
                assert!(snippet.starts_with("<!doctype html>"));
                assert!(snippet.chars().count() <= MAX_SNIPPET_CHARS);
            }
            other => panic!("expected NonJson error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_toxicity() {
        let b = backend().await;
        assert_eq!(b.fetch_toxicity("  Abacavir ").await.unwrap(), "Hypersensibilité");
        assert_eq!(b.fetch_toxicity("Other").await.unwrap(), TOXICITY_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_chat_reply_and_fallback() {
        let b = backend().await;
        assert_eq!(b.chat("hello").await.unwrap(), "echo: hello");
        assert_eq!(b.chat("silent").await.unwrap(), CHAT_NO_RESPONSE);
    }

    #[tokio::test]
    async fn test_chat_server_error_is_truncated() {
        let err = backend().await.chat("boom").await.unwrap_err();
        match err {
            BackendError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message.chars().count(), MAX_ERROR_CHARS);
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
