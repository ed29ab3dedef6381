use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Failures surfaced by the API layer: transport, non-success status, and
/// missing/unreadable body. Status messages prefer the server's `detail`
/// field when one is present.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("invalid server response: {0}")]
    Decode(String),
    #[error("authentication required")]
    Unauthenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

/// File content for multipart uploads. Uploads deliberately carry no explicit
/// content-type header so the transport can set the multipart boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(FilePayload),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub bearer: Option<String>,
    pub body: RequestBody,
}

/// Seam between the stores and the wire. The production implementation is
/// [`HttpTransport`]; tests drive the stores through [`mock::MockTransport`].
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Execute a request and return the decoded JSON body, `None` when the
    /// response body is empty.
    async fn execute(&self, request: ApiRequest) -> Result<Option<Value>, ApiError>;
}

/// reqwest-backed transport. JSON bodies are sent with
/// `Content-Type: application/json`; multipart bodies let reqwest supply the
/// boundary header; bearer tokens go in the `Authorization` header.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<Option<Value>, ApiError> {
        let url = self.url_for(&request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Patch => self.client.patch(&url),
            Method::Delete => self.client.delete(&url),
        };
        if let Some(token) = &request.bearer {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder
                .header("Content-Type", "application/json")
                .json(&value),
            RequestBody::Multipart(file) => {
                let part = reqwest::multipart::Part::bytes(file.bytes)
                    .file_name(file.file_name)
                    .mime_str(&file.content_type)
                    .map_err(|err| ApiError::Transport(err.to_string()))?;
                builder.multipart(reqwest::multipart::Form::new().part(file.field, part))
            }
        };

        let response = builder
            .send()
            .await
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| ApiError::Transport(err.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: extract_detail(&text)
                    .unwrap_or_else(|| format!("request failed with status {}", status.as_u16())),
            });
        }
        if text.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|err| ApiError::Decode(err.to_string()))
    }
}

fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("detail")
        .and_then(|detail| detail.as_str())
        .map(str::to_string)
}

/// Typed request helpers shared by the auth and folder stores.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn ApiTransport>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self { transport }
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        bearer: Option<&str>,
    ) -> Result<T, ApiError> {
        let body = self
            .send(Method::Get, path, bearer, RequestBody::Empty)
            .await?;
        decode(body)
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        bearer: Option<&str>,
        payload: &impl Serialize,
    ) -> Result<T, ApiError> {
        let body = self
            .send(Method::Post, path, bearer, json_body(payload)?)
            .await?;
        decode(body)
    }

    pub async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        bearer: Option<&str>,
        payload: &impl Serialize,
    ) -> Result<T, ApiError> {
        let body = self
            .send(Method::Patch, path, bearer, json_body(payload)?)
            .await?;
        decode(body)
    }

    pub async fn delete(&self, path: &str, bearer: Option<&str>) -> Result<(), ApiError> {
        self.send(Method::Delete, path, bearer, RequestBody::Empty)
            .await?;
        Ok(())
    }

    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        bearer: Option<&str>,
        file: FilePayload,
    ) -> Result<T, ApiError> {
        let body = self
            .send(Method::Post, path, bearer, RequestBody::Multipart(file))
            .await?;
        decode(body)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        bearer: Option<&str>,
        body: RequestBody,
    ) -> Result<Option<Value>, ApiError> {
        self.transport
            .execute(ApiRequest {
                method,
                path: path.to_string(),
                bearer: bearer.map(str::to_string),
                body,
            })
            .await
    }
}

fn json_body(payload: &impl Serialize) -> Result<RequestBody, ApiError> {
    serde_json::to_value(payload)
        .map(RequestBody::Json)
        .map_err(|err| ApiError::Decode(err.to_string()))
}

fn decode<T: DeserializeOwned>(body: Option<Value>) -> Result<T, ApiError> {
    let value = body.ok_or_else(|| ApiError::Decode("server returned an empty response".into()))?;
    serde_json::from_value(value).map_err(|err| ApiError::Decode(err.to_string()))
}

pub mod mock {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    /// In-memory transport with a scripted response queue and a request log.
    /// An exhausted queue answers with an empty body.
    #[derive(Default)]
    pub struct MockTransport {
        requests: Mutex<Vec<ApiRequest>>,
        responses: Mutex<VecDeque<Result<Option<Value>, ApiError>>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn enqueue_json(&self, value: Value) {
            self.responses.lock().push_back(Ok(Some(value)));
        }

        pub fn enqueue_empty(&self) {
            self.responses.lock().push_back(Ok(None));
        }

        pub fn enqueue_error(&self, error: ApiError) {
            self.responses.lock().push_back(Err(error));
        }

        pub fn requests(&self) -> Vec<ApiRequest> {
            self.requests.lock().clone()
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().len()
        }
    }

    #[async_trait]
    impl ApiTransport for MockTransport {
        async fn execute(&self, request: ApiRequest) -> Result<Option<Value>, ApiError> {
            self.requests.lock().push(request);
            self.responses.lock().pop_front().unwrap_or(Ok(None))
        }
    }
}
