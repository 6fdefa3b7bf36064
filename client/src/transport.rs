//! HTTP transport abstraction and its reqwest implementation.

use crate::error::FetchError;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

pub use reqwest::Method;

/// A file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// Original file name.
    pub name: String,
    /// MIME type, if known.
    pub content_type: Option<String>,
    /// File contents.
    pub data: Vec<u8>,
}

impl UploadFile {
    /// A file with unknown content type.
    #[must_use]
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            data: data.into(),
        }
    }

    /// Set the MIME type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Request payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// Raw text.
    Text(String),
    /// JSON document.
    Json(Value),
    /// `multipart/form-data`, one part per `(field name, file)`.
    Multipart(Vec<(String, UploadFile)>),
}

/// A single outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL, or a path resolved by the transport.
    pub url: String,
    /// Extra headers.
    pub headers: Vec<(String, String)>,
    /// Payload.
    pub body: RequestBody,
}

/// A received response with its body fully read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Reason phrase for the status.
    pub status_text: String,
    /// Raw body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// A response with the canonical reason phrase for `status`.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        let status_text = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or_default()
            .to_string();
        Self {
            status,
            status_text,
            body: body.into(),
        }
    }

    /// Override the reason phrase.
    #[must_use]
    pub fn with_status_text(mut self, status_text: impl Into<String>) -> Self {
        self.status_text = status_text.into();
        self
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the decoder error if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Sends requests on behalf of the request lifecycle.
///
/// Implementations only fail for transport-level problems; HTTP error statuses
/// are returned as ordinary responses.
pub trait Transport: Send + Sync {
    /// Send `request` and read the whole response.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] if no response was received.
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, FetchError>> + Send;
}

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    /// A transport with a default client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing client.
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Resolve relative request URLs against `base_url`.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    /// Abort requests that take longer than `timeout` end to end.
    ///
    /// The deadline is applied to each request, so it holds whether it is set
    /// before or after [`with_client`](Self::with_client).
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn resolve(&self, url: &str) -> String {
        match &self.base_url {
            Some(base) if url.starts_with('/') => format!("{base}{url}"),
            _ => url.to_string(),
        }
    }
}

fn multipart_form(parts: Vec<(String, UploadFile)>) -> Result<Form, FetchError> {
    let mut form = Form::new();
    for (field, file) in parts {
        let mut part = Part::bytes(file.data).file_name(file.name);
        if let Some(content_type) = &file.content_type {
            part = part
                .mime_str(content_type)
                .map_err(|e| FetchError::Rejected(format!("invalid content type: {e}")))?;
        }
        form = form.part(field, part);
    }
    Ok(form)
}

impl Transport for ReqwestTransport {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, FetchError>> + Send {
        let client = self.client.clone();
        let url = self.resolve(&request.url);
        let timeout = self.timeout;

        async move {
            let mut builder = client.request(request.method.clone(), &url);
            if let Some(timeout) = timeout {
                builder = builder.timeout(timeout);
            }
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }

            builder = match request.body {
                RequestBody::Empty => builder,
                RequestBody::Text(text) => builder.body(text),
                RequestBody::Json(value) => builder.json(&value),
                RequestBody::Multipart(parts) => builder.multipart(multipart_form(parts)?),
            };

            tracing::debug!(method = %request.method, url = %url, "sending request");
            let response = builder.send().await?;

            let status = response.status();
            let status_text = status.canonical_reason().unwrap_or_default().to_string();
            let body = response.bytes().await?.to_vec();

            Ok(HttpResponse {
                status: status.as_u16(),
                status_text,
                body,
            })
        }
    }
}
