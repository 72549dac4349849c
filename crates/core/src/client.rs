//! REST client for the portal API.
//!
//! Every call attaches the session token verbatim in the `Authorization` header and decodes
//! a JSON response. Failures are normalised into [`ApiError`]:
//!
//! - connection failures become the "check your internet connection" message
//! - timeouts become "Request timeout, try again."
//! - error responses carrying `{status, message}` keep those values
//! - anything else becomes "Something went wrong."
//!
//! Calls are never retried.

use crate::config::PortalConfig;
use crate::error::ApiError;
use crate::{PortalError, PortalResult};
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

const UPLOAD_CHUNK_BYTES: usize = 64 * 1024;

/// Upload progress as reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    pub sent: u64,
    pub total: u64,
    pub percent: u8,
}

impl UploadProgress {
    fn new(sent: u64, total: u64) -> Self {
        let percent = if total == 0 {
            100
        } else {
            ((sent.min(total) * 100 + total / 2) / total) as u8
        };
        Self {
            sent,
            total,
            percent,
        }
    }
}

pub type ProgressFn = Arc<dyn Fn(UploadProgress) + Send + Sync>;

/// A file attached to a multipart upload.
#[derive(Clone)]
pub struct UploadFile {
    pub field: String,
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(field: impl Into<String>, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            field: field.into(),
            file_name: file_name.into(),
            mime: None,
            bytes,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    /// Reads `path` into memory. The mime type is guessed from the extension for common
    /// image formats.
    pub fn from_path(field: impl Into<String>, path: &Path) -> PortalResult<Self> {
        let bytes = std::fs::read(path).map_err(PortalError::FileRead)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let mime = match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("png") => Some("image/png"),
            Some("jpg" | "jpeg") => Some("image/jpeg"),
            Some("webp") => Some("image/webp"),
            Some("gif") => Some("image/gif"),
            _ => None,
        };

        let file = Self::new(field, file_name, bytes);
        Ok(match mime {
            Some(mime) => file.with_mime(mime),
            None => file,
        })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadFile")
            .field("field", &self.field)
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &PortalConfig) -> PortalResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent())
            .build()
            .map_err(|e| PortalError::InvalidInput(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url().clone(),
            token: None,
        })
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> PortalResult<T> {
        let request = self.request(Method::GET, path)?.query(params);
        self.execute(Method::GET, path, request).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> PortalResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path)?.json(body);
        self.execute(Method::POST, path, request).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> PortalResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::PUT, path)?.json(body);
        self.execute(Method::PUT, path, request).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> PortalResult<T> {
        let request = self.request(Method::DELETE, path)?.query(params);
        self.execute(Method::DELETE, path, request).await
    }

    /// Posts `file` and the text `fields` as `multipart/form-data`.
    ///
    /// `progress` is called as the file body is consumed by the transport.
    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        file: UploadFile,
        fields: &[(&str, String)],
        progress: Option<ProgressFn>,
    ) -> PortalResult<T> {
        let total = file.bytes.len() as u64;
        let chunks: Vec<Vec<u8>> = file
            .bytes
            .chunks(UPLOAD_CHUNK_BYTES)
            .map(<[u8]>::to_vec)
            .collect();

        let mut sent = 0u64;
        let stream = futures::stream::iter(chunks.into_iter().map(move |chunk| {
            sent += chunk.len() as u64;
            if let Some(report) = &progress {
                report(UploadProgress::new(sent, total));
            }
            Ok::<_, std::io::Error>(chunk)
        }));

        let mut part = Part::stream_with_length(Body::wrap_stream(stream), total)
            .file_name(file.file_name);
        if let Some(mime) = &file.mime {
            part = part
                .mime_str(mime)
                .map_err(|e| PortalError::InvalidInput(format!("invalid mime type '{mime}': {e}")))?;
        }

        let form = fields
            .iter()
            .fold(Form::new().part(file.field, part), |form, (name, value)| {
                form.text(name.to_string(), value.clone())
            });

        let request = self.request(Method::POST, path)?.multipart(form);
        self.execute(Method::POST, path, request).await
    }

    fn request(&self, method: Method, path: &str) -> PortalResult<RequestBuilder> {
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| PortalError::InvalidInput(format!("invalid endpoint path '{path}': {e}")))?;

        let request = self.http.request(method, url);
        Ok(match &self.token {
            Some(token) => request.header(AUTHORIZATION, token),
            None => request,
        })
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        request: RequestBuilder,
    ) -> PortalResult<T> {
        tracing::debug!(%method, path, "api request");

        let result = match request.send().await {
            Ok(response) => decode(response).await,
            Err(err) => Err(normalise_transport_error(&err)),
        };

        result.map_err(|err| {
            tracing::warn!(%method, path, status = %err.status, message = %err.message, "api request failed");
            PortalError::Api(err)
        })
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|err| normalise_transport_error(&err))?;

    if status.is_success() {
        return serde_json::from_slice(&body).map_err(|err| {
            tracing::debug!(error = %err, "unexpected response body");
            ApiError::generic()
        });
    }

    Err(serde_json::from_slice::<ApiError>(&body).unwrap_or_else(|_| ApiError::generic()))
}

fn normalise_transport_error(err: &reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::timeout()
    } else if err.is_connect() {
        ApiError::network()
    } else {
        ApiError::generic()
    }
}
