use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::{Client, Response, multipart};
use reqwest::header::ACCEPT;
use reqwest::{Method, Url};
use serde_json::Value;
use thiserror::Error;

pub type JsonMap = serde_json::Map<String, Value>;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Structured non-success response from the API. `body` is present only when
/// the response body decoded as a JSON object; `raw` always holds the body
/// text as received.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: u16,
    pub body: Option<JsonMap>,
    pub raw: String,
}

impl ApiError {
    /// Human-readable message: the body's `message` field when it is a
    /// non-empty string, else the raw body text, else a status fallback.
    pub fn message(&self) -> String {
        if let Some(body) = &self.body
            && let Some(Value::String(message)) = body.get("message")
            && !message.is_empty()
        {
            return message.clone();
        }
        if !self.raw.is_empty() {
            return self.raw.clone();
        }
        format!("request failed with status {}", self.status)
    }

    /// Machine-readable code from the body's `error_code` field, when present.
    pub fn error_code(&self) -> Option<&str> {
        match self.body.as_ref()?.get("error_code") {
            Some(Value::String(code)) if !code.is_empty() => Some(code),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

/// Failure surface of a single API round trip.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The API answered with a status of 400 or above.
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("invalid base URL {url:?}: {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    /// The request never produced a usable response: connect, TLS, timeout.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// A success status carried a body that was not a JSON object.
    #[error("failed to decode response with status {status} as a JSON object: {source}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to read {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A success response decoded fine but lacked the expected structure.
    #[error("{0}")]
    UnexpectedResponse(String),
}

/// Seam between command logic and the HTTP transport. Paths are given
/// relative to the API base URL and may carry a query string.
pub trait ContentApi {
    fn get(&mut self, path: &str) -> Result<JsonMap, ClientError>;
    fn post(&mut self, path: &str, payload: &Value) -> Result<JsonMap, ClientError>;
    fn put(&mut self, path: &str, payload: &Value) -> Result<JsonMap, ClientError>;
    fn delete(&mut self, path: &str) -> Result<JsonMap, ClientError>;
}

#[derive(Debug)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    access_token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, access_token: &str) -> Result<Self, ClientError> {
        let trimmed = base_url.trim_end_matches('/');
        let base_url = Url::parse(trimmed).map_err(|source| ClientError::BaseUrl {
            url: trimmed.to_string(),
            source,
        })?;
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("geda-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let access_token = if access_token.is_empty() {
            None
        } else {
            Some(access_token.to_string())
        };
        Ok(Self {
            http,
            base_url,
            access_token,
        })
    }

    /// Joins `path` onto the base URL's path, keeping any query string on
    /// `path` verbatim. A base URL mounted under a prefix keeps the prefix.
    fn endpoint_url(&self, path: &str) -> Url {
        let (endpoint, query) = match path.split_once('?') {
            Some((endpoint, query)) => (endpoint, Some(query)),
            None => (path, None),
        };
        let mut url = self.base_url.clone();
        let joined = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );
        url.set_path(&joined);
        url.set_query(query);
        url
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        payload: Option<&Value>,
    ) -> Result<JsonMap, ClientError> {
        let mut builder = self
            .http
            .request(method, self.endpoint_url(path))
            .header(ACCEPT, "application/json");
        if let Some(token) = &self.access_token {
            builder = builder.bearer_auth(token);
        }
        if let Some(payload) = payload {
            builder = builder.json(payload);
        }
        decode_response(builder.send()?)
    }

    /// Uploads one file under `file_field` plus auxiliary string form fields
    /// (locale-keyed names such as `alt_text[vi]` pass through untouched).
    pub fn post_multipart_file(
        &mut self,
        path: &str,
        file_field: &str,
        file_path: &Path,
        fields: &[(String, String)],
    ) -> Result<JsonMap, ClientError> {
        let mut form = multipart::Form::new();
        for (name, value) in fields {
            form = form.text(name.clone(), value.clone());
        }
        let form = form
            .file(file_field.to_string(), file_path)
            .map_err(|source| ClientError::File {
                path: file_path.to_path_buf(),
                source,
            })?;
        let mut builder = self
            .http
            .post(self.endpoint_url(path))
            .header(ACCEPT, "application/json")
            .multipart(form);
        if let Some(token) = &self.access_token {
            builder = builder.bearer_auth(token);
        }
        decode_response(builder.send()?)
    }
}

impl ContentApi for ApiClient {
    fn get(&mut self, path: &str) -> Result<JsonMap, ClientError> {
        self.request(Method::GET, path, None)
    }

    fn post(&mut self, path: &str, payload: &Value) -> Result<JsonMap, ClientError> {
        self.request(Method::POST, path, Some(payload))
    }

    fn put(&mut self, path: &str, payload: &Value) -> Result<JsonMap, ClientError> {
        self.request(Method::PUT, path, Some(payload))
    }

    fn delete(&mut self, path: &str) -> Result<JsonMap, ClientError> {
        self.request(Method::DELETE, path, None)
    }
}

/// Decode rules, exhaustive over (status, body shape):
/// error status + undecodable body keeps the raw text only; error status +
/// JSON object keeps both; success + undecodable body is a decode failure;
/// success + empty body is an empty object.
fn decode_response(response: Response) -> Result<JsonMap, ClientError> {
    let status = response.status().as_u16();
    let raw = response.text()?;
    let decoded: Result<JsonMap, serde_json::Error> = if raw.is_empty() {
        Ok(JsonMap::new())
    } else {
        serde_json::from_str(&raw)
    };
    if status >= 400 {
        return Err(ClientError::Api(ApiError {
            status,
            body: decoded.ok(),
            raw,
        }));
    }
    decoded.map_err(|source| ClientError::Decode { status, source })
}
