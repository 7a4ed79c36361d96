//! Backend API: request types, the [`Backend`] seam and its HTTP client
//!
//! Feature modules describe calls as [`ApiRequest`] values and send them
//! through a `dyn Backend`. [`ApiClient`] is the real one; tests plug in
//! [`crate::testing::FakeBackend`].

mod client;
mod envelope;
mod error;
mod multipart;
mod query;

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use client::ApiClient;
pub use envelope::{Envelope, PageInfo, Paginated};
pub use error::{ApiError, FieldErrors};
pub use multipart::{FileAttachment, MultipartForm, Part};
pub use query::QueryParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(MultipartForm),
}

/// One call against the backend. `path` is relative to the base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: QueryParams,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: QueryParams::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    pub fn json(mut self, body: &impl Serialize) -> Result<Self, ApiError> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    pub fn is_upload(&self) -> bool {
        matches!(self.body, RequestBody::Multipart(_))
    }
}

/// Transport seam between thunks and the network
#[async_trait]
pub trait Backend: Send + Sync {
    /// Send a request and return the decoded JSON body of a 2xx response
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError>;
}

/// Send a request and decode its envelope
pub async fn call<T: DeserializeOwned>(
    backend: &dyn Backend,
    request: ApiRequest,
) -> Result<Envelope<T>, ApiError> {
    let value = backend.send(request).await?;
    Envelope::from_value(value)
}
