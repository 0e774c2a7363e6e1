use log::debug;
use reqwest::Method;
use serde::Serialize;

use crate::auth::{bearer_value, mask_secret};
use crate::error::Result;

pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(serde_json::Value),
    /// Sent verbatim. Used when a value must keep a pre-escaped `\u` sequence
    /// (a literal slash in an owner name, say) that JSON encoding would undo.
    Raw(String),
}

impl RequestBody {
    pub fn encode(&self) -> Result<String> {
        match self {
            RequestBody::Json(value) => Ok(serde_json::to_string(value)?),
            RequestBody::Raw(text) => Ok(text.clone()),
        }
    }
}

/// One call against the API, relative to the client's base URL.
///
/// The same descriptor is replayed unchanged if the first attempt has to
/// refresh the session.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    pub content_type: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            content_type: Some(JSON_CONTENT_TYPE.to_string()),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn query_pairs<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn json<T: Serialize + ?Sized>(mut self, payload: &T) -> Result<Self> {
        self.body = Some(RequestBody::Json(serde_json::to_value(payload)?));
        Ok(self)
    }

    pub fn raw(mut self, payload: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Raw(payload.into()));
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn without_content_type(mut self) -> Self {
        self.content_type = None;
        self
    }

    /// Logs the outgoing request the way it goes on the wire, with the bearer token masked.
    pub fn log(&self, url: &str, access_token: &str, user_agent: &str) {
        let full_url = if self.query.is_empty() {
            url.to_string()
        } else {
            let query_string = self
                .query
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("&");
            format!("{}?{}", url, query_string)
        };

        debug!("> {} {}", self.method, full_url);
        debug!("> Accept: {}", JSON_CONTENT_TYPE);
        debug!("> Authorization: {}", mask_secret(&bearer_value(access_token)));
        debug!("> User-Agent: {}", user_agent);
        if let Some(content_type) = &self.content_type {
            debug!("> Content-Type: {}", content_type);
        }

        match &self.body {
            Some(RequestBody::Json(value)) => {
                let rendered =
                    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
                for line in rendered.lines() {
                    debug!("> {}", line);
                }
            }
            Some(RequestBody::Raw(text)) => debug!("> {}", text),
            None => {}
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
