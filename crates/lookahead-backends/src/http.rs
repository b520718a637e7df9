//! HTTP backend: GET `<endpoint>?<param>=<term>` and decode a JSON list of
//! suggestions.
//!
//! Two response shapes are accepted:
//!
//! - a plain array of strings: `["angular", "angularjs"]`
//! - the OpenSearch suggestion shape: `["ang", ["angular", "angularjs"], ...]`
//!
//! Only plain `http://` endpoints are supported; there is no TLS connector.

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use lookahead_core::{QueryBackend, QueryError};
use serde_json::Value;
use url::Url;

const DEFAULT_PARAM: &str = "q";

#[derive(Clone)]
pub struct HttpBackend {
    client: Client<HttpConnector, Empty<Bytes>>,
    endpoint: Url,
    param: String,
}

impl HttpBackend {
    pub fn new(endpoint: &str) -> Result<Self, url::ParseError> {
        let endpoint = Url::parse(endpoint)?;
        let client = Client::builder(TokioExecutor::new()).build_http();
        Ok(Self {
            client,
            endpoint,
            param: DEFAULT_PARAM.to_string(),
        })
    }

    /// Name of the query-string parameter that carries the term.
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = param.into();
        self
    }

    /// Full request URL for `term`, with the term percent-encoded.
    pub fn request_url(&self, term: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair(&self.param, term);
        url
    }
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("endpoint", &self.endpoint.as_str())
            .field("param", &self.param)
            .finish()
    }
}

#[async_trait]
impl QueryBackend for HttpBackend {
    async fn search(&self, term: &str) -> Result<Vec<String>, QueryError> {
        let url = self.request_url(term);
        let uri = url
            .as_str()
            .parse::<hyper::Uri>()
            .map_err(|e| QueryError::Transport(e.to_string()))?;

        tracing::debug!(%uri, "http: sending query");
        let response = self
            .client
            .get(uri)
            .await
            .map_err(|e| QueryError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(QueryError::Status(status.as_u16()));
        }

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| QueryError::Transport(e.to_string()))?
            .to_bytes();

        decode_suggestions(&body)
    }
}

/// Decode either accepted response shape into a list of suggestions.
pub fn decode_suggestions(body: &[u8]) -> Result<Vec<String>, QueryError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| QueryError::Decode(e.to_string()))?;

    let Value::Array(items) = value else {
        return Err(QueryError::Decode("expected a JSON array".to_string()));
    };

    if let Some(strings) = all_strings(&items) {
        return Ok(strings);
    }

    // OpenSearch: [query, [suggestions], [descriptions]?, [urls]?]
    match items.get(1) {
        Some(Value::Array(suggestions)) => all_strings(suggestions).ok_or_else(|| {
            QueryError::Decode("suggestion list contains non-string values".to_string())
        }),
        _ => Err(QueryError::Decode(
            "expected an array of strings or an OpenSearch suggestion array".to_string(),
        )),
    }
}

fn all_strings(values: &[Value]) -> Option<Vec<String>> {
    values
        .iter()
        .map(|v| v.as_str().map(str::to_owned))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
