//! HTTP implementation of [`AdsApi`] against the Facebook Graph API.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::Value;

use super::error::ErrorEnvelope;
use super::{AdsApi, Edge, ExternalParams, GraphError, GraphResult};
use crate::config::{Credentials, GraphConfig};

/// Maximum number of body bytes kept in [`GraphError::Status`].
const MAX_ERROR_BODY: usize = 200;

/// Graph API client authenticated with a bearer access token.
///
/// Constructing a client is the one-time API initialisation step: once a
/// `GraphClient` exists, requests can be issued.
pub struct GraphClient {
    http: reqwest::Client,
    endpoint: String,
    access_token: String,
}

impl GraphClient {
    /// Creates a client for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (e.g. TLS backend
    /// initialisation failure).
    pub fn new(config: &GraphConfig, credentials: &Credentials) -> GraphResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint(),
            access_token: credentials.access_token().to_string(),
        })
    }

    /// The versioned base URL requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .bearer_auth(&self.access_token)
    }

    /// Sends a request and decodes the JSON body.
    async fn execute(&self, request: RequestBuilder, path: &str) -> GraphResult<Value> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            tracing::debug!(path, status = status.as_u16(), "Graph API request succeeded");
            if body.trim().is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_str(&body).map_err(|e| GraphError::Decode {
                message: e.to_string(),
            });
        }

        tracing::debug!(path, status = status.as_u16(), "Graph API request failed");

        if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&body) {
            return Err(GraphError::Api {
                status: status.as_u16(),
                payload: envelope.error,
            });
        }

        if status == StatusCode::NOT_FOUND {
            return Err(GraphError::NotFound {
                path: path.to_string(),
            });
        }

        Err(GraphError::Status {
            status: status.as_u16(),
            body: truncate(&body, MAX_ERROR_BODY),
        })
    }
}

#[async_trait]
impl AdsApi for GraphClient {
    async fn create(&self, parent: &str, edge: Edge, params: &ExternalParams) -> GraphResult<Value> {
        let path = format!("{parent}/{edge}");
        let request = self.request(Method::POST, &path).form(&encode_params(params));
        self.execute(request, &path).await
    }

    async fn list(
        &self,
        parent: &str,
        edge: Edge,
        fields: &[&str],
        params: &ExternalParams,
    ) -> GraphResult<Value> {
        let path = format!("{parent}/{edge}");
        let mut query = encode_params(params);
        if !fields.is_empty() {
            query.push(("fields".to_string(), fields.join(",")));
        }
        let request = self.request(Method::GET, &path).query(&query);
        self.execute(request, &path).await
    }

    async fn read(&self, id: &str, fields: &[&str]) -> GraphResult<Value> {
        let mut request = self.request(Method::GET, id);
        if !fields.is_empty() {
            request = request.query(&[("fields", fields.join(","))]);
        }
        self.execute(request, id).await
    }

    async fn update(&self, id: &str, params: &ExternalParams) -> GraphResult<Value> {
        let request = self.request(Method::POST, id).form(&encode_params(params));
        self.execute(request, id).await
    }

    async fn delete(&self, id: &str) -> GraphResult<Value> {
        let request = self.request(Method::DELETE, id);
        self.execute(request, id).await
    }
}

/// Flattens parameters into Graph form/query pairs.
///
/// Strings are sent verbatim; numbers, booleans, arrays and objects are
/// JSON-encoded, which is how the Graph API expects nested specs such as
/// `targeting` or `special_ad_categories`. `null` values are dropped.
#[must_use]
pub fn encode_params(params: &ExternalParams) -> Vec<(String, String)> {
    params
        .iter()
        .filter_map(|(key, value)| {
            let encoded = match value {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((key.clone(), encoded))
        })
        .collect()
}

fn truncate(body: &str, max: usize) -> String {
    if body.len() <= max {
        return body.to_string();
    }
    let mut end = max;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encode_strings_verbatim_and_nested_as_json() {
        let mut params = ExternalParams::new();
        params.insert("name".to_string(), json!("Spring sale"));
        params.insert("daily_budget".to_string(), json!(1050));
        params.insert("special_ad_categories".to_string(), json!(["HOUSING"]));
        params.insert(
            "targeting".to_string(),
            json!({"geo_locations": {"countries": ["CZ"]}}),
        );
        params.insert("ignored".to_string(), Value::Null);

        let encoded = encode_params(&params);
        assert_eq!(
            encoded,
            vec![
                ("name".to_string(), "Spring sale".to_string()),
                ("daily_budget".to_string(), "1050".to_string()),
                ("special_ad_categories".to_string(), r#"["HOUSING"]"#.to_string()),
                (
                    "targeting".to_string(),
                    r#"{"geo_locations":{"countries":["CZ"]}}"#.to_string()
                ),
            ]
        );
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let body = "ééééé";
        let cut = truncate(body, 3);
        assert!(cut.starts_with('é'));
        assert!(cut.ends_with('…'));
        assert_eq!(truncate("short", 10), "short");
    }
}
