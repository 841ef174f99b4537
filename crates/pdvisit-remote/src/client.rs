//! HTTP client for the hosted database's REST surface.
//!
//! Speaks the PostgREST dialect exposed under `<base>/rest/v1/`: filters are
//! query parameters (`column=eq.value`), inserts are JSON arrays, and counts
//! come back in the `Content-Range` header. Every call is a direct
//! pass-through: no retries, no request timeout.

use std::time::Duration;

use pdvisit_core::{AppConfig, IdentifierCode, LookupMatch};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE};
use reqwest::{Client, Response, Url};

use crate::error::RemoteError;
use crate::types::VisitRow;

const REST_PATH: &str = "rest/v1/";

/// Endpoint, key and table layout for a [`RemoteClient`].
#[derive(Clone)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_key: String,
    pub user_agent: String,
    pub visit_table: String,
    pub lookup_table: String,
    pub lookup_key_column: String,
    pub lookup_name_column: String,
}

impl RemoteConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.remote_url.clone(),
            api_key: config.remote_key.clone(),
            user_agent: config.user_agent.clone(),
            visit_table: config.visit_table.clone(),
            lookup_table: config.lookup_table.clone(),
            lookup_key_column: config.lookup_key_column.clone(),
            lookup_name_column: config.lookup_name_column.clone(),
        }
    }
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[redacted]")
            .field("user_agent", &self.user_agent)
            .field("visit_table", &self.visit_table)
            .field("lookup_table", &self.lookup_table)
            .field("lookup_key_column", &self.lookup_key_column)
            .field("lookup_name_column", &self.lookup_name_column)
            .finish()
    }
}

/// Long-lived handle to the hosted database.
///
/// Construct once and share (typically behind an `Arc`); the inner
/// `reqwest::Client` pools connections.
pub struct RemoteClient {
    client: Client,
    rest_base: Url,
    config: RemoteConfig,
}

impl RemoteClient {
    /// Builds the client and its authentication headers.
    ///
    /// # Errors
    ///
    /// - [`RemoteError::InvalidBaseUrl`] if `base_url` does not parse.
    /// - [`RemoteError::InvalidApiKey`] if the key cannot be sent as a header.
    /// - [`RemoteError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(config: RemoteConfig) -> Result<Self, RemoteError> {
        // Exactly one trailing slash, so joining `rest/v1/` appends rather
        // than replacing the last path segment.
        let normalised = format!("{}/", config.base_url.trim_end_matches('/'));
        let rest_base = Url::parse(&normalised)
            .and_then(|u| u.join(REST_PATH))
            .map_err(|e| RemoteError::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: e.to_string(),
            })?;

        let mut key =
            HeaderValue::from_str(&config.api_key).map_err(|_| RemoteError::InvalidApiKey)?;
        key.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| RemoteError::InvalidApiKey)?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            rest_base,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    /// Resolves the display name for `code` in the lookup table.
    ///
    /// Returns `Ok(None)` when no row matches, or when the matching row has
    /// no usable name.
    ///
    /// # Errors
    ///
    /// - [`RemoteError::Http`] on network failure.
    /// - [`RemoteError::Status`] on a non-2xx answer.
    /// - [`RemoteError::Deserialize`] if the body is not a JSON array of rows.
    pub async fn lookup_name(
        &self,
        code: &IdentifierCode,
        mode: LookupMatch,
    ) -> Result<Option<String>, RemoteError> {
        let url = self.lookup_url(code, mode);
        tracing::debug!(code = %code, %mode, "looking up display name");

        let response = self.client.get(url).send().await?;
        let body = Self::success_body(response).await?;

        let rows: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_str(&body)
            .map_err(|e| RemoteError::Deserialize {
                context: format!("lookup {}={code}", self.config.lookup_key_column),
                source: e,
            })?;

        let name = rows.into_iter().next().and_then(|mut row| {
            match row.remove(&self.config.lookup_name_column) {
                Some(serde_json::Value::String(name)) if !name.trim().is_empty() => Some(name),
                other => {
                    tracing::debug!(code = %code, value = ?other, "lookup row has no usable name");
                    None
                }
            }
        });
        Ok(name)
    }

    /// Inserts one visit row.
    ///
    /// # Errors
    ///
    /// - [`RemoteError::Http`] on network failure.
    /// - [`RemoteError::Status`] if the remote rejects the row.
    pub async fn insert_visit(&self, row: &VisitRow) -> Result<(), RemoteError> {
        let url = self.table_url(&self.config.visit_table);
        let response = self
            .client
            .post(url)
            .header("Prefer", "return=minimal")
            .json(&[row])
            .send()
            .await?;
        Self::success_body(response).await?;
        tracing::info!(
            route = %row.route,
            identifier = %row.identifier,
            "visit row inserted"
        );
        Ok(())
    }

    /// Count-only reachability check against the visit table.
    ///
    /// Returns the exact row count when the remote reports one.
    ///
    /// # Errors
    ///
    /// - [`RemoteError::Http`] if the remote cannot be reached.
    /// - [`RemoteError::Status`] if it answers with an error status.
    pub async fn probe(&self) -> Result<Option<u64>, RemoteError> {
        let mut url = self.table_url(&self.config.visit_table);
        url.query_pairs_mut().append_pair("select", "count");

        let response = self
            .client
            .head(url)
            .header("Prefer", "count=exact")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body: String::new(),
            });
        }

        let count = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total);
        tracing::debug!(?count, "probe succeeded");
        Ok(count)
    }

    fn table_url(&self, table: &str) -> Url {
        let mut url = self.rest_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(table);
        }
        url
    }

    fn lookup_url(&self, code: &IdentifierCode, mode: LookupMatch) -> Url {
        let filter = match mode {
            LookupMatch::Exact => format!("eq.{code}"),
            LookupMatch::Pattern => format!("like.*{code}*"),
        };
        let mut url = self.table_url(&self.config.lookup_table);
        url.query_pairs_mut()
            .append_pair("select", &self.config.lookup_name_column)
            .append_pair(&self.config.lookup_key_column, &filter)
            .append_pair("limit", "1");
        url
    }

    /// Returns the body of a 2xx response, or [`RemoteError::Status`] with
    /// whatever body the remote sent.
    async fn success_body(response: Response) -> Result<String, RemoteError> {
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// Extracts the total from a `Content-Range` value such as `0-24/3573` or
/// `*/42`. An unknown total (`*/*`) yields `None`.
fn parse_content_range_total(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
