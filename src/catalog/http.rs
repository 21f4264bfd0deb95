//! HTTP implementation of the catalog client.
//!
//! Talks to a Glue-compatible JSON endpoint (`x-amz-json-1.1` target
//! protocol). Credential resolution is not handled here: the caller hands
//! over a `reqwest::Client` that is already authorized (signing middleware,
//! proxy, or an unauthenticated endpoint for local testing).

use crate::catalog::{CatalogClient, Page, RawDatabase, RawTable};
use crate::error::CatalogError;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const TARGET_GET_DATABASES: &str = "AWSGlue.GetDatabases";
const TARGET_GET_TABLES: &str = "AWSGlue.GetTables";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Catalog client over a Glue-style JSON HTTP API.
pub struct HttpCatalog {
    client: reqwest::Client,
    endpoint: String,
    page_size: Option<u32>,
    request_timeout: Duration,
}

impl HttpCatalog {
    /// Create a client against an explicit endpoint URL.
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            page_size: None,
            request_timeout: default_timeout(),
        }
    }

    /// Create a client for the well-known regional endpoint.
    pub fn for_region(client: reqwest::Client, region: &str) -> Self {
        Self::new(client, format!("https://glue.{}.amazonaws.com", region))
    }

    /// Override the per-call request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Request a specific page size instead of the server default.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    async fn call<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        target: &str,
        request: &Req,
    ) -> Result<Resp, CatalogError> {
        debug!("catalog call: {}", target);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", CONTENT_TYPE)
            .header("X-Amz-Target", target)
            .timeout(self.request_timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CatalogError::Network(format!(
                        "request timed out after {}s",
                        self.request_timeout.as_secs()
                    ))
                } else if e.is_connect() {
                    CatalogError::Network(format!("cannot connect to {}", self.endpoint))
                } else {
                    CatalogError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_http_failure(status.as_u16(), &body));
        }

        response
            .json::<Resp>()
            .await
            .map_err(|e| CatalogError::Malformed(e.to_string()))
    }
}

/// Map a non-success HTTP response onto the error taxonomy.
///
/// The Glue protocol reports most errors as HTTP 400 with a `__type`
/// discriminator in the body, so the body is inspected alongside the
/// status code.
fn classify_http_failure(status: u16, body: &str) -> CatalogError {
    if status == 429 || body.contains("ThrottlingException") {
        return CatalogError::Throttled(format!("status {}", status));
    }
    if status == 403 || body.contains("AccessDeniedException") {
        return CatalogError::AccessDenied(format!("status {}", status));
    }
    if body.contains("EntityNotFoundException") {
        return CatalogError::Malformed(format!("entity not found: {}", body));
    }
    CatalogError::Api {
        status,
        message: body.chars().take(300).collect(),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct GetDatabasesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    next_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_results: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetDatabasesResponse {
    #[serde(default)]
    database_list: Vec<RawDatabase>,
    #[serde(default)]
    next_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct GetTablesRequest {
    database_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_results: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetTablesResponse {
    #[serde(default)]
    table_list: Vec<RawTable>,
    #[serde(default)]
    next_token: Option<String>,
}

impl CatalogClient for HttpCatalog {
    async fn list_databases(
        &self,
        next_token: Option<String>,
    ) -> Result<Page<RawDatabase>, CatalogError> {
        let request = GetDatabasesRequest {
            next_token,
            max_results: self.page_size,
        };
        let response: GetDatabasesResponse = self.call(TARGET_GET_DATABASES, &request).await?;
        Ok(Page {
            items: response.database_list,
            next_token: response.next_token,
        })
    }

    async fn list_tables(
        &self,
        database: &str,
        next_token: Option<String>,
    ) -> Result<Page<RawTable>, CatalogError> {
        let request = GetTablesRequest {
            database_name: database.to_string(),
            next_token,
            max_results: self.page_size,
        };
        let response: GetTablesResponse = self.call(TARGET_GET_TABLES, &request).await?;
        Ok(Page {
            items: response.table_list,
            next_token: response.next_token,
        })
    }
}
