//! Remote catalog abstraction.
//!
//! Defines the raw descriptor shapes the remote metadata catalog returns
//! and the [`CatalogClient`] trait the discovery phase drives. The engine
//! never talks to the network directly; it only consumes a client handle
//! the caller resolved (credentials included) ahead of time.

pub mod http;

pub use http::HttpCatalog;

use crate::error::CatalogError;
use serde::Deserialize;
use std::collections::HashMap;
use std::future::Future;

/// One page of a paginated listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Items in this page.
    pub items: Vec<T>,
    /// Continuation token; `None` means the listing is exhausted.
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    /// A page carrying everything, with no continuation.
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_token: None,
        }
    }
}

/// Raw database descriptor as returned by the catalog API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawDatabase {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location_uri: Option<String>,
}

/// Raw table descriptor as returned by the catalog API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawTable {
    pub name: String,
    #[serde(default)]
    pub storage_descriptor: Option<StorageDescriptor>,
    #[serde(default)]
    pub partition_keys: Vec<RawColumn>,
    /// Free-form parameter map (table type markers, size statistics, ...).
    #[serde(default)]
    pub parameters: HashMap<String, String>,
    /// Last-modified time as epoch seconds.
    #[serde(default)]
    pub update_time: Option<f64>,
}

/// Storage metadata block of a raw table descriptor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StorageDescriptor {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub input_format: Option<String>,
    #[serde(default)]
    pub output_format: Option<String>,
    #[serde(default)]
    pub serde_info: Option<SerdeInfo>,
    #[serde(default)]
    pub columns: Vec<RawColumn>,
}

/// Serializer metadata of a raw table descriptor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SerdeInfo {
    #[serde(default)]
    pub serialization_library: Option<String>,
}

/// A column or partition key entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawColumn {
    pub name: String,
    #[serde(default, rename = "Type")]
    pub column_type: Option<String>,
}

/// Paginated query interface of the remote metadata catalog.
///
/// Implementations must be side-effect free from the engine's point of
/// view: the engine never mutates the catalog, it only lists.
pub trait CatalogClient: Sync {
    /// Fetch one page of databases.
    fn list_databases(
        &self,
        next_token: Option<String>,
    ) -> impl Future<Output = Result<Page<RawDatabase>, CatalogError>> + Send;

    /// Fetch one page of tables for a database.
    fn list_tables(
        &self,
        database: &str,
        next_token: Option<String>,
    ) -> impl Future<Output = Result<Page<RawTable>, CatalogError>> + Send;
}
