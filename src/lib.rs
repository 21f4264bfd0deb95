//! Icescout - Catalog Migration Readiness Assessment
//!
//! Assesses how ready the tables in a remote metadata catalog are for
//! migration to an Iceberg-based lakehouse. The engine enumerates every
//! database and table through a paginated catalog client, classifies each
//! table's storage format and readiness, and renders the result as a
//! markdown report, a JSON report, or both.
//!
//! The typical flow:
//!
//! ```no_run
//! use icescout::assess::CatalogAssessor;
//! use icescout::catalog::HttpCatalog;
//! use icescout::report;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let client = HttpCatalog::for_region(reqwest::Client::new(), "us-east-1");
//! let assessor = CatalogAssessor::new(client, "us-east-1", "123456789012");
//!
//! let result = assessor.run().await?;
//! let markdown = report::generate_markdown_report(&result);
//! let json = report::generate_json_report(&result)?;
//! # Ok(())
//! # }
//! ```
//!
//! Credential resolution and command-line handling belong to the caller;
//! the engine takes an already-authorized client and returns data.

pub mod analysis;
pub mod assess;
pub mod catalog;
pub mod classify;
pub mod config;
pub mod discovery;
pub mod error;
pub mod models;
pub mod report;

pub use assess::CatalogAssessor;
pub use config::Config;
pub use error::{AssessError, CatalogError};
pub use models::{AssessmentReport, AssessmentSummary, RunStatus, TableAssessment};

use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging for embedding binaries.
///
/// Respects `RUST_LOG` when set, defaulting to `info`. Callers that manage
/// their own subscriber should skip this.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    // Ignore the error if a subscriber is already installed.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Version of the assessment engine.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
