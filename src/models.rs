//! Data models for the catalog assessment engine.
//!
//! This module contains all the core data structures used throughout
//! the crate for representing databases, table assessments, and reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage format of a table, as inferred from catalog metadata.
///
/// This is a closed set: every recognized format gets its own variant so
/// that readiness rules stay exhaustively checked when a format is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TableFormat {
    /// Apache Iceberg - the migration target format
    Iceberg,
    /// Apache Parquet (Hive-style table)
    Parquet,
    /// Apache ORC
    Orc,
    /// Apache Avro
    Avro,
    /// CSV / delimited text
    Csv,
    /// Format could not be determined from catalog metadata
    Unknown,
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableFormat::Iceberg => write!(f, "ICEBERG"),
            TableFormat::Parquet => write!(f, "PARQUET"),
            TableFormat::Orc => write!(f, "ORC"),
            TableFormat::Avro => write!(f, "AVRO"),
            TableFormat::Csv => write!(f, "CSV"),
            TableFormat::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl TableFormat {
    /// Whether this is a recognized (non-UNKNOWN) format.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, TableFormat::Unknown)
    }

    /// Readiness implied by this format when the storage location checks out.
    ///
    /// Callers must downgrade to [`MigrationReadiness::Unknown`] themselves
    /// when the location is missing or malformed.
    pub fn implied_readiness(&self) -> MigrationReadiness {
        match self {
            TableFormat::Iceberg => MigrationReadiness::Ready,
            TableFormat::Parquet | TableFormat::Orc | TableFormat::Avro | TableFormat::Csv => {
                MigrationReadiness::NeedsConversion
            }
            TableFormat::Unknown => MigrationReadiness::Unknown,
        }
    }
}

/// Migration readiness verdict for a single table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MigrationReadiness {
    /// Already Iceberg with a usable storage location
    Ready,
    /// Recognized non-Iceberg format; requires conversion
    NeedsConversion,
    /// Could not be classified
    Unknown,
}

impl fmt::Display for MigrationReadiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationReadiness::Ready => write!(f, "READY"),
            MigrationReadiness::NeedsConversion => write!(f, "NEEDS_CONVERSION"),
            MigrationReadiness::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// A database discovered in the remote catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseDescriptor {
    /// Database name (unique within a run).
    pub name: String,
    /// Optional free-text description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional default storage location URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_uri: Option<String>,
    /// Number of tables actually enumerated for this database.
    ///
    /// Always recomputed from the enumerated tables; any count the remote
    /// catalog reports for itself is treated as informational only.
    pub table_count: usize,
}

/// Migration readiness assessment for one table.
///
/// Created exactly once per discovered table by the classifier and never
/// mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableAssessment {
    /// Name of the containing database.
    pub database_name: String,
    /// Table name (unique per database).
    pub table_name: String,
    /// Inferred storage format.
    pub format: TableFormat,
    /// Storage location URI (may be empty when the catalog omits it).
    pub storage_location: String,
    /// Estimated size in GB from catalog statistics.
    ///
    /// `None` means the catalog exposed no size statistics; absence is
    /// distinct from zero and survives both output formats.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_size_gb: Option<f64>,
    /// Partition key names, in declared partitioning order.
    pub partition_keys: Vec<String>,
    /// Number of (non-partition) columns.
    pub column_count: usize,
    /// Last update timestamp, when the catalog reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    /// Whether the table is Iceberg. Derived from `format`; the two must
    /// always agree.
    pub is_iceberg: bool,
    /// Migration readiness verdict.
    pub migration_readiness: MigrationReadiness,
    /// Diagnostic notes appended during classification.
    pub notes: Vec<String>,
}

/// A database or table that could not be read during discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFailure {
    /// Database the failure belongs to.
    pub database: String,
    /// Affected table, when the failure was table-scoped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    /// Human-readable failure reason.
    pub reason: String,
}

impl fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{}.{}: {}", self.database, table, self.reason),
            None => write!(f, "{}: {}", self.database, self.reason),
        }
    }
}

/// How a run ended.
///
/// Carried inside the report so the structured output is self-describing:
/// a run with item-level failures can never masquerade as a clean one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunStatus {
    /// Every database and table was enumerated successfully.
    Complete,
    /// The run finished, but some items were degraded.
    Partial { failures: Vec<ItemFailure> },
    /// Discovery was cut short; the report holds partial results.
    Aborted {
        cause: String,
        failures: Vec<ItemFailure>,
    },
}

impl RunStatus {
    /// Build a status from the gathered failures and optional abort cause.
    pub fn from_run(failures: Vec<ItemFailure>, abort_cause: Option<String>) -> Self {
        match abort_cause {
            Some(cause) => RunStatus::Aborted { cause, failures },
            None if failures.is_empty() => RunStatus::Complete,
            None => RunStatus::Partial { failures },
        }
    }

    /// Whether at least one item was degraded or the run was cut short.
    pub fn is_degraded(&self) -> bool {
        !matches!(self, RunStatus::Complete)
    }

    /// The recorded item-level failures.
    pub fn failures(&self) -> &[ItemFailure] {
        match self {
            RunStatus::Complete => &[],
            RunStatus::Partial { failures } => failures,
            RunStatus::Aborted { failures, .. } => failures,
        }
    }
}

/// Aggregate counts for a run, computed once and shared by both renderers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentSummary {
    /// Number of databases enumerated.
    pub total_databases: usize,
    /// Number of tables assessed.
    pub total_tables: usize,
    /// Tables in Iceberg format.
    pub iceberg_tables: usize,
    /// Tables classified READY.
    pub migration_ready: usize,
    /// Tables classified NEEDS_CONVERSION.
    pub needs_conversion: usize,
    /// Tables classified UNKNOWN.
    pub unknown: usize,
    /// Sum of known size estimates in GB. Tables without a size estimate
    /// are excluded from the sum, not treated as zero.
    pub total_estimated_size_gb: f64,
}

impl AssessmentSummary {
    /// Compute a summary from the enumerated databases and assessments.
    pub fn from_parts(total_databases: usize, tables: &[TableAssessment]) -> Self {
        let mut summary = Self {
            total_databases,
            total_tables: tables.len(),
            ..Self::default()
        };

        for table in tables {
            if table.is_iceberg {
                summary.iceberg_tables += 1;
            }
            match table.migration_readiness {
                MigrationReadiness::Ready => summary.migration_ready += 1,
                MigrationReadiness::NeedsConversion => summary.needs_conversion += 1,
                MigrationReadiness::Unknown => summary.unknown += 1,
            }
            if let Some(size) = table.estimated_size_gb {
                summary.total_estimated_size_gb += size;
            }
        }

        summary
    }
}

/// Metadata about an assessment run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentMetadata {
    /// When the run started.
    pub timestamp: DateTime<Utc>,
    /// Target region of the remote catalog.
    pub region: String,
    /// Account identifier the run was scoped to.
    pub account_id: String,
    /// Version of this crate.
    pub tool_version: String,
}

/// The complete assessment report.
///
/// This is the sole handoff artifact to the renderers and to any external
/// persistence collaborator; both output formats derive from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentReport {
    /// Run metadata.
    pub metadata: AssessmentMetadata,
    /// How the run ended.
    pub status: RunStatus,
    /// Aggregate counts.
    pub summary: AssessmentSummary,
    /// All enumerated databases, in discovery order.
    pub databases: Vec<DatabaseDescriptor>,
    /// All assessed tables, in discovery order.
    pub tables: Vec<TableAssessment>,
}
