//! Readiness classification.
//!
//! Pure mapping from one raw table descriptor to one [`TableAssessment`].
//! No network access, no shared state: the same descriptor always yields
//! the same assessment, and classification never fails — an unreadable
//! descriptor degrades to an UNKNOWN verdict with explanatory notes.

use crate::catalog::{RawTable, StorageDescriptor};
use crate::models::{MigrationReadiness, TableAssessment, TableFormat};
use chrono::DateTime;

/// Parameter key the catalog uses to tag the table type explicitly.
const TABLE_TYPE_KEY: &str = "table_type";

/// Parameter keys that may carry a size statistic, in bytes, in preference
/// order.
const SIZE_KEYS: [&str; 2] = ["totalSize", "numBytes"];

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Classify one raw table descriptor.
///
/// `upstream_notes` carries diagnostics attached during discovery (for
/// example a partially failed read); any upstream note forces the verdict
/// to UNKNOWN.
pub fn classify_table(
    database_name: &str,
    raw: &RawTable,
    upstream_notes: &[String],
) -> TableAssessment {
    let mut notes: Vec<String> = upstream_notes.to_vec();

    let (mut format, inference_notes) = infer_format(raw.storage_descriptor.as_ref());
    notes.extend(inference_notes);

    // The explicit table-type marker wins over format-string inference.
    if let Some(marker) = table_type_marker(raw) {
        if marker.eq_ignore_ascii_case("iceberg") {
            if format != TableFormat::Iceberg {
                notes.push(format!(
                    "Catalog {} marker says ICEBERG but storage format identifiers suggest {}; treating as ICEBERG",
                    TABLE_TYPE_KEY, format
                ));
                format = TableFormat::Iceberg;
            }
        } else if !marker.is_empty() && !marker.eq_ignore_ascii_case(&format.to_string()) {
            notes.push(format!(
                "Catalog {} marker '{}' does not match inferred format {}",
                TABLE_TYPE_KEY, marker, format
            ));
        }
    }

    let storage_location = raw
        .storage_descriptor
        .as_ref()
        .and_then(|sd| sd.location.clone())
        .unwrap_or_default();

    let partition_keys: Vec<String> = raw
        .partition_keys
        .iter()
        .map(|pk| pk.name.clone())
        .collect();

    let column_count = raw
        .storage_descriptor
        .as_ref()
        .map(|sd| sd.columns.len())
        .unwrap_or(0);

    let estimated_size_gb = extract_size_gb(raw, &mut notes);

    let last_updated = raw
        .update_time
        .and_then(|secs| DateTime::from_timestamp(secs as i64, 0));

    let upstream_failed = !upstream_notes.is_empty();
    let migration_readiness =
        derive_readiness(format, &storage_location, upstream_failed, &mut notes);

    // Invariant: is_iceberg mirrors the final (post-override) format.
    let is_iceberg = format == TableFormat::Iceberg;

    TableAssessment {
        database_name: database_name.to_string(),
        table_name: raw.name.clone(),
        format,
        storage_location,
        estimated_size_gb,
        partition_keys,
        column_count,
        last_updated,
        is_iceberg,
        migration_readiness,
        notes,
    }
}

/// Infer the storage format from the descriptor's format identifiers.
///
/// Unrecognized identifiers are never silently dropped: they come back as
/// a note citing the raw values.
fn infer_format(sd: Option<&StorageDescriptor>) -> (TableFormat, Vec<String>) {
    let (input, output, serde_lib) = match sd {
        Some(sd) => (
            sd.input_format.clone().unwrap_or_default(),
            sd.output_format.clone().unwrap_or_default(),
            sd.serde_info
                .as_ref()
                .and_then(|s| s.serialization_library.clone())
                .unwrap_or_default(),
        ),
        None => (String::new(), String::new(), String::new()),
    };

    let combined = format!("{} {} {}", input, output, serde_lib).to_lowercase();

    if combined.trim().is_empty() {
        return (
            TableFormat::Unknown,
            vec!["No storage format identifiers present".to_string()],
        );
    }

    let format = if combined.contains("iceberg") {
        TableFormat::Iceberg
    } else if combined.contains("parquet") {
        TableFormat::Parquet
    } else if combined.contains("orc") {
        TableFormat::Orc
    } else if combined.contains("avro") {
        TableFormat::Avro
    } else if combined.contains("csv")
        || (combined.contains("textinputformat") && combined.contains("lazysimpleserde"))
    {
        TableFormat::Csv
    } else {
        return (
            TableFormat::Unknown,
            vec![format!(
                "Unrecognized storage format identifiers: input='{}', output='{}', serde='{}'",
                input, output, serde_lib
            )],
        );
    };

    (format, Vec::new())
}

fn table_type_marker(raw: &RawTable) -> Option<&str> {
    raw.parameters
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(TABLE_TYPE_KEY))
        .map(|(_, value)| value.trim())
}

/// Pull a size estimate out of the parameter map, in GB.
///
/// Absence stays `None`; it is never coerced to zero. A present but
/// unparseable statistic appends a note and also stays `None`.
fn extract_size_gb(raw: &RawTable, notes: &mut Vec<String>) -> Option<f64> {
    for key in SIZE_KEYS {
        if let Some(value) = raw.parameters.get(key) {
            match value.trim().parse::<f64>() {
                Ok(bytes) if bytes >= 0.0 => return Some(bytes / BYTES_PER_GB),
                _ => {
                    notes.push(format!("Unparseable size statistic {}='{}'", key, value));
                    return None;
                }
            }
        }
    }
    None
}

fn derive_readiness(
    format: TableFormat,
    location: &str,
    upstream_failed: bool,
    notes: &mut Vec<String>,
) -> MigrationReadiness {
    if upstream_failed {
        return MigrationReadiness::Unknown;
    }

    let location_ok = well_formed_uri(location);

    match format.implied_readiness() {
        MigrationReadiness::Ready if location_ok => MigrationReadiness::Ready,
        MigrationReadiness::NeedsConversion if location_ok => {
            notes.push(format!("{} format requires conversion to Iceberg", format));
            MigrationReadiness::NeedsConversion
        }
        MigrationReadiness::Unknown => MigrationReadiness::Unknown,
        _ => {
            notes.push("Missing or malformed storage location".to_string());
            MigrationReadiness::Unknown
        }
    }
}

/// A usable storage location: non-empty and `scheme://rest` shaped.
fn well_formed_uri(uri: &str) -> bool {
    match uri.split_once("://") {
        Some((scheme, rest)) => {
            !scheme.is_empty()
                && scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-')
                && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && !rest.is_empty()
        }
        None => false,
    }
}
