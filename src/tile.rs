use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::error::Result;
use crate::models::{
    RowProvenance, Tile, TileMetadata, ROW_EXTRACTION_METHOD, TILE_EXTRACTION_METHOD,
};
use crate::record::Record;
use crate::schema::{EMAIL_TABLE, IP_TABLE, PHONE_TABLE, SOURCES_TABLE};

// Child rows for one source. A category whose table is absent from the
// store stays empty.
#[derive(Debug, Clone, Default)]
pub struct ChildRecords {
    pub phones: Vec<Record>,
    pub emails: Vec<Record>,
    pub ips: Vec<Record>,
    pub files: Vec<Record>,
}

// A value enters the dedup list exactly when its first provenance entry
// enters the map, so the bijection between the two holds without a
// reconciliation pass.
pub fn build_tile(source: &Record, children: &ChildRecords, now: DateTime<Utc>) -> Result<Tile> {
    let name = source.required_str(SOURCES_TABLE, "source_name")?;
    let source_id = source.required(SOURCES_TABLE, "source_id")?.clone();

    let (phones, phone_rows) =
        fold_category(PHONE_TABLE, "phone_number", &children.phones, phone_legacy)?;
    let (emails, email_rows) =
        fold_category(EMAIL_TABLE, "email_address", &children.emails, email_legacy)?;
    let (ips, ip_rows) = fold_category(IP_TABLE, "ip_address", &children.ips, ip_legacy)?;

    // File names are plain origin markers: load order, no dedup.
    let files = children
        .files
        .iter()
        .map(|record| record.str_or("file_name", "Unknown"))
        .collect();

    Ok(Tile {
        name,
        files,
        phones,
        emails,
        ips,
        phone_rows,
        email_rows,
        ip_rows,
        metadata: TileMetadata {
            created_date: source.value_or("created_date", json!(now.to_rfc3339())),
            file_count: source.value_or("file_count", json!(0)),
            extraction_methods: vec![TILE_EXTRACTION_METHOD.to_string()],
            legacy_source_id: source_id,
            legacy_metadata: source.as_value(),
        },
    })
}

type ProvenanceIndex = BTreeMap<String, Vec<RowProvenance>>;

fn fold_category(
    table: &str,
    value_column: &str,
    records: &[Record],
    legacy: fn(&Record) -> Value,
) -> Result<(Vec<String>, ProvenanceIndex)> {
    let mut values = Vec::new();
    let mut seen = HashSet::new();
    let mut rows: ProvenanceIndex = BTreeMap::new();

    for record in records {
        let value = record.required_str(table, value_column)?;
        if seen.insert(value.clone()) {
            values.push(value.clone());
        }
        rows.entry(value).or_default().push(RowProvenance {
            file_name: record.str_or("file_name", "Unknown"),
            line_number: record.i64_or("id", 0),
            row_data: record.str_or("record_data", ""),
            extraction_method: ROW_EXTRACTION_METHOD.to_string(),
            legacy_metadata: legacy(record),
        });
    }

    Ok((values, rows))
}

fn phone_legacy(record: &Record) -> Value {
    json!({
        "imsi": record.value_or("imsi", json!("")),
        "extraction_date": record.value_or("extraction_date", json!("")),
        "provider_detected": extract_provider(&record.str_or("record_data", "")),
        "original_record": record.as_value(),
    })
}

fn email_legacy(record: &Record) -> Value {
    json!({
        "extraction_date": record.value_or("extraction_date", json!("")),
        "original_record": record.as_value(),
    })
}

fn ip_legacy(record: &Record) -> Value {
    json!({
        "ip_type": record.value_or("ip_type", json!("")),
        "extraction_date": record.value_or("extraction_date", json!("")),
        "original_record": record.as_value(),
    })
}

// Legacy blobs have no guaranteed shape: any parse failure or missing field
// yields the empty default, and the blob still rides along in `rowData`.
fn extract_provider(record_data: &str) -> Value {
    if record_data.is_empty() {
        return json!("");
    }
    match serde_json::from_str::<Value>(record_data) {
        Ok(parsed) => parsed.get("Provider_Detected").cloned().unwrap_or(json!("")),
        Err(_) => json!(""),
    }
}
