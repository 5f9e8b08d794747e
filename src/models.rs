use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DOCUMENT_VERSION: &str = "2.0";
pub const DOCUMENT_FORMAT: &str = "CAST_JSON";
pub const CONVERTER_VERSION: &str = "1.0";
pub const SOURCE_FORMAT: &str = "SQLite";
pub const APPLICATION_VERSION: &str = "CAST Database Analyzer v2.0 (Converted)";

pub const ROW_EXTRACTION_METHOD: &str = "Legacy_SQLite_Data";
pub const TILE_EXTRACTION_METHOD: &str = "Legacy_SQLite_Conversion";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub version: String,
    pub format: String,
    pub timestamp: DateTime<Utc>,
    pub conversion: ConversionInfo,
    pub metadata: DocumentMetadata,
    #[serde(rename = "tileCounter")]
    pub tile_counter: usize,
    pub tiles: BTreeMap<String, Tile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionInfo {
    pub source_format: String,
    pub source_file: String,
    pub conversion_date: DateTime<Utc>,
    pub converter_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub application_version: String,
    pub total_tiles: usize,
    pub total_phones: usize,
    pub total_emails: usize,
    #[serde(rename = "totalIPs")]
    pub total_ips: usize,
}

// The `phones`/`emails`/`ips` lists are deduplicated; the matching `*Rows`
// maps hold one ordered provenance list per distinct value. The tile builder
// keeps the two in sync by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    pub name: String,
    pub files: Vec<String>,
    pub phones: Vec<String>,
    pub emails: Vec<String>,
    pub ips: Vec<String>,
    pub phone_rows: BTreeMap<String, Vec<RowProvenance>>,
    pub email_rows: BTreeMap<String, Vec<RowProvenance>>,
    pub ip_rows: BTreeMap<String, Vec<RowProvenance>>,
    pub metadata: TileMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileMetadata {
    pub created_date: Value,
    pub file_count: Value,
    pub extraction_methods: Vec<String>,
    #[serde(rename = "legacy_source_id")]
    pub legacy_source_id: Value,
    // Entire original source row, preserved verbatim.
    #[serde(rename = "legacy_metadata")]
    pub legacy_metadata: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowProvenance {
    pub file_name: String,
    pub line_number: i64,
    pub row_data: String,
    pub extraction_method: String,
    #[serde(rename = "legacy_metadata")]
    pub legacy_metadata: Value,
}
