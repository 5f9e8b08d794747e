use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::Connection;
use tracing::info;

use crate::error::{ConvertError, Result};
use crate::loader::{load_children, load_sources};
use crate::models::{
    ConversionInfo, Document, DocumentMetadata, APPLICATION_VERSION, CONVERTER_VERSION,
    DOCUMENT_FORMAT, DOCUMENT_VERSION, SOURCE_FORMAT,
};
use crate::record::Record;
use crate::schema::{
    SchemaMap, EMAIL_TABLE, FILES_TABLE, IP_TABLE, PHONE_TABLE, SOURCES_TABLE,
};
use crate::tile::{build_tile, ChildRecords};
use crate::writer;

// The document is fully assembled in memory before the first output byte,
// so a fault anywhere in the pipeline leaves no partial artifact.
pub fn convert_file(input: &Path, output: Option<&Path>) -> Result<PathBuf> {
    if !input.exists() {
        return Err(ConvertError::InputNotFound(input.to_path_buf()));
    }
    let output = match output {
        Some(path) => path.to_path_buf(),
        None => writer::default_output_path(input),
    };
    info!("converting SQLite database {}", input.display());

    let conn = Connection::open(input)?;
    let document = build_document(&conn, &source_file_name(input));
    // Single exclusive connection: released on every exit path before the
    // run reports success or failure.
    conn.close().map_err(|(_, err)| err)?;
    let document = document?;

    writer::write_document(&document, &output)?;
    info!(
        tiles = document.metadata.total_tiles,
        phones = document.metadata.total_phones,
        emails = document.metadata.total_emails,
        ips = document.metadata.total_ips,
        "conversion completed, output written to {}",
        output.display()
    );
    Ok(output)
}

// Tile ids are a dense `tile-1..tile-K` sequence, one per source row in
// natural scan order, whether or not the source yielded child rows. An
// absent sources table produces a well-formed empty document.
pub fn build_document(conn: &Connection, source_file: &str) -> Result<Document> {
    let schema = SchemaMap::probe(conn)?;
    info!("found tables: {}", schema.present_tables().join(", "));

    let now = Utc::now();
    let mut tiles = BTreeMap::new();
    let mut tile_counter = 0usize;

    if let Some(sources_table) = schema.table(SOURCES_TABLE) {
        let sources = load_sources(conn, sources_table)?;
        info!("processing {} sources", sources.len());

        for source in &sources {
            tile_counter += 1;
            let tile_id = format!("tile-{tile_counter}");
            let children = load_source_children(conn, &schema, source)?;
            let tile = build_tile(source, &children, now)?;
            info!(
                "{}: {} unique phones, {} unique emails, {} unique IPs, {} files",
                tile.name,
                tile.phones.len(),
                tile.emails.len(),
                tile.ips.len(),
                tile.files.len()
            );
            tiles.insert(tile_id, tile);
        }
    }

    // Global totals sum deduplicated set sizes, never provenance lengths, so
    // duplicates within a source cannot inflate them.
    let metadata = DocumentMetadata {
        application_version: APPLICATION_VERSION.to_string(),
        total_tiles: tiles.len(),
        total_phones: tiles.values().map(|tile| tile.phones.len()).sum(),
        total_emails: tiles.values().map(|tile| tile.emails.len()).sum(),
        total_ips: tiles.values().map(|tile| tile.ips.len()).sum(),
    };

    Ok(Document {
        version: DOCUMENT_VERSION.to_string(),
        format: DOCUMENT_FORMAT.to_string(),
        timestamp: now,
        conversion: ConversionInfo {
            source_format: SOURCE_FORMAT.to_string(),
            source_file: source_file.to_string(),
            conversion_date: now,
            converter_version: CONVERTER_VERSION.to_string(),
        },
        metadata,
        tile_counter,
        tiles,
    })
}

fn load_source_children(
    conn: &Connection,
    schema: &SchemaMap,
    source: &Record,
) -> Result<ChildRecords> {
    let source_id = source.required(SOURCES_TABLE, "source_id")?;
    let mut children = ChildRecords::default();
    if let Some(table) = schema.table(PHONE_TABLE) {
        children.phones = load_children(conn, table, source_id)?;
    }
    if let Some(table) = schema.table(EMAIL_TABLE) {
        children.emails = load_children(conn, table, source_id)?;
    }
    if let Some(table) = schema.table(IP_TABLE) {
        children.ips = load_children(conn, table, source_id)?;
    }
    if let Some(table) = schema.table(FILES_TABLE) {
        children.files = load_children(conn, table, source_id)?;
    }
    Ok(children)
}

fn source_file_name(input: &Path) -> String {
    input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string())
}
