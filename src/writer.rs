use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::Document;

// `<input-stem>_converted.db` next to the input. The content is UTF-8 JSON;
// the `.db` extension is what the legacy viewer's open-file filter matches.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{stem}_converted.db"))
}

// Nothing touches the filesystem until serialization of the whole document
// has succeeded.
pub fn write_document(document: &Document, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(document)?;
    fs::write(path, json)?;
    Ok(())
}
