//! Converter for legacy CAST SQLite extraction databases.
//!
//! Reads a normalized store (sources with phone/email/IP/file child tables)
//! and reshapes it into the single hierarchical CAST_JSON document the viewer
//! browses: one deduplicated, provenance-preserving tile per source, keyed by
//! synthetic `tile-N` identifiers.

pub mod convert;
pub mod error;
pub mod loader;
pub mod models;
pub mod record;
pub mod schema;
pub mod tile;
pub mod writer;

pub use convert::{build_document, convert_file};
pub use error::{ConvertError, Result};
pub use models::{Document, RowProvenance, Tile};
