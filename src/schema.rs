use std::collections::{HashMap, HashSet};

use rusqlite::Connection;
use tracing::debug;

use crate::error::Result;

pub const SOURCES_TABLE: &str = "sources";
pub const PHONE_TABLE: &str = "phone_numbers";
pub const EMAIL_TABLE: &str = "email_addresses";
pub const IP_TABLE: &str = "ip_addresses";
pub const FILES_TABLE: &str = "files";

// Anything else in the store is ignored; anything missing from it is an
// empty data category, not an error.
pub const EXPECTED_TABLES: [&str; 5] = [
    SOURCES_TABLE,
    PHONE_TABLE,
    EMAIL_TABLE,
    IP_TABLE,
    FILES_TABLE,
];

#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: String,
    // Declared order, as `SELECT *` returns them.
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SchemaMap {
    tables: HashMap<String, TableSchema>,
}

impl SchemaMap {
    pub fn probe(conn: &Connection) -> Result<Self> {
        let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table'")?;
        let present: HashSet<String> = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<_>>()?;

        let mut tables = HashMap::new();
        for name in EXPECTED_TABLES {
            if !present.contains(name) {
                debug!("table '{name}' absent, category treated as empty");
                continue;
            }
            // PRAGMA arguments cannot be bound; `name` only ever comes from
            // the fixed expected-table list.
            let mut stmt = conn.prepare(&format!("PRAGMA table_info({name})"))?;
            let columns: Vec<String> = stmt
                .query_map([], |row| row.get::<_, String>(1))?
                .collect::<rusqlite::Result<_>>()?;
            tables.insert(
                name.to_string(),
                TableSchema {
                    name: name.to_string(),
                    columns,
                },
            );
        }
        Ok(Self { tables })
    }

    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn present_tables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_reports_present_tables_and_columns() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE sources (source_id INTEGER, source_name TEXT, created_date TEXT);
             CREATE TABLE phone_numbers (id INTEGER, source_id INTEGER, phone_number TEXT);
             CREATE TABLE unrelated (x);",
        )
        .unwrap();

        let schema = SchemaMap::probe(&conn).unwrap();
        assert!(schema.has(SOURCES_TABLE));
        assert!(schema.has(PHONE_TABLE));
        assert!(!schema.has(EMAIL_TABLE));
        assert!(!schema.has("unrelated"));
        assert_eq!(
            schema.table(SOURCES_TABLE).unwrap().columns,
            vec!["source_id", "source_name", "created_date"]
        );
        assert_eq!(schema.present_tables(), vec![PHONE_TABLE, SOURCES_TABLE]);
    }

    #[test]
    fn probe_of_empty_store_is_not_an_error() {
        let conn = Connection::open_in_memory().unwrap();
        let schema = SchemaMap::probe(&conn).unwrap();
        assert!(schema.present_tables().is_empty());
    }
}
