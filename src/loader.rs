use rusqlite::{params, Connection};
use serde_json::Value;

use crate::error::Result;
use crate::record::{sql_value, Record};
use crate::schema::TableSchema;

pub fn load_sources(conn: &Connection, table: &TableSchema) -> Result<Vec<Record>> {
    let mut stmt = conn.prepare(&format!("SELECT * FROM {}", table.name))?;
    let rows = stmt.query_map([], |row| Record::from_row(&table.columns, row))?;
    let mut records = Vec::new();
    for row in rows {
        records.push(row?);
    }
    Ok(records)
}

// The source id binds with its native SQLite type so integer keys match
// integer-affinity columns.
pub fn load_children(
    conn: &Connection,
    table: &TableSchema,
    source_id: &Value,
) -> Result<Vec<Record>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT * FROM {} WHERE source_id = ?1",
        table.name
    ))?;
    let rows = stmt.query_map(params![sql_value(source_id)], |row| {
        Record::from_row(&table.columns, row)
    })?;
    let mut records = Vec::new();
    for row in rows {
        records.push(row?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SchemaMap, PHONE_TABLE, SOURCES_TABLE};
    use serde_json::json;

    fn fixture() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE sources (source_id INTEGER, source_name TEXT);
             INSERT INTO sources VALUES (1, 'CaseA'), (2, 'CaseB');
             CREATE TABLE phone_numbers (id INTEGER, source_id INTEGER, phone_number TEXT, file_name TEXT);
             INSERT INTO phone_numbers VALUES (10, 1, '555-0001', 'a.txt');
             INSERT INTO phone_numbers VALUES (11, 2, '555-0002', 'b.txt');
             INSERT INTO phone_numbers VALUES (12, 1, '555-0003', NULL);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn loads_sources_in_scan_order() {
        let conn = fixture();
        let schema = SchemaMap::probe(&conn).unwrap();
        let sources = load_sources(&conn, schema.table(SOURCES_TABLE).unwrap()).unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].get("source_name"), Some(&json!("CaseA")));
        assert_eq!(sources[1].get("source_name"), Some(&json!("CaseB")));
    }

    #[test]
    fn loads_children_filtered_by_native_typed_source_id() {
        let conn = fixture();
        let schema = SchemaMap::probe(&conn).unwrap();
        let table = schema.table(PHONE_TABLE).unwrap();

        let rows = load_children(&conn, table, &json!(1)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("phone_number"), Some(&json!("555-0001")));
        assert_eq!(rows[1].get("phone_number"), Some(&json!("555-0003")));
        assert_eq!(rows[1].get("file_name"), Some(&serde_json::Value::Null));

        let none = load_children(&conn, table, &json!(99)).unwrap();
        assert!(none.is_empty());
    }
}
