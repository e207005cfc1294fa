use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn open_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("failed to open db: {}", db_path.display()))?;
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign key enforcement")?;
    Ok(conn)
}

pub fn init_db(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create parent dir: {}", parent.display()))?;
    }

    let conn = open_connection(db_path)?;

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS record (
            collection   TEXT NOT NULL,
            id           TEXT NOT NULL,
            category_id  TEXT,
            body         TEXT NOT NULL,
            deleted_at   TEXT,
            created_at   TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (collection, id)
        );

        CREATE TABLE IF NOT EXISTS category (
            id                  TEXT PRIMARY KEY,
            name                TEXT NOT NULL,
            description         TEXT,
            parent_category_id  TEXT,
            display_order       INTEGER
        );

        CREATE INDEX IF NOT EXISTS idx_record_collection_category
            ON record(collection, category_id);

        CREATE INDEX IF NOT EXISTS idx_category_parent
            ON category(parent_category_id);
        ",
    )
    .context("failed to initialize schema")?;

    Ok(())
}
