use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, types::Value};

use crate::domain::entities::category::Category;
use crate::domain::entities::record::RecordId;
use crate::infra::sqlite::schema::open_connection;

/// A record ready to be written: id, optional category and JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRow {
    pub id: String,
    pub category_id: Option<String>,
    pub body: String,
}

pub fn upsert_records(db_path: &Path, collection: &str, rows: &[RecordRow]) -> Result<usize> {
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start record upsert transaction")?;

    let mut upsert = tx
        .prepare(
            "INSERT INTO record(collection, id, category_id, body, deleted_at)
             VALUES (?1, ?2, ?3, ?4, NULL)
             ON CONFLICT(collection, id) DO UPDATE SET
                 category_id = excluded.category_id,
                 body = excluded.body,
                 deleted_at = NULL",
        )
        .context("failed to prepare record upsert")?;
    for row in rows {
        upsert
            .execute(params![collection, row.id, row.category_id, row.body])
            .with_context(|| format!("failed to upsert {collection} record {}", row.id))?;
    }
    drop(upsert);

    tx.commit().context("failed to commit record upsert")?;
    Ok(rows.len())
}

pub fn load_record_bodies(
    db_path: &Path,
    collection: &str,
    category_ids: Option<&[RecordId]>,
    include_deleted: bool,
) -> Result<Vec<String>> {
    let conn = open_connection(db_path)?;

    let mut sql = String::from("SELECT body FROM record WHERE collection = ?");
    let mut query_params = vec![Value::Text(collection.to_string())];

    if !include_deleted {
        sql.push_str(" AND deleted_at IS NULL");
    }

    if let Some(category_ids) = category_ids {
        if category_ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = std::iter::repeat_n("?", category_ids.len())
            .collect::<Vec<_>>()
            .join(",");
        sql.push_str(&format!(" AND category_id IN ({placeholders})"));
        query_params.extend(category_ids.iter().map(|id| Value::Text(id.0.clone())));
    }

    sql.push_str(" ORDER BY rowid ASC");

    let mut stmt = conn
        .prepare(&sql)
        .context("failed to prepare record query")?;
    let bodies = stmt
        .query_map(rusqlite::params_from_iter(query_params), |row| {
            row.get::<_, String>(0)
        })
        .with_context(|| format!("failed to query {collection} records"))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .with_context(|| format!("failed to collect {collection} records"))?;

    Ok(bodies)
}

/// Marks each live id as deleted. Returns the ids that changed and those that did not.
pub fn soft_delete_records(
    db_path: &Path,
    collection: &str,
    ids: &[RecordId],
) -> Result<(Vec<RecordId>, Vec<RecordId>)> {
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start soft-delete transaction")?;

    let mut succeeded = Vec::new();
    let mut missing = Vec::new();
    let mut update = tx
        .prepare(
            "UPDATE record SET deleted_at = datetime('now')
             WHERE collection = ?1 AND id = ?2 AND deleted_at IS NULL",
        )
        .context("failed to prepare soft-delete statement")?;
    for id in ids {
        let changed = update
            .execute(params![collection, id.as_str()])
            .with_context(|| format!("failed to soft-delete {collection} record {id}"))?;
        if changed == 1 {
            succeeded.push(id.clone());
        } else {
            missing.push(id.clone());
        }
    }
    drop(update);

    tx.commit().context("failed to commit soft-delete")?;
    Ok((succeeded, missing))
}

pub fn purge_deleted_records(db_path: &Path, collection: &str) -> Result<usize> {
    let conn = open_connection(db_path)?;
    let removed = conn
        .execute(
            "DELETE FROM record WHERE collection = ?1 AND deleted_at IS NOT NULL",
            params![collection],
        )
        .with_context(|| format!("failed to purge deleted {collection} records"))?;
    Ok(removed)
}

pub fn upsert_categories(db_path: &Path, categories: &[Category]) -> Result<()> {
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start category upsert transaction")?;

    let mut upsert = tx
        .prepare(
            "INSERT INTO category(id, name, description, parent_category_id, display_order)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 description = excluded.description,
                 parent_category_id = excluded.parent_category_id,
                 display_order = excluded.display_order",
        )
        .context("failed to prepare category upsert")?;
    for category in categories {
        upsert
            .execute(params![
                category.id.as_str(),
                category.name,
                category.description,
                category.parent_category_id.as_ref().map(RecordId::as_str),
                category.display_order,
            ])
            .with_context(|| format!("failed to upsert category {}", category.id))?;
    }
    drop(upsert);

    tx.commit().context("failed to commit category upsert")?;
    Ok(())
}

pub fn load_categories(db_path: &Path) -> Result<Vec<Category>> {
    let conn = open_connection(db_path)?;
    let mut stmt = conn
        .prepare(
            "SELECT id, name, description, parent_category_id, display_order
             FROM category
             ORDER BY rowid ASC",
        )
        .context("failed to prepare categories query")?;

    let categories = stmt
        .query_map([], |row| {
            Ok(Category {
                id: RecordId(row.get(0)?),
                name: row.get(1)?,
                description: row.get(2)?,
                parent_category_id: row.get::<_, Option<String>>(3)?.map(RecordId),
                display_order: row.get(4)?,
            })
        })
        .context("failed to query categories")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect categories")?;

    Ok(categories)
}
