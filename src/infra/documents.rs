use std::marker::PhantomData;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::types::Json;

use crate::infra::db::Db;
use crate::infra::store::{new_document_id, Document, DocumentStore};

/// Postgres backend: every collection shares the `documents` table and is
/// told apart by `collection`. `seq` preserves insertion order.
pub struct PgDocumentStore<D> {
    db: Db,
    _document: PhantomData<fn() -> D>,
}

impl<D> Clone for PgDocumentStore<D> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            _document: PhantomData,
        }
    }
}

impl<D: Document> PgDocumentStore<D> {
    pub fn new(db: Db) -> Self {
        Self {
            db,
            _document: PhantomData,
        }
    }
}

#[async_trait]
impl<D: Document> DocumentStore<D> for PgDocumentStore<D> {
    async fn find_all(&self) -> Result<Vec<D>> {
        let rows: Vec<Json<D>> = sqlx::query_scalar(
            "SELECT body FROM documents WHERE collection = $1 ORDER BY seq",
        )
        .bind(D::COLLECTION)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.into_iter().map(|Json(document)| document).collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<D>> {
        let row: Option<Json<D>> = sqlx::query_scalar(
            "SELECT body FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(D::COLLECTION)
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(|Json(document)| document))
    }

    async fn find_by_field(&self, field: &str, value: &str) -> Result<Vec<D>> {
        let rows: Vec<Json<D>> = sqlx::query_scalar(
            "SELECT body FROM documents \
             WHERE collection = $1 AND body ->> $2 = $3 \
             ORDER BY seq",
        )
        .bind(D::COLLECTION)
        .bind(field)
        .bind(value)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.into_iter().map(|Json(document)| document).collect())
    }

    async fn search_field(&self, field: &str, needle: &str) -> Result<Vec<D>> {
        let rows: Vec<Json<D>> = sqlx::query_scalar(
            "SELECT body FROM documents \
             WHERE collection = $1 AND body ->> $2 ILIKE ('%' || $3 || '%') \
             ORDER BY seq",
        )
        .bind(D::COLLECTION)
        .bind(field)
        .bind(escape_like(needle))
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.into_iter().map(|Json(document)| document).collect())
    }

    async fn save(&self, mut document: D) -> Result<D> {
        let id = match document.id() {
            Some(id) => id.to_string(),
            None => {
                let id = new_document_id();
                document.assign_id(id.clone());
                id
            }
        };

        sqlx::query(
            "INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3) \
             ON CONFLICT (collection, id) DO UPDATE SET body = EXCLUDED.body",
        )
        .bind(D::COLLECTION)
        .bind(&id)
        .bind(Json(&document))
        .execute(self.db.pool())
        .await?;

        Ok(document)
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(D::COLLECTION)
            .bind(id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<()> {
        self.db.ping().await
    }
}

/// Escapes LIKE wildcards so the needle matches literally.
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
