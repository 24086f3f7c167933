use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgConnection, PgPool};
use sqlx::types::Json;

use super::{Document, Fields, Guarded, StoreError};

/// Documents kept in one JSONB table, keyed by (collection, id).
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

type DocumentRow = (String, String, Json<Value>);

fn into_document((collection, id, Json(data)): DocumentRow) -> Result<Document, StoreError> {
    match data {
        Value::Object(fields) => Ok(Document { collection, id, fields }),
        other => Err(StoreError::Malformed {
            collection,
            id,
            reason: format!("expected an object, found {other}"),
        }),
    }
}

fn into_documents(rows: Vec<DocumentRow>) -> Result<Vec<Document>, StoreError> {
    rows.into_iter().map(into_document).collect()
}

/// Read a row and hold its lock until the surrounding transaction ends.
async fn lock_row(conn: &mut PgConnection, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
    let row: Option<DocumentRow> = sqlx::query_as(
        "SELECT collection, id, data FROM documents WHERE collection = $1 AND id = $2 FOR UPDATE",
    )
    .bind(collection)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    row.map(into_document).transpose()
}

impl PgStore {
    /// Open a pool and bring the schema up to date.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        log::info!("Database migrations complete");
        Ok(Self { pool })
    }

    /// Wrap an existing pool whose schema is already migrated.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3) \
             ON CONFLICT (collection, id) DO UPDATE SET data = EXCLUDED.data, updated_at = now()",
        )
        .bind(collection)
        .bind(id)
        .bind(Json(Value::Object(fields)))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let row: Option<DocumentRow> = sqlx::query_as(
            "SELECT collection, id, data FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(into_document).transpose()
    }

    pub async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let rows: Vec<DocumentRow> = sqlx::query_as(
            "SELECT collection, id, data FROM documents WHERE collection = $1 ORDER BY id",
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;
        into_documents(rows)
    }

    pub async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        let rows: Vec<DocumentRow> = sqlx::query_as(
            "SELECT collection, id, data FROM documents \
             WHERE collection = $1 AND data -> $2 = $3 \
             ORDER BY id",
        )
        .bind(collection)
        .bind(field)
        .bind(Json(value))
        .fetch_all(&self.pool)
        .await?;
        into_documents(rows)
    }

    pub async fn query_group_eq(
        &self,
        group: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        let rows: Vec<DocumentRow> = sqlx::query_as(
            "SELECT collection, id, data FROM documents \
             WHERE (collection = $1 OR collection LIKE '%/' || $1) AND data -> $2 = $3 \
             ORDER BY collection, id",
        )
        .bind(group)
        .bind(field)
        .bind(Json(value))
        .fetch_all(&self.pool)
        .await?;
        into_documents(rows)
    }

    pub async fn update(&self, collection: &str, id: &str, patch: Fields) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE documents SET data = data || $3, updated_at = now() \
             WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .bind(Json(Value::Object(patch)))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn add_if(
        &self,
        parent_collection: &str,
        parent_id: &str,
        field: &str,
        expected: &Value,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<Guarded<()>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let Some(parent) = lock_row(&mut *tx, parent_collection, parent_id).await? else {
            return Ok(Guarded::Missing);
        };
        if parent.fields.get(field) != Some(expected) {
            return Ok(Guarded::Refused(parent));
        }
        sqlx::query("INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(id)
            .bind(Json(Value::Object(fields)))
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(Guarded::Written(()))
    }

    pub async fn modify<T>(
        &self,
        collection: &str,
        id: &str,
        f: impl FnOnce(&mut Document) -> Result<T, StoreError>,
    ) -> Result<Option<T>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let Some(mut doc) = lock_row(&mut *tx, collection, id).await? else {
            return Ok(None);
        };
        let out = f(&mut doc)?;
        sqlx::query(
            "UPDATE documents SET data = $3, updated_at = now() WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .bind(Json(Value::Object(doc.fields)))
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(Some(out))
    }

    pub async fn delete_cascade(
        &self,
        collection: &str,
        id: &str,
        children: &[String],
    ) -> Result<Option<u64>, StoreError> {
        let mut tx = self.pool.begin().await?;
        if lock_row(&mut *tx, collection, id).await?.is_none() {
            return Ok(None);
        }
        let mut removed = 0;
        for child in children {
            removed += sqlx::query("DELETE FROM documents WHERE collection = $1")
                .bind(child)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }
        sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(Some(removed))
    }
}
