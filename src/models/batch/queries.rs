use chrono::{DateTime, Utc};
use futures_util::future::try_join_all;
use serde_json::json;

use super::types::{Batch, BatchWithRegistrations};
use crate::models::registration;
use crate::store::timestamp::{self, Timestamp};
use crate::store::{Document, Fields, Store, StoreError, paths};

/// Parsed batch plus its creation instant, for ordering.
fn from_document(doc: &Document) -> Result<(DateTime<Utc>, Batch), StoreError> {
    let created = doc.timestamp_field("createdAt")?;
    let batch = Batch {
        id: doc.id.clone(),
        name: doc.require_str("name")?,
        created_at: timestamp::to_iso(created),
        active: doc.bool_field("active").unwrap_or(false),
    };
    Ok((created, batch))
}

/// Create a new batch. Returns its id.
pub async fn create(store: &Store, name: &str, active: bool) -> Result<String, StoreError> {
    let mut fields = Fields::new();
    fields.insert("name".into(), json!(name));
    fields.insert("createdAt".into(), Timestamp::now().to_value());
    fields.insert("active".into(), json!(active));
    store.add(paths::BATCHES, fields).await
}

pub async fn find_by_id(store: &Store, id: &str) -> Result<Option<Batch>, StoreError> {
    match store.get(paths::BATCHES, id).await? {
        Some(doc) => from_document(&doc).map(|(_, batch)| Some(batch)),
        None => Ok(None),
    }
}

/// All batches, newest first. Malformed batch documents are logged and skipped.
pub async fn find_all(store: &Store) -> Result<Vec<Batch>, StoreError> {
    let docs = store.list(paths::BATCHES).await?;
    let mut dated: Vec<(DateTime<Utc>, Batch)> = docs
        .iter()
        .filter_map(|doc| match from_document(doc) {
            Ok(pair) => Some(pair),
            Err(e) => {
                log::warn!("Skipping batch: {e}");
                None
            }
        })
        .collect();
    dated.sort_by(|(a_at, a), (b_at, b)| b_at.cmp(a_at).then_with(|| a.id.cmp(&b.id)));
    Ok(dated.into_iter().map(|(_, batch)| batch).collect())
}

/// Batches currently accepting registrations, newest first.
pub async fn find_active(store: &Store) -> Result<Vec<Batch>, StoreError> {
    let mut batches = find_all(store).await?;
    batches.retain(|b| b.active);
    Ok(batches)
}

/// Every batch with its registrations nested, newest batch first.
///
/// Registrations are fetched concurrently, one request per batch. Any store
/// failure fails the whole call, so an empty result always means "no data".
pub async fn find_all_with_registrations(
    store: &Store,
) -> Result<Vec<BatchWithRegistrations>, StoreError> {
    let batches = find_all(store).await?;
    let registrations = try_join_all(
        batches
            .iter()
            .map(|b| registration::find_by_batch(store, &b.id)),
    )
    .await?;
    Ok(batches
        .into_iter()
        .zip(registrations)
        .map(|(batch, registrations)| BatchWithRegistrations { batch, registrations })
        .collect())
}

/// Open or close a batch. Returns false if the batch does not exist.
pub async fn set_active(store: &Store, id: &str, active: bool) -> Result<bool, StoreError> {
    let mut patch = Fields::new();
    patch.insert("active".into(), json!(active));
    store.update(paths::BATCHES, id, patch).await
}

/// Delete a batch and all of its registrations. Returns the number of
/// registrations removed, or `None` if the batch does not exist.
pub async fn delete(store: &Store, id: &str) -> Result<Option<u64>, StoreError> {
    let removed = store
        .delete_cascade(paths::BATCHES, id, &[paths::registrations(id)])
        .await?;
    if let Some(n) = removed {
        log::info!("Deleted batch {id} with {n} registrations");
    }
    Ok(removed)
}
