use serde_json::{Value, json};

use super::types::{NewRegistration, Registration};
use crate::store::timestamp::{self, Timestamp};
use crate::store::{Document, Fields, Guarded, Store, StoreError, paths};

impl Registration {
    pub fn from_document(doc: &Document) -> Result<Self, StoreError> {
        let batch_id = doc
            .parent_id()
            .ok_or_else(|| doc.malformed("registration outside a batch"))?
            .to_string();
        Ok(Registration {
            id: doc.id.clone(),
            batch_id,
            name: doc.require_str("name")?,
            iitp_no: doc.require_str("iitpNo")?,
            organization: doc.require_str("organization")?,
            submission_time: timestamp::to_iso(doc.timestamp_field("submissionTime")?),
        })
    }
}

/// Convert documents, skipping (and logging) any that are malformed.
/// Result is newest submission first.
fn collect(docs: Vec<Document>) -> Vec<Registration> {
    let mut registrations: Vec<Registration> = docs
        .iter()
        .filter_map(|doc| match Registration::from_document(doc) {
            Ok(r) => Some(r),
            Err(e) => {
                log::warn!("Skipping registration: {e}");
                None
            }
        })
        .collect();
    // ISO strings in a fixed UTC format sort chronologically.
    registrations.sort_by(|a, b| {
        b.submission_time
            .cmp(&a.submission_time)
            .then_with(|| a.id.cmp(&b.id))
    });
    registrations
}

fn to_fields(new: &NewRegistration) -> Fields {
    let mut fields = Fields::new();
    fields.insert("name".into(), json!(new.name));
    fields.insert("iitpNo".into(), json!(new.iitp_no));
    fields.insert("organization".into(), json!(new.organization));
    fields.insert("submissionTime".into(), Timestamp::now().to_value());
    fields
}

/// Store a registration under its batch without looking at the batch.
/// Public intake goes through [`submit`].
pub async fn create(
    store: &Store,
    batch_id: &str,
    new: &NewRegistration,
) -> Result<String, StoreError> {
    store.add(&paths::registrations(batch_id), to_fields(new)).await
}

/// Store a registration only while its batch exists and is active. A
/// concurrent delete or close either happens first (nothing is written)
/// or waits for the insert.
pub async fn submit(
    store: &Store,
    batch_id: &str,
    new: &NewRegistration,
) -> Result<Guarded<String>, StoreError> {
    store
        .add_if(
            paths::BATCHES,
            batch_id,
            "active",
            &Value::Bool(true),
            &paths::registrations(batch_id),
            to_fields(new),
        )
        .await
}

/// All registrations of one batch, newest first.
pub async fn find_by_batch(store: &Store, batch_id: &str) -> Result<Vec<Registration>, StoreError> {
    let docs = store.list(&paths::registrations(batch_id)).await?;
    Ok(collect(docs))
}

/// Registrations with this IITP number in one batch.
pub async fn find_in_batch_by_iitp(
    store: &Store,
    batch_id: &str,
    iitp_no: &str,
) -> Result<Vec<Registration>, StoreError> {
    let docs = store
        .query_eq(&paths::registrations(batch_id), "iitpNo", &Value::from(iitp_no))
        .await?;
    Ok(collect(docs))
}

/// Registrations with this IITP number across every batch.
pub async fn find_by_iitp(store: &Store, iitp_no: &str) -> Result<Vec<Registration>, StoreError> {
    let docs = store
        .query_group_eq(paths::REGISTRATIONS, "iitpNo", &Value::from(iitp_no))
        .await?;
    Ok(collect(docs))
}
