use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use super::{Document, Fields, Guarded, StoreError, in_group};

type Collections = BTreeMap<String, BTreeMap<String, Fields>>;

/// In-process store. Cloning shares the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub async fn set(&self, collection: &str, id: &str, fields: Fields) {
        let mut map = self.collections.write().await;
        map.entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
    }

    pub async fn get(&self, collection: &str, id: &str) -> Option<Document> {
        let map = self.collections.read().await;
        map.get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document::new(collection, id, fields.clone()))
    }

    pub async fn list(&self, collection: &str) -> Vec<Document> {
        let map = self.collections.read().await;
        map.get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document::new(collection, id, fields.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub async fn query_eq(&self, collection: &str, field: &str, value: &Value) -> Vec<Document> {
        self.list(collection)
            .await
            .into_iter()
            .filter(|doc| doc.fields.get(field) == Some(value))
            .collect()
    }

    pub async fn query_group_eq(&self, group: &str, field: &str, value: &Value) -> Vec<Document> {
        let map = self.collections.read().await;
        map.iter()
            .filter(|(collection, _)| in_group(collection, group))
            .flat_map(|(collection, docs)| {
                docs.iter()
                    .filter(|(_, fields)| fields.get(field) == Some(value))
                    .map(move |(id, fields)| Document::new(collection, id, fields.clone()))
            })
            .collect()
    }

    pub async fn update(&self, collection: &str, id: &str, patch: Fields) -> bool {
        let mut map = self.collections.write().await;
        match map.get_mut(collection).and_then(|docs| docs.get_mut(id)) {
            Some(fields) => {
                fields.extend(patch);
                true
            }
            None => false,
        }
    }

    pub async fn delete(&self, collection: &str, id: &str) -> bool {
        let mut map = self.collections.write().await;
        map.get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .is_some()
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
    ) -> Guarded<()> {
        let mut map = self.collections.write().await;
        let Some(parent) = map.get(parent_collection).and_then(|docs| docs.get(parent_id)) else {
            return Guarded::Missing;
        };
        if parent.get(field) != Some(expected) {
            return Guarded::Refused(Document::new(parent_collection, parent_id, parent.clone()));
        }
        map.entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
        Guarded::Written(())
    }

    pub async fn modify<T>(
        &self,
        collection: &str,
        id: &str,
        f: impl FnOnce(&mut Document) -> Result<T, StoreError>,
    ) -> Result<Option<T>, StoreError> {
        let mut map = self.collections.write().await;
        let Some(fields) = map.get_mut(collection).and_then(|docs| docs.get_mut(id)) else {
            return Ok(None);
        };
        let mut doc = Document::new(collection, id, fields.clone());
        let out = f(&mut doc)?;
        *fields = doc.fields;
        Ok(Some(out))
    }

    pub async fn delete_cascade(&self, collection: &str, id: &str, children: &[String]) -> Option<u64> {
        let mut map = self.collections.write().await;
        map.get_mut(collection).and_then(|docs| docs.remove(id))?;
        let removed = children
            .iter()
            .filter_map(|child| map.remove(child))
            .map(|docs| docs.len() as u64)
            .sum();
        Some(removed)
    }
}
