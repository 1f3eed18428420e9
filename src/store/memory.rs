use parking_lot::RwLock;
use std::collections::HashMap;

use crate::model::{Id, ServiceInstance};
use crate::store::traits::{InstanceStore, StoreError, StoreResult};

/// In-process instance store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    instances: RwLock<HashMap<Id, ServiceInstance>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.instances.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.read().is_empty()
    }
}

#[async_trait::async_trait]
impl InstanceStore for MemoryStore {
    async fn find(&self, id: &Id) -> StoreResult<Option<ServiceInstance>> {
        Ok(self.instances.read().get(id).cloned())
    }

    async fn insert(&self, instance: ServiceInstance) -> StoreResult<()> {
        let mut instances = self.instances.write();
        if instances.contains_key(&instance.id) {
            return Err(StoreError::Conflict(format!(
                "duplicate key value violates unique constraint: id '{}' already exists",
                instance.id
            )));
        }
        instances.insert(instance.id.clone(), instance);
        Ok(())
    }

    async fn update(&self, mut instance: ServiceInstance) -> StoreResult<bool> {
        let mut instances = self.instances.write();
        let Some(existing) = instances.get_mut(&instance.id) else {
            return Ok(false);
        };

        instance.created_at = existing.created_at;
        instance.updated_at = chrono::Utc::now();
        *existing = instance;
        Ok(true)
    }

    async fn delete(&self, id: &Id) -> StoreResult<bool> {
        Ok(self.instances.write().remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn instance(id: &str, plan_id: &str) -> ServiceInstance {
        ServiceInstance::new(id.to_string(), "db".to_string(), plan_id.to_string(), &json!({}))
    }

    #[tokio::test]
    async fn test_store_basic_operations() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.insert(instance("i1", "small")).await.unwrap();
        let found = store.find(&"i1".to_string()).await.unwrap();
        assert_eq!(found.unwrap().plan_id, "small");

        assert!(store.update(instance("i1", "large")).await.unwrap());
        let found = store.find(&"i1".to_string()).await.unwrap().unwrap();
        assert_eq!(found.plan_id, "large");

        assert!(store.delete(&"i1".to_string()).await.unwrap());
        assert!(store.find(&"i1".to_string()).await.unwrap().is_none());
        assert!(!store.delete(&"i1".to_string()).await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_duplicate_is_conflict() {
        let store = MemoryStore::new();
        store.insert(instance("i1", "small")).await.unwrap();

        let err = store.insert(instance("i1", "large")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        // First write wins
        let found = store.find(&"i1".to_string()).await.unwrap().unwrap();
        assert_eq!(found.plan_id, "small");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_and_keeps_created_at() {
        let store = MemoryStore::new();
        assert!(!store.update(instance("ghost", "small")).await.unwrap());
        assert!(store.is_empty());

        let original = instance("i1", "small");
        let created_at = original.created_at;
        store.insert(original).await.unwrap();

        let mut changed = instance("i1", "large");
        changed.created_at = chrono::Utc::now() + chrono::Duration::days(1);
        store.update(changed).await.unwrap();

        let found = store.find(&"i1".to_string()).await.unwrap().unwrap();
        assert_eq!(found.created_at, created_at);
        assert!(found.updated_at >= created_at);
    }
}
