use crate::model::{Id, ServiceInstance};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A record with the same key already exists
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Keyed persistence for provisioned instances. Every call is atomic for a single record.
#[async_trait::async_trait]
pub trait InstanceStore: Send + Sync {
    /// Get an instance by ID
    async fn find(&self, id: &Id) -> StoreResult<Option<ServiceInstance>>;
    /// Insert a new instance, failing with `StoreError::Conflict` if the ID is taken
    async fn insert(&self, instance: ServiceInstance) -> StoreResult<()>;
    /// Replace an existing instance. Returns false if there was nothing to update.
    async fn update(&self, instance: ServiceInstance) -> StoreResult<bool>;
    /// Remove an instance. Returns false if it did not exist.
    async fn delete(&self, id: &Id) -> StoreResult<bool>;
}
