//! Item catalog persistence port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::item::{Item, ItemChanges};

#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Insert [`Item`] into database.
    async fn insert(&self, item: &Item) -> Result<()>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Item>>;

    /// Resolve several items at once. Missing ids are skipped.
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Item>>;

    /// Ids of every item sold by `seller_id`.
    async fn ids_by_seller(&self, seller_id: Uuid) -> Result<Vec<Uuid>>;

    /// Apply seller changes. Returns `None` when the item does not exist.
    async fn update(&self, id: Uuid, changes: &ItemChanges) -> Result<Option<Item>>;

    /// Hard delete. Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}
