//! Order persistence port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::order::{Order, OrderQuery, OrderStatus};
use crate::pagination::PageRequest;

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert [`Order`] into database.
    async fn insert(&self, order: &Order) -> Result<()>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>>;

    /// Move an order to `to` only if it is still in `from`.
    ///
    /// Returns `None` when the order is missing or no longer in `from`, so
    /// two concurrent transitions can never both succeed.
    async fn transition(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>>;

    /// Set the delivery person of a pending order.
    async fn assign_delivery(&self, id: Uuid, delivery_person_id: Uuid) -> Result<Option<Order>>;

    /// Orders matching `query`, newest first, plus the total match count.
    async fn find(&self, query: &OrderQuery, page: &PageRequest) -> Result<(Vec<Order>, u64)>;
}
