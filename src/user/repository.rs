//! User persistence port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::user::{CartEntry, User};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert [`User`] into database.
    async fn insert(&self, user: &User) -> Result<()>;

    /// Find a user using `id` field.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Users among `ids`, unknown ids are skipped.
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>>;

    /// Cart entries, in insertion order.
    async fn cart(&self, user_id: Uuid) -> Result<Vec<CartEntry>>;

    /// Add an item, accumulating quantity when already present.
    ///
    /// Fails with a validation error when the entry would exceed
    /// [`crate::money::MAX_QUANTITY`], leaving the cart unchanged.
    async fn add_to_cart(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<Vec<CartEntry>>;

    /// Overwrite quantity of an existing entry.
    ///
    /// Returns `None` when the item is not in the cart.
    async fn set_cart_quantity(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<Option<Vec<CartEntry>>>;

    async fn remove_from_cart(&self, user_id: Uuid, item_id: Uuid) -> Result<Vec<CartEntry>>;

    async fn clear_cart(&self, user_id: Uuid) -> Result<()>;
}
