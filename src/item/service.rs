use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{Result, ServerError};
use crate::item::{Category, Item, ItemChanges, ItemRepository};
use crate::money::check_price;

/// Data required to list an item for sale.
#[derive(Clone, Debug, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category: Category,
    pub images: Vec<String>,
}

/// Minimal catalog manager: sellers own their listings.
#[derive(Clone)]
pub struct ItemService {
    repo: Arc<dyn ItemRepository>,
}

impl ItemService {
    /// Create a new [`ItemService`].
    pub fn new(repo: Arc<dyn ItemRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, seller_id: Uuid, new: NewItem) -> Result<Item> {
        check_price(new.price)?;

        let now = Utc::now();
        let item = Item {
            id: Uuid::new_v4(),
            name: new.name,
            description: new.description,
            price: new.price,
            category: new.category,
            seller_id,
            images: new.images,
            average_rating: 0.0,
            total_reviews: 0,
            rating_sum: 0,
            created_at: now,
            updated_at: now,
        };

        self.repo.insert(&item).await?;
        tracing::info!(item_id = %item.id, %seller_id, "item listed");

        Ok(item)
    }

    pub async fn get(&self, id: Uuid) -> Result<Item> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ServerError::NotFound("Item not found."))
    }

    /// Update price, name, description or images. Seller only.
    pub async fn update(&self, seller_id: Uuid, id: Uuid, changes: ItemChanges) -> Result<Item> {
        if let Some(price) = changes.price {
            check_price(price)?;
        }

        self.owned(seller_id, id).await?;
        self.repo
            .update(id, &changes)
            .await?
            .ok_or(ServerError::NotFound("Item not found."))
    }

    /// Hard delete. Seller only.
    pub async fn delete(&self, seller_id: Uuid, id: Uuid) -> Result<()> {
        self.owned(seller_id, id).await?;

        if !self.repo.delete(id).await? {
            return Err(ServerError::NotFound("Item not found."));
        }
        tracing::info!(item_id = %id, %seller_id, "item deleted");

        Ok(())
    }

    async fn owned(&self, seller_id: Uuid, id: Uuid) -> Result<Item> {
        let item = self.get(id).await?;
        if item.seller_id != seller_id {
            return Err(ServerError::Forbidden("Not authorized to modify this item."));
        }
        Ok(item)
    }
}
