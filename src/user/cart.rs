//! Shopping cart kept on the user.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, ServerError};
use crate::item::{Item, ItemRepository};
use crate::money::{check_quantity, checked_sum, line_amount};
use crate::user::{CartEntry, UserRepository};

/// Cart entry joined with its item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub item: Item,
    pub quantity: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub subtotal: Decimal,
}

/// Cart manager.
#[derive(Clone)]
pub struct CartService {
    users: Arc<dyn UserRepository>,
    items: Arc<dyn ItemRepository>,
}

impl CartService {
    /// Create a new [`CartService`].
    pub fn new(users: Arc<dyn UserRepository>, items: Arc<dyn ItemRepository>) -> Self {
        Self { users, items }
    }

    /// Cart with resolved items and current subtotal.
    pub async fn view(&self, user_id: Uuid) -> Result<CartView> {
        let entries = self.users.cart(user_id).await?;
        let ids: Vec<Uuid> = entries.iter().map(|e| e.item_id).collect();
        let mut items: HashMap<Uuid, Item> = self
            .items
            .find_many(&ids)
            .await?
            .into_iter()
            .map(|item| (item.id, item))
            .collect();

        let lines: Vec<CartLine> = entries
            .into_iter()
            .filter_map(|entry| {
                items.remove(&entry.item_id).map(|item| CartLine {
                    item,
                    quantity: entry.quantity,
                })
            })
            .collect();
        let subtotal = checked_sum(
            lines
                .iter()
                .map(|line| line_amount(line.item.price, line.quantity)),
        )
        .ok_or_else(|| ServerError::field("subtotal", "range", "Cart subtotal is too large."))?;

        Ok(CartView { lines, subtotal })
    }

    /// Number of distinct items in the cart.
    pub async fn count(&self, user_id: Uuid) -> Result<usize> {
        Ok(self.users.cart(user_id).await?.len())
    }

    pub async fn add(&self, user_id: Uuid, item_id: Uuid, quantity: i32) -> Result<Vec<CartEntry>> {
        check_quantity(quantity)?;
        if self.items.find_by_id(item_id).await?.is_none() {
            return Err(ServerError::NotFound("Item not found."));
        }

        self.users.add_to_cart(user_id, item_id, quantity).await
    }

    pub async fn set_quantity(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<Vec<CartEntry>> {
        check_quantity(quantity)?;

        self.users
            .set_cart_quantity(user_id, item_id, quantity)
            .await?
            .ok_or(ServerError::NotFound("Item not found in cart."))
    }

    pub async fn remove(&self, user_id: Uuid, item_id: Uuid) -> Result<Vec<CartEntry>> {
        self.users.remove_from_cart(user_id, item_id).await
    }

    pub async fn clear(&self, user_id: Uuid) -> Result<()> {
        self.users.clear_cart(user_id).await
    }
}
