//! Orders as returned by listing endpoints, joined with items and buyer.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::item::Item;
use crate::order::{LineItem, Order, OrderStatus};
use crate::user::User;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
    pub id: Uuid,
    pub name: String,
    pub images: Vec<String>,
    pub seller_id: Uuid,
}

impl From<Item> for ItemSummary {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
            images: item.images,
            seller_id: item.seller_id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

impl From<User> for BuyerSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineView {
    #[serde(flatten)]
    pub line: LineItem,
    /// `None` once the item left the catalog.
    pub item: Option<ItemSummary>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: Uuid,
    pub transaction_id: String,
    pub buyer_id: Uuid,
    pub buyer: Option<BuyerSummary>,
    pub items: Vec<LineView>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub delivery_person_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Items and buyers resolved for a batch of orders.
#[derive(Debug, Default)]
pub struct Lookups {
    pub items: HashMap<Uuid, ItemSummary>,
    pub buyers: HashMap<Uuid, BuyerSummary>,
}

impl OrderView {
    pub fn new(order: Order, lookups: &Lookups) -> Self {
        Self {
            items: order
                .items
                .into_iter()
                .map(|line| LineView {
                    item: lookups.items.get(&line.item_id).cloned(),
                    line,
                })
                .collect(),
            buyer: lookups.buyers.get(&order.buyer_id).cloned(),
            id: order.id,
            transaction_id: order.transaction_id,
            buyer_id: order.buyer_id,
            total_amount: order.total_amount,
            status: order.status,
            delivery_person_id: order.delivery_person_id,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::HashedOtp;

    #[test]
    fn test_view_joins_known_items() {
        let (buyer, known, gone) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            transaction_id: "TXN0-view".into(),
            buyer_id: buyer,
            items: [known, gone]
                .into_iter()
                .map(|item_id| LineItem {
                    item_id,
                    quantity: 1,
                    unit_price: Decimal::ONE,
                })
                .collect(),
            total_amount: Decimal::TWO,
            hashed_otp: HashedOtp::default(),
            status: OrderStatus::Pending,
            delivery_person_id: None,
            created_at: now,
            updated_at: now,
        };

        let mut lookups = Lookups::default();
        lookups.items.insert(known, ItemSummary {
            id: known,
            name: "Desk lamp".into(),
            images: Vec::new(),
            seller_id: Uuid::new_v4(),
        });

        let view = OrderView::new(order, &lookups);
        assert!(view.buyer.is_none());
        assert_eq!(view.items[0].item.as_ref().map(|i| i.name.as_str()), Some("Desk lamp"));
        assert!(view.items[1].item.is_none());

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["items"][0]["itemId"], known.to_string());
        assert_eq!(json["items"][0]["item"]["name"], "Desk lamp");
        assert!(json.get("hashedOtp").is_none());
    }
}
