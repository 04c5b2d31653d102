mod repository;
mod service;
mod view;
mod visibility;

pub use repository::*;
pub use service::*;
pub use view::*;
pub use visibility::*;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::{HashedOtp, Otp};
use crate::money::line_amount;

/// Order lifecycle states.
///
/// `Pending` is the only state an engine transition leaves from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status")]
pub enum OrderStatus {
    #[default]
    Pending,
    /// Closed by a seller of one of the line items.
    Completed,
    /// Closed by the assigned delivery person.
    Delivered,
    /// Never set by the engine.
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }

    /// Label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

/// Purchased item snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub item_id: Uuid,
    pub quantity: i32,
    /// Item price at checkout time.
    pub unit_price: Decimal,
}

impl LineItem {
    /// `None` on overflow.
    pub fn amount(&self) -> Option<Decimal> {
        line_amount(self.unit_price, self.quantity)
    }
}

/// Order as saved on database.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub transaction_id: String,
    pub buyer_id: Uuid,
    #[sqlx(json)]
    pub items: Vec<LineItem>,
    pub total_amount: Decimal,
    /// Set once at creation, never rewritten.
    #[serde(skip)]
    pub hashed_otp: HashedOtp,
    pub status: OrderStatus,
    pub delivery_person_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Newly placed order with the plaintext delivery code.
///
/// The only place the code ever leaves the server.
#[derive(Debug, Serialize, Deserialize)]
pub struct PlacedOrder {
    pub order: Order,
    pub otp: Otp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_line_amount() {
        let line = LineItem {
            item_id: Uuid::new_v4(),
            quantity: 3,
            unit_price: Decimal::new(1250, 2),
        };
        assert_eq!(line.amount(), Some(Decimal::new(3750, 2)));
    }
}
