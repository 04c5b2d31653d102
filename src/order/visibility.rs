//! Buyer-or-seller visibility of orders.

use std::collections::HashSet;

use uuid::Uuid;

use crate::order::{Order, OrderStatus};

/// Selection of orders.
///
/// An order matches when its buyer is `buyer_id` OR one of its lines
/// references an item of `item_ids`, then `id` and `status` narrow the set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderQuery {
    pub id: Option<Uuid>,
    pub buyer_id: Option<Uuid>,
    pub item_ids: Vec<Uuid>,
    pub status: Option<OrderStatus>,
}

impl OrderQuery {
    pub fn id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, order: &Order) -> bool {
        let member = self.buyer_id == Some(order.buyer_id)
            || order
                .items
                .iter()
                .any(|line| self.item_ids.contains(&line.item_id));

        member
            && self.id.is_none_or(|id| id == order.id)
            && self.status.is_none_or(|status| status == order.status)
    }
}

/// Orders a user is allowed to see: bought by them, or containing at least
/// one item they sell.
#[derive(Clone, Debug)]
pub struct Visibility {
    user_id: Uuid,
    owned_items: HashSet<Uuid>,
}

impl Visibility {
    pub fn new(user_id: Uuid, owned_items: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            user_id,
            owned_items: owned_items.into_iter().collect(),
        }
    }

    /// Buyer OR seller predicate.
    pub fn query(&self) -> OrderQuery {
        OrderQuery {
            buyer_id: Some(self.user_id),
            item_ids: self.owned_item_ids(),
            ..Default::default()
        }
    }

    /// Seller-only predicate.
    pub fn seller_query(&self) -> OrderQuery {
        OrderQuery {
            item_ids: self.owned_item_ids(),
            ..Default::default()
        }
    }

    pub fn has_items(&self) -> bool {
        !self.owned_items.is_empty()
    }

    /// Whether the user sells at least one line of `order`.
    pub fn sells_in(&self, order: &Order) -> bool {
        order
            .items
            .iter()
            .any(|line| self.owned_items.contains(&line.item_id))
    }

    /// Response view: buyers get the whole order, sellers only their lines.
    pub fn view(&self, order: Order) -> Order {
        if order.buyer_id == self.user_id {
            order
        } else {
            self.seller_view(order)
        }
    }

    /// Drop lines belonging to co-sellers.
    pub fn seller_view(&self, mut order: Order) -> Order {
        order
            .items
            .retain(|line| self.owned_items.contains(&line.item_id));
        order
    }

    fn owned_item_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = self.owned_items.iter().copied().collect();
        ids.sort();
        ids
    }
}
