//! In-process store used without PostgreSQL and by tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::error::Result;
use crate::item::{Item, ItemChanges, ItemRepository};
use crate::money::check_quantity;
use crate::order::{Order, OrderQuery, OrderRepository, OrderStatus};
use crate::pagination::{PageRequest, SortOrder, slice};
use crate::review::{Rating, RatingAggregate, Review, ReviewRepository, ReviewSubject};
use crate::user::{CartEntry, User, UserRepository};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    items: HashMap<Uuid, Item>,
    /// Insertion order is creation order.
    orders: Vec<Order>,
    carts: HashMap<Uuid, Vec<CartEntry>>,
    reviews: HashMap<ReviewSubject, Vec<Review>>,
}

/// Every table behind one lock, so multi-row writes are atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn user(&self, id: Uuid) -> Option<User> {
        self.tables.read().users.get(&id).cloned()
    }

    pub fn item(&self, id: Uuid) -> Option<Item> {
        self.tables.read().items.get(&id).cloned()
    }

    pub fn order(&self, id: Uuid) -> Option<Order> {
        self.tables.read().orders.iter().find(|o| o.id == id).cloned()
    }

    #[cfg(test)]
    pub fn orders(&self) -> Vec<Order> {
        self.tables.read().orders.clone()
    }
}

fn ordered<T: Clone>(mut entries: Vec<T>, page: &PageRequest) -> Vec<T> {
    if page.order == SortOrder::Newest {
        entries.reverse();
    }
    slice(&entries, page)
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: &User) -> Result<()> {
        self.tables.write().users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.user(id))
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>> {
        let tables = self.tables.read();
        Ok(ids
            .iter()
            .filter_map(|id| tables.users.get(id).cloned())
            .collect())
    }

    async fn cart(&self, user_id: Uuid) -> Result<Vec<CartEntry>> {
        Ok(self
            .tables
            .read()
            .carts
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn add_to_cart(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<Vec<CartEntry>> {
        let mut tables = self.tables.write();
        let cart = tables.carts.entry(user_id).or_default();

        match cart.iter_mut().find(|entry| entry.item_id == item_id) {
            Some(entry) => {
                let total = entry.quantity.saturating_add(quantity);
                check_quantity(total)?;
                entry.quantity = total;
            }
            None => {
                check_quantity(quantity)?;
                cart.push(CartEntry { item_id, quantity });
            }
        }

        Ok(cart.clone())
    }

    async fn set_cart_quantity(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<Option<Vec<CartEntry>>> {
        let mut tables = self.tables.write();
        let Some(cart) = tables.carts.get_mut(&user_id) else {
            return Ok(None);
        };
        let Some(entry) = cart.iter_mut().find(|entry| entry.item_id == item_id) else {
            return Ok(None);
        };

        entry.quantity = quantity;
        Ok(Some(cart.clone()))
    }

    async fn remove_from_cart(&self, user_id: Uuid, item_id: Uuid) -> Result<Vec<CartEntry>> {
        let mut tables = self.tables.write();
        let cart = tables.carts.entry(user_id).or_default();
        cart.retain(|entry| entry.item_id != item_id);

        Ok(cart.clone())
    }

    async fn clear_cart(&self, user_id: Uuid) -> Result<()> {
        self.tables.write().carts.remove(&user_id);
        Ok(())
    }
}

#[async_trait]
impl ItemRepository for MemoryStore {
    async fn insert(&self, item: &Item) -> Result<()> {
        self.tables.write().items.insert(item.id, item.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Item>> {
        Ok(self.item(id))
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Item>> {
        let tables = self.tables.read();
        Ok(ids
            .iter()
            .filter_map(|id| tables.items.get(id).cloned())
            .collect())
    }

    async fn ids_by_seller(&self, seller_id: Uuid) -> Result<Vec<Uuid>> {
        Ok(self
            .tables
            .read()
            .items
            .values()
            .filter(|item| item.seller_id == seller_id)
            .map(|item| item.id)
            .collect())
    }

    async fn update(&self, id: Uuid, changes: &ItemChanges) -> Result<Option<Item>> {
        let mut tables = self.tables.write();
        let Some(item) = tables.items.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(name) = &changes.name {
            item.name = name.clone();
        }
        if let Some(description) = &changes.description {
            item.description = Some(description.clone());
        }
        if let Some(price) = changes.price {
            item.price = price;
        }
        if let Some(images) = &changes.images {
            item.images = images.clone();
        }
        item.updated_at = Utc::now();

        Ok(Some(item.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut tables = self.tables.write();
        let removed = tables.items.remove(&id).is_some();
        if removed {
            for cart in tables.carts.values_mut() {
                cart.retain(|entry| entry.item_id != id);
            }
        }

        Ok(removed)
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn insert(&self, order: &Order) -> Result<()> {
        self.tables.write().orders.push(order.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>> {
        Ok(self.order(id))
    }

    async fn transition(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>> {
        let mut tables = self.tables.write();
        let Some(order) = tables
            .orders
            .iter_mut()
            .find(|order| order.id == id && order.status == from)
        else {
            return Ok(None);
        };

        order.status = to;
        order.updated_at = Utc::now();
        Ok(Some(order.clone()))
    }

    async fn assign_delivery(&self, id: Uuid, delivery_person_id: Uuid) -> Result<Option<Order>> {
        let mut tables = self.tables.write();
        let Some(order) = tables
            .orders
            .iter_mut()
            .find(|order| order.id == id && order.status == OrderStatus::Pending)
        else {
            return Ok(None);
        };

        order.delivery_person_id = Some(delivery_person_id);
        order.updated_at = Utc::now();
        Ok(Some(order.clone()))
    }

    async fn find(&self, query: &OrderQuery, page: &PageRequest) -> Result<(Vec<Order>, u64)> {
        let matching: Vec<Order> = self
            .tables
            .read()
            .orders
            .iter()
            .filter(|order| query.matches(order))
            .cloned()
            .collect();
        let total = matching.len() as u64;

        Ok((ordered(matching, page), total))
    }
}

#[async_trait]
impl ReviewRepository for MemoryStore {
    async fn append(
        &self,
        subject: ReviewSubject,
        review: &Review,
    ) -> Result<Option<RatingAggregate>> {
        let mut guard = self.tables.write();
        let tables = &mut *guard;
        let rating = Rating::try_from(i64::from(review.rating))?;

        let aggregate = match subject {
            ReviewSubject::Seller(id) => tables.users.get_mut(&id).map(|user| {
                let mut aggregate = user.aggregate();
                aggregate.push(rating);
                user.apply(aggregate);
                aggregate
            }),
            ReviewSubject::Item(id) => tables.items.get_mut(&id).map(|item| {
                let mut aggregate = item.aggregate();
                aggregate.push(rating);
                item.apply(aggregate);
                aggregate
            }),
        };

        if aggregate.is_some() {
            tables.reviews.entry(subject).or_default().push(review.clone());
        }

        Ok(aggregate)
    }

    async fn list(
        &self,
        subject: ReviewSubject,
        page: &PageRequest,
    ) -> Result<Option<(Vec<Review>, u64)>> {
        let tables = self.tables.read();
        let exists = match subject {
            ReviewSubject::Seller(id) => tables.users.contains_key(&id),
            ReviewSubject::Item(id) => tables.items.contains_key(&id),
        };
        if !exists {
            return Ok(None);
        }

        let reviews = tables.reviews.get(&subject).cloned().unwrap_or_default();
        let total = reviews.len() as u64;

        Ok(Some((ordered(reviews, page), total)))
    }
}
