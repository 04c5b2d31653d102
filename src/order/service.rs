//! Order lifecycle: checkout, delivery code, closing transitions.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::{Otp, OtpHasher, transaction_id};
use crate::error::{Result, ServerError};
use crate::item::ItemRepository;
use crate::money::{check_quantity, order_total};
use crate::order::{
    LineItem, Lookups, Order, OrderQuery, OrderRepository, OrderStatus, OrderView, PlacedOrder,
    Visibility,
};
use crate::pagination::{Page, PageRequest};
use crate::user::UserRepository;

const NOT_PENDING: &str = "Order not found or already completed.";

/// Line requested at checkout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRequest {
    pub item_id: Uuid,
    pub quantity: i32,
}

/// Order manager.
#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    items: Arc<dyn ItemRepository>,
    users: Arc<dyn UserRepository>,
    hasher: OtpHasher,
}

impl OrderService {
    /// Create a new [`OrderService`].
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        items: Arc<dyn ItemRepository>,
        users: Arc<dyn UserRepository>,
        hasher: OtpHasher,
    ) -> Self {
        Self {
            orders,
            items,
            users,
            hasher,
        }
    }

    /// Place a `Pending` order and hand back its delivery code.
    ///
    /// Prices are taken from the catalog; `total_amount`, when given, must
    /// match the computed total.
    pub async fn place_order(
        &self,
        buyer_id: Uuid,
        lines: Vec<LineRequest>,
        total_amount: Option<Decimal>,
    ) -> Result<PlacedOrder> {
        if lines.is_empty() {
            return Err(ServerError::field("items", "required", "Items are required."));
        }

        let mut merged: Vec<LineRequest> = Vec::with_capacity(lines.len());
        for line in lines {
            check_quantity(line.quantity)?;
            match merged.iter_mut().find(|m| m.item_id == line.item_id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                    check_quantity(existing.quantity)?;
                }
                None => merged.push(line),
            }
        }

        let ids: Vec<Uuid> = merged.iter().map(|line| line.item_id).collect();
        let prices: HashMap<Uuid, Decimal> = self
            .items
            .find_many(&ids)
            .await?
            .into_iter()
            .map(|item| (item.id, item.price))
            .collect();

        let items = merged
            .into_iter()
            .map(|line| {
                let unit_price = prices.get(&line.item_id).copied().ok_or_else(|| {
                    ServerError::field("items", "unknown_item", "Item does not exist.")
                })?;
                Ok(LineItem {
                    item_id: line.item_id,
                    quantity: line.quantity,
                    unit_price,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let computed = order_total(items.iter().map(LineItem::amount))?;
        if total_amount.is_some_and(|claimed| claimed != computed) {
            return Err(ServerError::field(
                "totalAmount",
                "mismatch",
                "Total amount does not match item prices.",
            ));
        }

        let otp = Otp::generate();
        let hashed_otp = self.hasher.hash(&otp).await?;

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            transaction_id: transaction_id(),
            buyer_id,
            items,
            total_amount: computed,
            hashed_otp,
            status: OrderStatus::Pending,
            delivery_person_id: None,
            created_at: now,
            updated_at: now,
        };
        self.orders.insert(&order).await?;

        metrics::counter!("orders_placed_total").increment(1);
        tracing::info!(
            order_id = %order.id,
            transaction_id = order.transaction_id,
            %buyer_id,
            lines = order.items.len(),
            total_amount = %order.total_amount,
            "order placed"
        );

        Ok(PlacedOrder { order, otp })
    }

    /// Place an order from the buyer cart, then empty the cart.
    pub async fn checkout(
        &self,
        buyer_id: Uuid,
        total_amount: Option<Decimal>,
    ) -> Result<PlacedOrder> {
        let lines = self
            .users
            .cart(buyer_id)
            .await?
            .into_iter()
            .map(|entry| LineRequest {
                item_id: entry.item_id,
                quantity: entry.quantity,
            })
            .collect();

        let placed = self.place_order(buyer_id, lines, total_amount).await?;

        // The order is committed at this point, a stale cart is not fatal.
        if let Err(err) = self.users.clear_cart(buyer_id).await {
            tracing::warn!(%buyer_id, order_id = %placed.order.id, error = %err, "cart not cleared after checkout");
        }

        Ok(placed)
    }

    /// Seller closes an order with the buyer delivery code.
    pub async fn close_order(&self, closer_id: Uuid, order_id: Uuid, otp: &str) -> Result<Order> {
        let order = self.pending(order_id).await?;

        if !self.sellers_of(&order).await?.contains(&closer_id) {
            return Err(ServerError::Forbidden("Not authorized to close this order."));
        }

        self.check_otp(otp, &order).await?;
        self.commit(order, OrderStatus::Completed).await
    }

    /// Assigned delivery person confirms handoff with the delivery code.
    pub async fn verify_and_deliver(
        &self,
        deliverer_id: Uuid,
        order_id: Uuid,
        otp: &str,
    ) -> Result<Order> {
        let order = self.pending(order_id).await?;

        if order.delivery_person_id != Some(deliverer_id) {
            return Err(ServerError::NotFound(NOT_PENDING));
        }

        self.check_otp(otp, &order).await?;
        self.commit(order, OrderStatus::Delivered).await
    }

    /// A seller of the order designates who may deliver it.
    pub async fn assign_delivery(
        &self,
        seller_id: Uuid,
        order_id: Uuid,
        delivery_person_id: Uuid,
    ) -> Result<Order> {
        let order = self.pending(order_id).await?;

        if !self.sellers_of(&order).await?.contains(&seller_id) {
            return Err(ServerError::Forbidden("Not authorized to assign this order."));
        }
        if self.users.find_by_id(delivery_person_id).await?.is_none() {
            return Err(ServerError::NotFound("Delivery person not found."));
        }

        let order = self
            .orders
            .assign_delivery(order_id, delivery_person_id)
            .await?
            .ok_or(ServerError::NotFound(NOT_PENDING))?;
        tracing::info!(%order_id, %seller_id, %delivery_person_id, "delivery person assigned");

        Ok(order)
    }

    /// Orders bought by the user or containing one of their items.
    pub async fn visible_to(&self, user_id: Uuid, page: PageRequest) -> Result<Page<Order>> {
        let visibility = self.visibility(user_id).await?;
        let (orders, total) = self.orders.find(&visibility.query(), &page).await?;

        Ok(Page::new(orders, total, &page).map(|order| visibility.view(order)))
    }

    /// One order, if visible to the user.
    pub async fn find_visible(&self, user_id: Uuid, order_id: Uuid) -> Result<Order> {
        let visibility = self.visibility(user_id).await?;
        let (orders, _) = self
            .orders
            .find(&visibility.query().id(order_id), &PageRequest::new(1, 1))
            .await?;
        let order = orders
            .into_iter()
            .next()
            .ok_or(ServerError::NotFound("Order not found."))?;

        Ok(visibility.view(order))
    }

    /// Orders placed by the buyer.
    pub async fn as_buyer(&self, buyer_id: Uuid, page: PageRequest) -> Result<Page<Order>> {
        let query = OrderQuery {
            buyer_id: Some(buyer_id),
            ..Default::default()
        };
        let (orders, total) = self.orders.find(&query, &page).await?;

        Ok(Page::new(orders, total, &page))
    }

    /// Orders containing the seller's items, reduced to the seller's lines.
    pub async fn for_seller(
        &self,
        seller_id: Uuid,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> Result<Page<Order>> {
        let visibility = self.visibility(seller_id).await?;
        if !visibility.has_items() {
            return Ok(Page::new(Vec::new(), 0, &page));
        }

        let query = match status {
            Some(status) => visibility.seller_query().status(status),
            None => visibility.seller_query(),
        };
        let (orders, total) = self.orders.find(&query, &page).await?;

        Ok(Page::new(orders, total, &page).map(|order| visibility.seller_view(order)))
    }

    /// Join item and buyer details into a page of orders.
    pub async fn populate(&self, page: Page<Order>) -> Result<Page<OrderView>> {
        let lookups = self.lookups(&page.data).await?;
        Ok(page.map(|order| OrderView::new(order, &lookups)))
    }

    pub async fn populate_one(&self, order: Order) -> Result<OrderView> {
        let lookups = self.lookups(std::slice::from_ref(&order)).await?;
        Ok(OrderView::new(order, &lookups))
    }

    async fn lookups(&self, orders: &[Order]) -> Result<Lookups> {
        let mut item_ids: Vec<Uuid> = orders
            .iter()
            .flat_map(|order| order.items.iter().map(|line| line.item_id))
            .collect();
        item_ids.sort_unstable();
        item_ids.dedup();

        let mut buyer_ids: Vec<Uuid> = orders.iter().map(|order| order.buyer_id).collect();
        buyer_ids.sort_unstable();
        buyer_ids.dedup();

        Ok(Lookups {
            items: self
                .items
                .find_many(&item_ids)
                .await?
                .into_iter()
                .map(|item| (item.id, item.into()))
                .collect(),
            buyers: self
                .users
                .find_many(&buyer_ids)
                .await?
                .into_iter()
                .map(|user| (user.id, user.into()))
                .collect(),
        })
    }

    async fn visibility(&self, user_id: Uuid) -> Result<Visibility> {
        let owned = self.items.ids_by_seller(user_id).await?;
        Ok(Visibility::new(user_id, owned))
    }

    async fn pending(&self, order_id: Uuid) -> Result<Order> {
        self.orders
            .find_by_id(order_id)
            .await?
            .filter(|order| !order.status.is_terminal())
            .ok_or(ServerError::NotFound(NOT_PENDING))
    }

    /// Sellers of the items still present in the catalog.
    async fn sellers_of(&self, order: &Order) -> Result<HashSet<Uuid>> {
        let ids: Vec<Uuid> = order.items.iter().map(|line| line.item_id).collect();
        Ok(self
            .items
            .find_many(&ids)
            .await?
            .into_iter()
            .map(|item| item.seller_id)
            .collect())
    }

    async fn check_otp(&self, otp: &str, order: &Order) -> Result<()> {
        if otp.is_empty() {
            return Err(ServerError::field("otp", "required", "OTP is required."));
        }

        if !self.hasher.verify(otp, &order.hashed_otp).await? {
            tracing::warn!(order_id = %order.id, "invalid delivery code submitted");
            return Err(ServerError::field("otp", "invalid_otp", "Invalid OTP."));
        }

        Ok(())
    }

    async fn commit(&self, order: Order, to: OrderStatus) -> Result<Order> {
        let order = self
            .orders
            .transition(order.id, OrderStatus::Pending, to)
            .await?
            .ok_or(ServerError::NotFound(NOT_PENDING))?;

        metrics::counter!("orders_closed_total", "transition" => to.as_str()).increment(1);
        tracing::info!(order_id = %order.id, status = to.as_str(), "order closed");

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::database::tests::{seed_item, seed_user};
    use crate::money::{MAX_AMOUNT, MAX_QUANTITY};
    use crate::pagination::SortOrder;

    fn service(store: &Arc<MemoryStore>) -> OrderService {
        OrderService::new(store.clone(), store.clone(), store.clone(), OtpHasher::new(4))
    }

    fn line(item_id: Uuid, quantity: i32) -> LineRequest {
        LineRequest { item_id, quantity }
    }

    fn wrong(otp: &Otp) -> &'static str {
        if otp.as_str() == "123456" { "654321" } else { "123456" }
    }

    #[tokio::test]
    async fn test_place_order() {
        let store = Arc::new(MemoryStore::default());
        let buyer = seed_user(&store, "buyer").await;
        let seller = seed_user(&store, "seller").await;
        let item = seed_item(&store, seller.id, 100).await;
        let orders = service(&store);

        let placed = orders
            .place_order(buyer.id, vec![line(item.id, 2)], Some(Decimal::from(200)))
            .await
            .unwrap();

        assert_eq!(placed.order.status, OrderStatus::Pending);
        assert_eq!(placed.order.items.len(), 1);
        assert_eq!(placed.order.items[0].item_id, item.id);
        assert_eq!(placed.order.items[0].quantity, 2);
        assert_eq!(placed.order.total_amount, Decimal::from(200));

        let code: u32 = placed.otp.as_str().parse().unwrap();
        assert!((100_000..=999_999).contains(&code));

        let stored = store.order(placed.order.id).unwrap();
        assert_ne!(stored.hashed_otp.as_str(), placed.otp.as_str());
        assert!(bcrypt::verify(placed.otp.as_str(), stored.hashed_otp.as_str()).unwrap());
    }

    #[tokio::test]
    async fn test_place_order_rejections() {
        let store = Arc::new(MemoryStore::default());
        let buyer = seed_user(&store, "buyer").await;
        let seller = seed_user(&store, "seller").await;
        let item = seed_item(&store, seller.id, 100).await;
        let orders = service(&store);

        let cases = [
            (vec![], None),
            (vec![line(item.id, 0)], None),
            (vec![line(Uuid::new_v4(), 1)], None),
            (vec![line(item.id, 2)], Some(Decimal::from(1))),
        ];
        for (lines, total) in cases {
            let err = orders.place_order(buyer.id, lines, total).await.unwrap_err();
            assert!(matches!(err, ServerError::Validation(_)));
        }

        assert!(store.orders().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_lines_are_merged() {
        let store = Arc::new(MemoryStore::default());
        let buyer = seed_user(&store, "buyer").await;
        let seller = seed_user(&store, "seller").await;
        let item = seed_item(&store, seller.id, 15).await;
        let orders = service(&store);

        let placed = orders
            .place_order(buyer.id, vec![line(item.id, 1), line(item.id, 3)], None)
            .await
            .unwrap();

        assert_eq!(placed.order.items.len(), 1);
        assert_eq!(placed.order.items[0].quantity, 4);
        assert_eq!(placed.order.total_amount, Decimal::from(60));
    }

    #[tokio::test]
    async fn test_merged_quantity_is_bounded() {
        let store = Arc::new(MemoryStore::default());
        let buyer = seed_user(&store, "buyer").await;
        let seller = seed_user(&store, "seller").await;
        let item = seed_item(&store, seller.id, 1).await;
        let orders = service(&store);

        let lines = vec![line(item.id, MAX_QUANTITY), line(item.id, MAX_QUANTITY)];
        let err = orders.place_order(buyer.id, lines, None).await.unwrap_err();
        assert!(matches!(err, ServerError::Validation(_)));

        let lines = vec![line(item.id, i32::MAX), line(item.id, i32::MAX)];
        let err = orders.place_order(buyer.id, lines, None).await.unwrap_err();
        assert!(matches!(err, ServerError::Validation(_)));

        let placed = orders
            .place_order(buyer.id, vec![line(item.id, MAX_QUANTITY)], None)
            .await
            .unwrap();
        assert_eq!(placed.order.total_amount, Decimal::from(MAX_QUANTITY));
    }

    #[tokio::test]
    async fn test_total_over_storable_amount() {
        let store = Arc::new(MemoryStore::default());
        let buyer = seed_user(&store, "buyer").await;
        let seller = seed_user(&store, "seller").await;
        let mut item = seed_item(&store, seller.id, 1).await;
        item.price = MAX_AMOUNT;
        ItemRepository::insert(&*store, &item).await.unwrap();
        let orders = service(&store);

        let placed = orders
            .place_order(buyer.id, vec![line(item.id, 1)], Some(MAX_AMOUNT))
            .await
            .unwrap();
        assert_eq!(placed.order.total_amount, MAX_AMOUNT);

        for quantity in [2, MAX_QUANTITY] {
            let err = orders
                .place_order(buyer.id, vec![line(item.id, quantity)], None)
                .await
                .unwrap_err();
            assert!(matches!(err, ServerError::Validation(_)));
        }
        assert_eq!(store.orders().len(), 1);
    }

    #[tokio::test]
    async fn test_populate_joins_items_and_buyer() {
        let store = Arc::new(MemoryStore::default());
        let buyer = seed_user(&store, "buyer").await;
        let seller = seed_user(&store, "seller").await;
        let kept = seed_item(&store, seller.id, 10).await;
        let removed = seed_item(&store, seller.id, 20).await;
        let orders = service(&store);

        orders
            .place_order(buyer.id, vec![line(kept.id, 1), line(removed.id, 1)], None)
            .await
            .unwrap();
        ItemRepository::delete(&*store, removed.id).await.unwrap();

        let page = orders
            .as_buyer(buyer.id, PageRequest::new(1, 10))
            .await
            .unwrap();
        let page = orders.populate(page).await.unwrap();

        let view = &page.data[0];
        assert_eq!(view.buyer.as_ref().map(|b| b.first_name.as_str()), Some("buyer"));
        assert_eq!(view.items[0].item.as_ref().map(|i| i.seller_id), Some(seller.id));
        assert!(view.items[1].item.is_none());
        assert_eq!(view.total_amount, Decimal::from(30));
    }

    #[tokio::test]
    async fn test_close_order_lifecycle() {
        let store = Arc::new(MemoryStore::default());
        let buyer = seed_user(&store, "buyer").await;
        let seller = seed_user(&store, "seller").await;
        let item = seed_item(&store, seller.id, 100).await;
        let orders = service(&store);

        let placed = orders
            .place_order(buyer.id, vec![line(item.id, 2)], Some(Decimal::from(200)))
            .await
            .unwrap();

        let err = orders
            .close_order(seller.id, placed.order.id, wrong(&placed.otp))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Validation(_)));

        let closed = orders
            .close_order(seller.id, placed.order.id, placed.otp.as_str())
            .await
            .unwrap();
        assert_eq!(closed.status, OrderStatus::Completed);
        assert_eq!(closed.hashed_otp, store.order(placed.order.id).unwrap().hashed_otp);

        // No replay, whatever the code.
        for otp in [placed.otp.as_str(), wrong(&placed.otp)] {
            let err = orders
                .close_order(seller.id, placed.order.id, otp)
                .await
                .unwrap_err();
            assert!(matches!(err, ServerError::NotFound(_)));
        }
    }

    #[tokio::test]
    async fn test_close_order_requires_seller() {
        let store = Arc::new(MemoryStore::default());
        let buyer = seed_user(&store, "buyer").await;
        let seller = seed_user(&store, "seller").await;
        let stranger = seed_user(&store, "stranger").await;
        let item = seed_item(&store, seller.id, 100).await;
        let orders = service(&store);

        let placed = orders
            .place_order(buyer.id, vec![line(item.id, 1)], None)
            .await
            .unwrap();

        for user in [stranger.id, buyer.id] {
            let err = orders
                .close_order(user, placed.order.id, placed.otp.as_str())
                .await
                .unwrap_err();
            assert!(matches!(err, ServerError::Forbidden(_)));
        }
        assert_eq!(store.order(placed.order.id).unwrap().status, OrderStatus::Pending);

        let err = orders
            .close_order(seller.id, Uuid::new_v4(), placed.otp.as_str())
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_concurrent_close_single_winner() {
        let store = Arc::new(MemoryStore::default());
        let buyer = seed_user(&store, "buyer").await;
        let seller = seed_user(&store, "seller").await;
        let item = seed_item(&store, seller.id, 100).await;
        let orders = service(&store);

        let placed = orders
            .place_order(buyer.id, vec![line(item.id, 1)], None)
            .await
            .unwrap();

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let orders = orders.clone();
                let otp = placed.otp.as_str().to_owned();
                let id = placed.order.id;
                tokio::spawn(async move { orders.close_order(seller.id, id, &otp).await })
            })
            .collect();

        let mut successes = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(order) => {
                    assert_eq!(order.status, OrderStatus::Completed);
                    successes += 1;
                },
                Err(err) => assert!(matches!(err, ServerError::NotFound(_))),
            }
        }
        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn test_delivery_person_path() {
        let store = Arc::new(MemoryStore::default());
        let buyer = seed_user(&store, "buyer").await;
        let seller = seed_user(&store, "seller").await;
        let courier = seed_user(&store, "courier").await;
        let item = seed_item(&store, seller.id, 100).await;
        let orders = service(&store);

        let placed = orders
            .place_order(buyer.id, vec![line(item.id, 1)], None)
            .await
            .unwrap();

        // Nobody is assigned yet.
        let err = orders
            .verify_and_deliver(courier.id, placed.order.id, placed.otp.as_str())
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::NotFound(_)));

        let err = orders
            .assign_delivery(courier.id, placed.order.id, courier.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Forbidden(_)));

        let assigned = orders
            .assign_delivery(seller.id, placed.order.id, courier.id)
            .await
            .unwrap();
        assert_eq!(assigned.delivery_person_id, Some(courier.id));

        let err = orders
            .verify_and_deliver(buyer.id, placed.order.id, placed.otp.as_str())
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::NotFound(_)));

        let delivered = orders
            .verify_and_deliver(courier.id, placed.order.id, placed.otp.as_str())
            .await
            .unwrap();
        assert_eq!(delivered.status, OrderStatus::Delivered);

        let err = orders
            .close_order(seller.id, placed.order.id, placed.otp.as_str())
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_checkout_clears_cart() {
        let store = Arc::new(MemoryStore::default());
        let buyer = seed_user(&store, "buyer").await;
        let seller = seed_user(&store, "seller").await;
        let lamp = seed_item(&store, seller.id, 30).await;
        let desk = seed_item(&store, seller.id, 120).await;
        let orders = service(&store);

        let err = orders.checkout(buyer.id, None).await.unwrap_err();
        assert!(matches!(err, ServerError::Validation(_)));

        store.add_to_cart(buyer.id, lamp.id, 2).await.unwrap();
        store.add_to_cart(buyer.id, desk.id, 1).await.unwrap();

        let placed = orders.checkout(buyer.id, Some(Decimal::from(180))).await.unwrap();
        assert_eq!(placed.order.items.len(), 2);
        assert!(store.cart(buyer.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_seller_sees_own_lines_only() {
        let store = Arc::new(MemoryStore::default());
        let buyer = seed_user(&store, "buyer").await;
        let seller = seed_user(&store, "seller").await;
        let other_seller = seed_user(&store, "other").await;
        let own = seed_item(&store, seller.id, 10).await;
        let foreign = seed_item(&store, other_seller.id, 20).await;
        let orders = service(&store);

        let placed = orders
            .place_order(buyer.id, vec![line(own.id, 1), line(foreign.id, 1)], None)
            .await
            .unwrap();

        let page = orders
            .visible_to(seller.id, PageRequest::new(1, 10))
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].items.len(), 1);
        assert_eq!(page.data[0].items[0].item_id, own.id);

        let page = orders
            .visible_to(buyer.id, PageRequest::new(1, 10))
            .await
            .unwrap();
        assert_eq!(page.data[0].items.len(), 2);

        let view = orders.find_visible(other_seller.id, placed.order.id).await.unwrap();
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].item_id, foreign.id);

        let stranger = seed_user(&store, "stranger").await;
        let err = orders
            .find_visible(stranger.id, placed.order.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_seller_listings() {
        let store = Arc::new(MemoryStore::default());
        let buyer = seed_user(&store, "buyer").await;
        let seller = seed_user(&store, "seller").await;
        let item = seed_item(&store, seller.id, 10).await;
        let orders = service(&store);

        let mut placed = Vec::new();
        for quantity in 1..=3 {
            placed.push(
                orders
                    .place_order(buyer.id, vec![line(item.id, quantity)], None)
                    .await
                    .unwrap(),
            );
        }
        orders
            .close_order(seller.id, placed[0].order.id, placed[0].otp.as_str())
            .await
            .unwrap();

        let all = orders
            .for_seller(seller.id, None, PageRequest::new(1, 10))
            .await
            .unwrap();
        assert_eq!(all.total, 3);
        // Newest first.
        assert_eq!(all.data[0].id, placed[2].order.id);

        let oldest = orders
            .for_seller(seller.id, None, PageRequest::new(1, 10).order(SortOrder::Oldest))
            .await
            .unwrap();
        assert_eq!(oldest.data[0].id, placed[0].order.id);

        let pending = orders
            .for_seller(seller.id, Some(OrderStatus::Pending), PageRequest::new(1, 10))
            .await
            .unwrap();
        assert_eq!(pending.total, 2);

        let none = orders
            .for_seller(buyer.id, None, PageRequest::new(1, 10))
            .await
            .unwrap();
        assert!(none.data.is_empty());

        let bought = orders.as_buyer(buyer.id, PageRequest::new(1, 2)).await.unwrap();
        assert_eq!(bought.total, 3);
        assert_eq!(bought.total_pages, 2);
        assert_eq!(bought.data.len(), 2);
    }
}
