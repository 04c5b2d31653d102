//! PostgreSQL implementation of every repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::item::{Item, ItemChanges, ItemRepository};
use crate::money::{MAX_QUANTITY, check_quantity, quantity_range};
use crate::order::{Order, OrderQuery, OrderRepository, OrderStatus};
use crate::pagination::{PageRequest, SortOrder};
use crate::review::{RatingAggregate, Review, ReviewRepository, ReviewSubject};
use crate::user::{CartEntry, User, UserRepository};

const ORDER_FILTER: &str = r#"
    (
        buyer_id = $1
        OR EXISTS (
            SELECT 1 FROM jsonb_array_elements(items) AS line
            WHERE (line->>'itemId')::uuid = ANY($2)
        )
    )
    AND ($3::uuid IS NULL OR id = $3)
    AND ($4::order_status IS NULL OR status = $4)
"#;

/// PostgreSQL store.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new [`PostgresStore`].
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn direction(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Newest => "DESC",
        SortOrder::Oldest => "ASC",
    }
}

fn subject_table(subject: ReviewSubject) -> &'static str {
    match subject {
        ReviewSubject::Seller(_) => "users",
        ReviewSubject::Item(_) => "items",
    }
}

#[async_trait]
impl UserRepository for PostgresStore {
    async fn insert(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, first_name, last_name, email, contact_number, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.contact_number)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT
                id, first_name, last_name, email, contact_number,
                average_rating, total_reviews, rating_sum, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT
                id, first_name, last_name, email, contact_number,
                average_rating, total_reviews, rating_sum, created_at
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn cart(&self, user_id: Uuid) -> Result<Vec<CartEntry>> {
        let entries = sqlx::query_as::<_, CartEntry>(
            r#"SELECT item_id, quantity FROM cart_items WHERE user_id = $1 ORDER BY added_at, item_id"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn add_to_cart(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<Vec<CartEntry>> {
        check_quantity(quantity)?;

        let result = sqlx::query(
            r#"
            INSERT INTO cart_items (user_id, item_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, item_id)
            DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
            WHERE cart_items.quantity + EXCLUDED.quantity <= $4
            "#,
        )
        .bind(user_id)
        .bind(item_id)
        .bind(quantity)
        .bind(MAX_QUANTITY)
        .execute(&self.pool)
        .await?;

        // Conflict row left untouched by the WHERE clause.
        if result.rows_affected() == 0 {
            return Err(quantity_range());
        }

        self.cart(user_id).await
    }

    async fn set_cart_quantity(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<Option<Vec<CartEntry>>> {
        let result = sqlx::query(
            r#"UPDATE cart_items SET quantity = $3 WHERE user_id = $1 AND item_id = $2"#,
        )
        .bind(user_id)
        .bind(item_id)
        .bind(quantity)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.cart(user_id).await.map(Some)
    }

    async fn remove_from_cart(&self, user_id: Uuid, item_id: Uuid) -> Result<Vec<CartEntry>> {
        sqlx::query(r#"DELETE FROM cart_items WHERE user_id = $1 AND item_id = $2"#)
            .bind(user_id)
            .bind(item_id)
            .execute(&self.pool)
            .await?;

        self.cart(user_id).await
    }

    async fn clear_cart(&self, user_id: Uuid) -> Result<()> {
        sqlx::query(r#"DELETE FROM cart_items WHERE user_id = $1"#)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl ItemRepository for PostgresStore {
    async fn insert(&self, item: &Item) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO items (
                id, name, description, price, category, seller_id, images,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(item.id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price)
        .bind(item.category)
        .bind(item.seller_id)
        .bind(&item.images)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(r#"SELECT * FROM items WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(r#"SELECT * FROM items WHERE id = ANY($1)"#)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    async fn ids_by_seller(&self, seller_id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(r#"SELECT id FROM items WHERE seller_id = $1"#)
            .bind(seller_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }

    async fn update(&self, id: Uuid, changes: &ItemChanges) -> Result<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(
            r#"
            UPDATE items
            SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                images = COALESCE($5, images),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(changes.price)
        .bind(&changes.images)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(r#"DELETE FROM items WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl OrderRepository for PostgresStore {
    async fn insert(&self, order: &Order) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, transaction_id, buyer_id, items, total_amount, hashed_otp,
                status, delivery_person_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(order.id)
        .bind(&order.transaction_id)
        .bind(order.buyer_id)
        .bind(sqlx::types::Json(&order.items))
        .bind(order.total_amount)
        .bind(&order.hashed_otp)
        .bind(order.status)
        .bind(order.delivery_person_id)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(r#"SELECT * FROM orders WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    async fn transition(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    async fn assign_delivery(&self, id: Uuid, delivery_person_id: Uuid) -> Result<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders SET delivery_person_id = $2, updated_at = NOW()
            WHERE id = $1 AND status = $3
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(delivery_person_id)
        .bind(OrderStatus::Pending)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    async fn find(&self, query: &OrderQuery, page: &PageRequest) -> Result<(Vec<Order>, u64)> {
        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM orders WHERE {ORDER_FILTER}"
        ))
        .bind(query.buyer_id)
        .bind(&query.item_ids)
        .bind(query.id)
        .bind(query.status)
        .fetch_one(&self.pool)
        .await?;

        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT * FROM orders WHERE {ORDER_FILTER} ORDER BY created_at {}, id LIMIT $5 OFFSET $6",
            direction(page.order)
        ))
        .bind(query.buyer_id)
        .bind(&query.item_ids)
        .bind(query.id)
        .bind(query.status)
        .bind(page.limit as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok((orders, total as u64))
    }
}

#[async_trait]
impl ReviewRepository for PostgresStore {
    async fn append(
        &self,
        subject: ReviewSubject,
        review: &Review,
    ) -> Result<Option<RatingAggregate>> {
        let mut tx = self.pool.begin().await?;

        // Row lock on the subject serializes concurrent reviews.
        let aggregate = sqlx::query_as::<_, (i64, i64)>(&format!(
            r#"
            UPDATE {}
            SET
                total_reviews = total_reviews + 1,
                rating_sum = rating_sum + $2,
                average_rating = (rating_sum + $2)::float8 / (total_reviews + 1)
            WHERE id = $1
            RETURNING total_reviews, rating_sum
            "#,
            subject_table(subject)
        ))
        .bind(subject.id())
        .bind(i64::from(review.rating))
        .fetch_optional(&mut *tx)
        .await?;

        let Some((total_reviews, rating_sum)) = aggregate else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            r#"
            INSERT INTO reviews (id, subject, subject_id, reviewer_id, rating, comment, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(review.id)
        .bind(subject.kind())
        .bind(subject.id())
        .bind(review.reviewer_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(RatingAggregate {
            total_reviews,
            rating_sum,
        }))
    }

    async fn list(
        &self,
        subject: ReviewSubject,
        page: &PageRequest,
    ) -> Result<Option<(Vec<Review>, u64)>> {
        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT total_reviews FROM {} WHERE id = $1",
            subject_table(subject)
        ))
        .bind(subject.id())
        .fetch_optional(&self.pool)
        .await?;

        let Some(total) = total else {
            return Ok(None);
        };

        let reviews = sqlx::query_as::<_, Review>(&format!(
            r#"
            SELECT id, reviewer_id, rating, comment, created_at
            FROM reviews
            WHERE subject = $1 AND subject_id = $2
            ORDER BY seq {}
            LIMIT $3 OFFSET $4
            "#,
            direction(page.order)
        ))
        .bind(subject.kind())
        .bind(subject.id())
        .bind(page.limit as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some((reviews, total as u64)))
    }
}
