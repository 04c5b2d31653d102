//! database (db) union structure.
mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::postgres::PgPoolOptions;

use crate::AppState;
use crate::item::ItemRepository;
use crate::order::OrderRepository;
use crate::review::ReviewRepository;
use crate::user::UserRepository;

pub const DEFAULT_CREDENTIALS: &str = "postgres";
pub const DEFAULT_DATABASE_NAME: &str = "marketplace";
pub const DEFAULT_POOL_SIZE: u32 = 10;

/// Custom db structure to pass to Axum.
///
/// Every repository points to the same backing store.
#[derive(Clone)]
pub struct Database {
    pub users: Arc<dyn UserRepository>,
    pub items: Arc<dyn ItemRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub reviews: Arc<dyn ReviewRepository>,
}

impl Database {
    /// Init database connections and run migrations.
    pub async fn postgres(
        hostname: &str,
        username: &str,
        password: &str,
        db: &str,
        pool: u32,
    ) -> Result<Self, sqlx::Error> {
        let addr = format!("postgres://{username}:{password}@{hostname}/{db}");
        let pool = PgPoolOptions::new().max_connections(pool);
        let postgres = pool.connect(&addr).await?;

        tracing::info!(%hostname, %db, "postgres connected");

        // execute migrations scripts on start.
        sqlx::migrate!()
            .run(&postgres)
            .await
            .map_err(|err| sqlx::Error::Migrate(Box::new(err)))?;

        Ok(Self::from_store(Arc::new(PostgresStore::new(postgres))))
    }

    /// Volatile store, lost on restart.
    pub fn memory() -> Self {
        Self::from_store(Arc::new(MemoryStore::default()))
    }

    fn from_store<S>(store: Arc<S>) -> Self
    where
        S: UserRepository + ItemRepository + OrderRepository + ReviewRepository + 'static,
    {
        Self {
            users: store.clone(),
            items: store.clone(),
            orders: store.clone(),
            reviews: store,
        }
    }
}

impl FromRef<AppState> for Database {
    fn from_ref(app_state: &AppState) -> Database {
        app_state.db.clone()
    }
}
