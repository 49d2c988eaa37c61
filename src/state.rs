use std::sync::Arc;

use anyhow::Context;
use time::OffsetDateTime;
use tracing::info;

use crate::{
    auth::password::hash_password,
    config::AppConfig,
    resources::{products, students, users, Product, Student, User},
    store::{MemoryStore, Store},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn Store<User>>,
    pub products: Arc<dyn Store<Product>>,
    pub students: Arc<dyn Store<Student>>,
    /// Auth accounts. Kept apart from the `/api/users` collection.
    pub accounts: Arc<dyn Store<User>>,
}

impl AppState {
    /// In-memory stores, seeded unless `SEED_DATA=false`.
    pub fn init(config: AppConfig) -> anyhow::Result<Self> {
        let ids = config.id_strategy;
        let (user_seed, product_seed, student_seed, account_seed) = if config.seed_data {
            let admin = User {
                id: 1,
                username: "admin".into(),
                email: "admin@example.com".into(),
                password_hash: Some(
                    hash_password(&config.admin_password).context("hash admin password")?,
                ),
                created_at: OffsetDateTime::now_utc(),
            };
            (users::seed(), products::seed(), students::seed(), vec![admin])
        } else {
            Default::default()
        };

        info!(
            users = user_seed.len(),
            products = product_seed.len(),
            students = student_seed.len(),
            accounts = account_seed.len(),
            id_strategy = ?ids,
            "collections initialised"
        );

        Ok(Self {
            config: Arc::new(config),
            users: Arc::new(MemoryStore::with_records(ids, user_seed)),
            products: Arc::new(MemoryStore::with_records(ids, product_seed)),
            students: Arc::new(MemoryStore::with_records(ids, student_seed)),
            accounts: Arc::new(MemoryStore::with_records(ids, account_seed)),
        })
    }

    /// Wire arbitrary store implementations, e.g. a persistent backend.
    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn Store<User>>,
        products: Arc<dyn Store<Product>>,
        students: Arc<dyn Store<Student>>,
        accounts: Arc<dyn Store<User>>,
    ) -> Self {
        Self {
            config,
            users,
            products,
            students,
            accounts,
        }
    }
}
