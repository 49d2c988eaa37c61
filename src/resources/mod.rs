//! The three CRUD collections and the generic router that exposes each of
//! them under `/api/<path>`.

pub mod handlers;
pub mod products;
pub mod students;
pub mod users;

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::{
    state::AppState,
    store::{Record, Store},
};

pub use products::Product;
pub use students::Student;
pub use users::User;

/// A record type served by the generic router.
pub trait Resource: Record {
    /// Mount point below `/api`.
    const PATH: &'static str;

    fn store(state: &AppState) -> &Arc<dyn Store<Self>>;
}

impl Resource for User {
    const PATH: &'static str = "/users";

    fn store(state: &AppState) -> &Arc<dyn Store<Self>> {
        &state.users
    }
}

impl Resource for Product {
    const PATH: &'static str = "/products";

    fn store(state: &AppState) -> &Arc<dyn Store<Self>> {
        &state.products
    }
}

impl Resource for Student {
    const PATH: &'static str = "/students";

    fn store(state: &AppState) -> &Arc<dyn Store<Self>> {
        &state.students
    }
}

pub fn router<R: Resource>() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list::<R>).post(handlers::create::<R>))
        .route(
            "/:id",
            get(handlers::fetch::<R>)
                .put(handlers::update::<R>)
                .delete(handlers::remove::<R>),
        )
}

/// All collections, ready to be nested under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest(User::PATH, router::<User>())
        .nest(Product::PATH, router::<Product>())
        .nest(Student::PATH, router::<Student>())
}
