pub mod dto;
pub mod handlers;
pub mod jwt;
pub mod password;

use crate::state::AppState;
use axum::Router;

pub use jwt::{AuthUser, Claims, JwtKeys};

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
