use crate::state::AppState;
use axum::Router;

mod dto;
pub mod handlers;
pub mod services;

pub use dto::AuthResponse;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::auth_routes())
}
