use std::sync::Arc;

use axum::{Router, routing::get};

use crate::game::TableRegistry;

pub fn create_routes(registry: Arc<TableRegistry>) -> Router {
    Router::new()
        .route("/ws", get(crate::web_socket::ws_handler))
        .with_state(registry)
}
