use axum::{
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};

use crate::handlers::publications;
use crate::middleware::{auth::protect, guard::RouteGuard};
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let read = Router::new()
        .route("/", get(publications::list_publications))
        .route("/:id", get(publications::get_publication));

    let write = Router::new()
        .route("/", post(publications::create_publication))
        .route(
            "/:id",
            patch(publications::update_publication).delete(publications::delete_publication),
        )
        .route_layer(from_fn_with_state((state.clone(), RouteGuard::ADMIN), protect));

    read.merge(write)
}
