//! Route definitions for the `/properties` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::property;
use crate::state::AppState;

/// Routes mounted at `/properties`.
///
/// ```text
/// GET    /            -> list_properties (HR)
/// POST   /            -> create_property (HR)
/// GET    /{id}        -> get_property
/// PUT    /{id}        -> update_property (HR)
/// GET    /{id}/info   -> property_info (public)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(property::list_properties).post(property::create_property),
        )
        .route(
            "/{id}",
            get(property::get_property).put(property::update_property),
        )
        .route("/{id}/info", get(property::property_info))
}
