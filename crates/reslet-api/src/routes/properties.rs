//! # Property Listings
//!
//! Public, read-only listing endpoints. Listings have no write surface —
//! rows arrive via migration seeds or operator inserts.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use reslet_core::PropertyId;

use crate::error::AppError;
use crate::state::{AppState, PropertyRecord};

/// Build the property listings router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/properties", get(list_properties))
        .route("/properties/:id", get(get_property))
}

/// GET /properties — List all properties, newest first.
#[utoipa::path(
    get,
    path = "/properties",
    responses(
        (status = 200, description = "Property list", body = [PropertyRecord]),
    ),
    tag = "properties"
)]
async fn list_properties(State(state): State<AppState>) -> Json<Vec<PropertyRecord>> {
    let mut properties = state.properties.list();
    properties.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Json(properties)
}

/// GET /properties/:id — Get one property.
#[utoipa::path(
    get,
    path = "/properties/{id}",
    params(("id" = Uuid, Path, description = "Property ID")),
    responses(
        (status = 200, description = "Property found", body = PropertyRecord),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "properties"
)]
async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PropertyRecord>, AppError> {
    let id = PropertyId::from_uuid(id);
    state
        .properties
        .get(&id)
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("property {id} not found")))
}
