use axum::{extract::State, http::StatusCode, response::Response};

use crate::{
    envelope::Envelope,
    models::collection::CollectionsBody,
    services::collection::collection_methods,
    state::AppState,
};

/// Lists the merchant's collection methods.
pub async fn list_collection_methods(State(state): State<AppState>) -> Response {
    Envelope::success(CollectionsBody {
        collections: collection_methods(&state.config),
    })
    .respond(StatusCode::OK)
}
