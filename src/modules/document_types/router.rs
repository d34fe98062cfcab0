use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    create_document_type, delete_document_type, get_document_type, get_document_type_by_name,
    get_document_types, replace_document_type, update_document_type,
};

pub fn init_document_types_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_document_types).post(create_document_type))
        .route(
            "/{id}",
            get(get_document_type)
                .put(replace_document_type)
                .patch(update_document_type)
                .delete(delete_document_type),
        )
        .route("/name/{name}", get(get_document_type_by_name))
}
