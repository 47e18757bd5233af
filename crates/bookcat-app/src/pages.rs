use axum::{response::IntoResponse, routing::get};

use crate::{error::AppResult, state::AppState, templates::View};

pub async fn index(view: View) -> AppResult<impl IntoResponse> {
    view.render("index.html", ()).await
}

pub async fn about(view: View) -> AppResult<impl IntoResponse> {
    view.render("about.html", ()).await
}

pub async fn contacts(view: View) -> AppResult<impl IntoResponse> {
    view.render("contacts.html", ()).await
}

pub async fn health() -> &'static str {
    "OK"
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", get(index))
        .route("/about/", get(about))
        .route("/contacts/", get(contacts))
        .route("/health", get(health))
}
