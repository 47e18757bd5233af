use axum::response::{Html, IntoResponse, Response};
use http::StatusCode;
use tracing::{debug, error};

pub type AppResult<T, E = AppError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid query parameter: {0}")]
    InvalidQuery(&'static str),

    #[error("Data error: {0}")]
    DataError(bookcat_dal::Error),

    #[error("Session error: {0}")]
    SessionError(#[from] tower_sessions::session::Error),

    #[error("Session not available")]
    MissingSession,

    #[error("Template error: {0}")]
    TemplateError(#[from] minijinja::Error),

    #[error("Paging error: {0}")]
    PagingError(#[from] std::num::TryFromIntError),
}

impl From<bookcat_dal::Error> for AppError {
    fn from(value: bookcat_dal::Error) -> Self {
        match value {
            bookcat_dal::Error::RecordNotFound(what) => AppError::NotFound(what),
            other => AppError::DataError(other),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = if status.is_server_error() {
            error!("Request failed: {self}");
            status.canonical_reason().unwrap_or_default().to_string()
        } else {
            debug!("Request rejected: {self}");
            self.to_string()
        };
        let body = format!(
            "<!DOCTYPE html><html><head><title>{code}</title></head><body><h1>{code}</h1><p>{detail}</p><p><a href=\"/\">Home</a></p></body></html>",
            code = status.as_u16(),
        );
        (status, Html(body)).into_response()
    }
}
