//! Server-rendered pages: the public site and the admin panel.

mod admin;
mod pages;
pub mod views;

pub use admin::*;
pub use pages::*;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::errors::AppError;

/// Error rendered as an HTML page rather than a JSON envelope.
#[derive(Debug)]
pub struct PageError(pub AppError);

impl From<AppError> for PageError {
    fn from(err: AppError) -> Self {
        PageError(err)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let message = match &self.0 {
            AppError::StoreCorrupt(_) | AppError::Internal(_) => {
                tracing::error!(error = %self.0, "Page request failed");
                "Something went wrong on our side. Please try again later.".to_string()
            }
            err => err.to_string(),
        };
        let title = status.canonical_reason().unwrap_or("Error");
        let body = views::error_body(status.as_u16(), &message);
        (status, Html(views::plain_page(title, None, &body))).into_response()
    }
}

pub type PageResult<T = Html<String>> = Result<T, PageError>;

/// Fallback for unknown paths.
pub async fn not_found() -> Response {
    let body = views::error_body(404, "The page you are looking for does not exist.");
    (
        StatusCode::NOT_FOUND,
        Html(views::plain_page("Not Found", None, &body)),
    )
        .into_response()
}
