pub mod app;
pub mod auth;
pub mod dashboard;
pub mod tracking;
pub mod trips;

use axum::{
    http::{HeaderName, StatusCode},
    response::{Html, IntoResponse, Response},
};
use validator::ValidationErrors;

pub const HX_REDIRECT: HeaderName = HeaderName::from_static("hx-redirect");

/// Client-side redirect for HTMX form posts.
pub fn hx_redirect(location: &str) -> Response {
    (StatusCode::OK, [(HX_REDIRECT, location.to_string())], "").into_response()
}

/// Error fragment swapped into the form by HTMX. Messages are fixed strings
/// from this crate, never user input.
pub fn error_fragment(status: StatusCode, message: &str) -> Response {
    (
        status,
        Html(format!("<p class='notice notice-error'>{}</p>", message)),
    )
        .into_response()
}

pub fn success_fragment(message: &str) -> Response {
    (
        StatusCode::OK,
        Html(format!("<p class='notice notice-success'>{}</p>", message)),
    )
        .into_response()
}

/// First validation message, checking fields in form order.
pub fn validation_message(errors: &ValidationErrors, fields: &[&str]) -> String {
    let field_errors = errors.field_errors();
    fields
        .iter()
        .filter_map(|field| field_errors.get(*field))
        .flat_map(|errs| errs.iter())
        .find_map(|err| err.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Please check the form and try again.".to_string())
}
