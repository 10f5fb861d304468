//! The internal server error page and redirect helpers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::html;

use crate::{
    endpoints,
    html::{PAGE_CONTAINER_STYLE, base},
};

/// Render the 500 page with a description of what went wrong and a suggested
/// fix.
pub fn render_internal_server_error(description: &str, fix: &str) -> Response {
    let content = html! {
        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-4xl font-bold mb-4" { "500" }
            p class="mb-2 font-medium" { (description) }
            p { (fix) }
        }
    };

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        base("Server Error", &content),
    )
        .into_response()
}

/// The 500 page with a generic message.
pub fn get_internal_server_error_response() -> Response {
    render_internal_server_error(
        "Sorry, something went wrong.",
        "Try again later or check the server logs",
    )
}

/// Route handler for the error page.
pub async fn get_internal_server_error_page() -> Response {
    get_internal_server_error_response()
}

/// Get a response that will redirect the client to the internal server error 500 page.
///
/// **Note**: This redirect is intended to be served as a response to a POST request initiated by HTMX.
/// Route handlers using GET should use `axum::response::Redirect` to redirect via a response.
pub(crate) fn get_internal_server_error_redirect() -> Response {
    (
        HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
        StatusCode::INTERNAL_SERVER_ERROR,
    )
        .into_response()
}
