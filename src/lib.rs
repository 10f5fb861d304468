//! Centsible is a web app for tracking personal finances: transactions,
//! categories, budgets, and reports.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use time::Date;
use tokio::signal;

mod alert;
mod api;
mod app_state;
mod auth;
pub mod budget;
pub mod category;
mod dashboard;
pub mod db;
mod endpoints;
mod html;
mod internal_server_error;
mod logging;
pub mod money;
mod navigation;
mod not_found;
pub mod pagination;
pub mod password;
pub mod report;
mod routing;
mod timezone;
pub mod transaction;
pub mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use money::Money;
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::build_router;
pub use user::{User, UserID};

use crate::{
    alert::AlertView,
    category::CategoryId,
    html::render,
    internal_server_error::{get_internal_server_error_response, render_internal_server_error},
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid combination of email and password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The auth cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// There was an error parsing a date from a form or cookie.
    ///
    /// Callers should pass in the original error as a string and the date
    /// string that caused the error.
    #[error("could not parse \"{1}\" as a date: {0}")]
    InvalidDateFormat(String, String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The email address used to register already belongs to a user.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// The user already has a category with this name.
    #[error("the category \"{0}\" already exists")]
    DuplicateCategoryName(String),

    /// The category ID used to create a transaction or budget did not match
    /// one of the user's categories.
    ///
    /// This error is returned both when the category does not exist and when
    /// it belongs to another user, so the response does not reveal whether
    /// someone else's category exists.
    #[error("the category ID does not refer to one of your categories")]
    InvalidCategory(Option<CategoryId>),

    /// A monetary amount could not be parsed, or was below the minimum of
    /// $0.01.
    #[error("\"{0}\" is not a valid amount of at least $0.01")]
    InvalidAmount(String),

    /// A date range where the end date is before the start date.
    #[error("the end date {1} is before the start date {0}")]
    InvalidDateRange(Date, Date),

    /// The user already has a budget for this category and date range.
    #[error("a budget already exists for this category and date range")]
    DuplicateBudget,

    /// The report type string was not one of the known report types.
    #[error("\"{0}\" is not a valid report type")]
    UnknownReportType(String),

    /// The report output format string was not one of the known formats.
    #[error("\"{0}\" is not a valid report format")]
    UnknownReportFormat(String),

    /// An error occurred while serializing a struct as JSON.
    #[error("could not serialize as JSON: {0}")]
    JsonSerializationError(String),

    /// An error occurred while writing CSV output.
    #[error("could not write CSV output: {0}")]
    CsvSerializationError(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// Tried to update a transaction that does not exist.
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist.
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a category that does not exist.
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist.
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// Tried to update a budget that does not exist.
    #[error("tried to update a budget that is not in the database")]
    UpdateMissingBudget,

    /// Tried to delete a budget that does not exist.
    #[error("tried to delete a budget that is not in the database")]
    DeleteMissingBudget,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("user.email") =>
            {
                Error::DuplicateEmail
            }
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezone(timezone) => render_internal_server_error(
                "Invalid Timezone Settings",
                &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to a valid, canonical timezone string"
                ),
            ),
            Error::DatabaseLockError => get_internal_server_error_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                get_internal_server_error_response()
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            Error::DuplicateCategoryName(name) => render(
                StatusCode::BAD_REQUEST,
                AlertView::error(
                    "Duplicate Category Name",
                    &format!(
                        "The category \"{name}\" already exists. Choose a different name, \
                        or edit or delete the existing category."
                    ),
                ),
            ),
            Error::EmptyCategoryName => render(
                StatusCode::BAD_REQUEST,
                AlertView::error("Invalid category name", "Category name cannot be empty."),
            ),
            Error::DuplicateBudget => render(
                StatusCode::BAD_REQUEST,
                AlertView::error(
                    "Duplicate Budget",
                    "A budget already exists for this category and date range. \
                    Edit the existing budget instead of creating a new one.",
                ),
            ),
            Error::InvalidCategory(category_id) => render(
                StatusCode::BAD_REQUEST,
                AlertView::error(
                    "Invalid category",
                    &format!("Could not find a category with the ID {category_id:?}"),
                ),
            ),
            Error::InvalidAmount(raw) => render(
                StatusCode::BAD_REQUEST,
                AlertView::error(
                    "Invalid amount",
                    &format!("\"{raw}\" is not a valid amount. Enter at least $0.01."),
                ),
            ),
            Error::InvalidDateFormat(error, raw) => render(
                StatusCode::BAD_REQUEST,
                AlertView::error(
                    "Invalid date",
                    &format!("Could not read \"{raw}\" as a date: {error}"),
                ),
            ),
            Error::InvalidDateRange(start, end) => render(
                StatusCode::BAD_REQUEST,
                AlertView::error(
                    "Invalid date range",
                    &format!("The end date {end} is before the start date {start}."),
                ),
            ),
            Error::UnknownReportType(raw) => render(
                StatusCode::BAD_REQUEST,
                AlertView::error(
                    "Unknown report type",
                    &format!("\"{raw}\" is not one of monthly, yearly, or category."),
                ),
            ),
            Error::UnknownReportFormat(raw) => render(
                StatusCode::BAD_REQUEST,
                AlertView::error(
                    "Unknown report format",
                    &format!("\"{raw}\" is not one of json, csv, or html."),
                ),
            ),
            Error::UpdateMissingTransaction => render(
                StatusCode::NOT_FOUND,
                AlertView::error(
                    "Could not update transaction",
                    "The transaction could not be found.",
                ),
            ),
            Error::DeleteMissingTransaction => render(
                StatusCode::NOT_FOUND,
                AlertView::error(
                    "Could not delete transaction",
                    "The transaction could not be found. \
                    Try refreshing the page to see if the transaction has already been deleted.",
                ),
            ),
            Error::UpdateMissingCategory => render(
                StatusCode::NOT_FOUND,
                AlertView::error(
                    "Could not update category",
                    "The category could not be found.",
                ),
            ),
            Error::DeleteMissingCategory => render(
                StatusCode::NOT_FOUND,
                AlertView::error(
                    "Could not delete category",
                    "The category could not be found. \
                    Try refreshing the page to see if the category has already been deleted.",
                ),
            ),
            Error::UpdateMissingBudget => render(
                StatusCode::NOT_FOUND,
                AlertView::error("Could not update budget", "The budget could not be found."),
            ),
            Error::DeleteMissingBudget => render(
                StatusCode::NOT_FOUND,
                AlertView::error(
                    "Could not delete budget",
                    "The budget could not be found. \
                    Try refreshing the page to see if the budget has already been deleted.",
                ),
            ),
            _ => render(
                StatusCode::INTERNAL_SERVER_ERROR,
                AlertView::error(
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                ),
            ),
        }
    }
}
