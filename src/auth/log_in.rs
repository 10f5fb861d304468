//! The log-in page and endpoint.

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use time::Duration;

use crate::{
    AppState, Error, endpoints,
    auth::{redirect::is_safe_redirect_target, set_auth_cookie},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    internal_server_error::get_internal_server_error_redirect,
    user::get_user_by_email,
};

/// The state needed for logging in a user.
#[derive(Clone)]
pub(crate) struct LogInState {
    /// The key to be used for signing and encrypting private cookies.
    pub(crate) cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub(crate) cookie_duration: Duration,
    /// The shared database connection.
    pub(crate) db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LogInState> for Key {
    fn from_ref(state: &LogInState) -> Self {
        state.cookie_key.clone()
    }
}

/// The query parameters accepted by the log-in page.
#[derive(Debug, Deserialize)]
pub(crate) struct LogInPageQuery {
    /// Where to send the user after logging in.
    redirect_url: Option<String>,
}

/// The form fields submitted when logging in.
#[derive(Serialize, Deserialize)]
pub(crate) struct LogInFormData {
    /// The email address the user registered with.
    pub(crate) email: String,
    /// The raw password.
    pub(crate) password: String,
    /// Where to send the user after logging in.
    #[serde(default)]
    pub(crate) redirect_url: Option<String>,
}

/// Display the log-in page.
pub(crate) async fn get_log_in_page(Query(query): Query<LogInPageQuery>) -> Response {
    log_in_view(query.redirect_url.as_deref(), "", None).into_response()
}

/// Handle log-in form submission.
pub(crate) async fn post_log_in(
    State(state): State<LogInState>,
    jar: PrivateCookieJar,
    Form(form_data): Form<LogInFormData>,
) -> Response {
    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return get_internal_server_error_redirect();
            }
        };

        match get_user_by_email(form_data.email.trim(), &connection) {
            Ok(user) => Some(user),
            Err(Error::NotFound) => None,
            Err(error) => {
                tracing::error!("could not look up user: {error}");
                return get_internal_server_error_redirect();
            }
        }
    };

    let password_matches = match &user {
        Some(user) => match user.password_hash.verify(&form_data.password) {
            Ok(matches) => matches,
            Err(error) => {
                tracing::error!("could not verify password: {error}");
                return get_internal_server_error_redirect();
            }
        },
        None => false,
    };

    let (Some(user), true) = (user, password_matches) else {
        return log_in_form_view(
            form_data.redirect_url.as_deref(),
            &form_data.email,
            Some("Invalid email or password."),
        )
        .into_response();
    };

    let jar = match set_auth_cookie(jar, user.id, state.cookie_duration) {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("could not set auth cookie: {error}");
            return get_internal_server_error_redirect();
        }
    };

    let redirect_target = form_data
        .redirect_url
        .as_deref()
        .filter(|target| is_safe_redirect_target(target))
        .unwrap_or(endpoints::DASHBOARD_VIEW);

    (
        StatusCode::SEE_OTHER,
        HxRedirect(redirect_target.to_owned()),
        jar,
    )
        .into_response()
}

fn log_in_view(redirect_url: Option<&str>, email: &str, error_message: Option<&str>) -> Markup {
    let form = log_in_form_view(redirect_url, email, error_message);

    let content = html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-4" { "Log in" }
            (form)
        }
    };

    base("Log in", &content)
}

fn log_in_form_view(
    redirect_url: Option<&str>,
    email: &str,
    error_message: Option<&str>,
) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN_API)
            class="w-full space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            div
            {
                label for="email" class=(FORM_LABEL_STYLE) { "Email" }

                input
                    id="email"
                    type="email"
                    name="email"
                    placeholder="you@example.com"
                    value=(email)
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="password" class=(FORM_LABEL_STYLE) { "Password" }

                input
                    id="password"
                    type="password"
                    name="password"
                    placeholder="••••••••"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if let Some(error_message) = error_message {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Log in" }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "No account yet? "

                a
                    href=(endpoints::REGISTER_VIEW)
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                    "Register here"
                }
            }
        }
    }
}
