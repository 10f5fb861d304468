//! The registration page and endpoint for creating a new account.

use axum::{
    Form,
    extract::{FromRef, State},
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
    AppState, Error, PasswordHash, ValidatedPassword,
    auth::set_auth_cookie,
    category::create_default_categories,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    internal_server_error::get_internal_server_error_redirect,
    user::create_user,
};

/// The minimum number of characters the password should have to be considered
/// valid on the client side (server-side validation is done on top of this
/// validation).
const PASSWORD_INPUT_MIN_LENGTH: u8 = 14;

/// The state needed for registering a new user.
#[derive(Clone)]
pub(crate) struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub(crate) cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub(crate) cookie_duration: Duration,
    /// The shared database connection.
    pub(crate) db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// The form fields submitted when registering.
#[derive(Serialize, Deserialize)]
pub(crate) struct RegisterFormData {
    /// The email address to register with.
    pub(crate) email: String,
    /// The raw password.
    pub(crate) password: String,
    /// The password a second time, to catch typos.
    pub(crate) confirm_password: String,
}

/// Display the registration page.
pub(crate) async fn get_register_page() -> Response {
    let form = registration_form("", None, None, None);
    let content = html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-4" { "Create an account" }
            (form)
        }
    };

    base("Register", &content).into_response()
}

/// Handle registration form submission.
///
/// A successful registration creates the user, seeds their default
/// categories, logs them in and redirects to the dashboard.
pub(crate) async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(form_data): Form<RegisterFormData>,
) -> Response {
    let email = form_data.email.trim().to_owned();

    if email.is_empty() || !email.contains('@') {
        return registration_form(
            &email,
            Some("Enter a valid email address."),
            None,
            None,
        )
        .into_response();
    }

    let validated_password = match ValidatedPassword::new(&form_data.password) {
        Ok(password) => password,
        Err(error) => {
            return registration_form(&email, None, Some(&error.to_string()), None)
                .into_response();
        }
    };

    if form_data.password != form_data.confirm_password {
        return registration_form(&email, None, None, Some("Passwords do not match"))
            .into_response();
    }

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("an error occurred while hashing a password: {error}");

            return get_internal_server_error_redirect();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return get_internal_server_error_redirect();
        }
    };

    let user = match create_user(&email, password_hash, &connection) {
        Ok(user) => user,
        Err(Error::DuplicateEmail) => {
            return registration_form(
                &email,
                Some("This email address is already registered, please log in instead."),
                None,
                None,
            )
            .into_response();
        }
        Err(error) => {
            tracing::error!("could not create user: {error}");
            return get_internal_server_error_redirect();
        }
    };

    if let Err(error) = create_default_categories(user.id, &connection) {
        tracing::error!("could not create default categories: {error}");
        return get_internal_server_error_redirect();
    }

    match set_auth_cookie(jar, user.id, state.cookie_duration) {
        Ok(jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("could not set auth cookie: {error}");
            get_internal_server_error_redirect()
        }
    }
}

fn registration_form(
    email: &str,
    email_error_message: Option<&str>,
    password_error_message: Option<&str>,
    confirm_password_error_message: Option<&str>,
) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
            class="w-full space-y-4 md:space-y-6"
        {
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

                @if let Some(error_message) = email_error_message {
                    p class="text-red-600 dark:text-red-400" { (error_message) }
                }
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
                    minlength=(PASSWORD_INPUT_MIN_LENGTH)
                    class=(FORM_TEXT_INPUT_STYLE);

                @if let Some(error_message) = password_error_message {
                    p class="text-red-600 dark:text-red-400" { (error_message) }
                }
            }

            div
            {
                label for="confirm-password" class=(FORM_LABEL_STYLE) { "Confirm Password" }

                input
                    id="confirm-password"
                    type="password"
                    name="confirm_password"
                    placeholder="••••••••"
                    required
                    minlength=(PASSWORD_INPUT_MIN_LENGTH)
                    class=(FORM_TEXT_INPUT_STYLE);

                @if let Some(error_message) = confirm_password_error_message {
                    p class="text-red-600 dark:text-red-400" { (error_message) }
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Account" }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "

                a
                    href=(endpoints::LOG_IN_VIEW)
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                    "Log in here"
                }
            }
        }
    }
}
