//! Category creation page and endpoint.

use axum::{
    Extension, Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};

use crate::{
    Error, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CHECKBOX_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
    category::{CategoryEndpointState, CategoryFormData, CategoryName, create_category},
    user::UserID,
};

/// Render the category creation page.
pub async fn get_new_category_page() -> Response {
    let nav_bar = NavBar::new(endpoints::NEW_CATEGORY_VIEW).into_html();
    let form = new_category_form_view("");

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Create Category", &content).into_response()
}

/// Handle category creation form submission.
pub async fn create_category_endpoint(
    State(state): State<CategoryEndpointState>,
    Extension(user_id): Extension<UserID>,
    Form(new_category): Form<CategoryFormData>,
) -> Response {
    let name = match CategoryName::new(&new_category.name) {
        Ok(name) => name,
        Err(error) => {
            return new_category_form_view(&format!("Error: {error}")).into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_category(name, new_category.is_income, user_id, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::DuplicateCategoryName(_)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a category: {error}");

            error.into_alert_response()
        }
    }
}

fn new_category_form_view(error_message: &str) -> Markup {
    html! {
        form
            hx-post=(endpoints::POST_CATEGORY)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label
                    for="name"
                    class=(FORM_LABEL_STYLE)
                {
                    "Category Name"
                }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Category Name"
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="flex items-center gap-2"
            {
                input
                    id="is-income"
                    type="checkbox"
                    name="is_income"
                    value="true"
                    class=(FORM_CHECKBOX_STYLE);

                label
                    for="is-income"
                    class=(FORM_LABEL_STYLE)
                {
                    "This category is for income"
                }
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Category" }
        }
    }
}

#[cfg(test)]
mod new_category_page_tests {
    use axum::http::StatusCode;

    use crate::{
        category::get_new_category_page,
        endpoints,
        test_utils::{
            assert_form_input, assert_form_submit_button, assert_hx_endpoint, assert_valid_html,
            must_get_form, parse_html_document,
        },
    };

    #[tokio::test]
    async fn render_page() {
        let response = get_new_category_page().await;

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::POST_CATEGORY, "hx-post");
        assert_form_input(&form, "name", "text");
        assert_form_submit_button(&form);
    }
}

#[cfg(test)]
mod create_category_endpoint_tests {
    use axum::{Extension, Form, extract::State, http::StatusCode, response::IntoResponse};

    use crate::{
        category::{
            CategoryEndpointState, CategoryFormData, create_category_endpoint, get_categories,
        },
        endpoints,
        test_utils::{assert_hx_redirect, get_test_app_state, insert_test_user},
    };

    #[tokio::test]
    async fn can_create_category() {
        let state = get_test_app_state();
        let user = insert_test_user(&state.db_connection.lock().unwrap());
        let form = CategoryFormData {
            name: "Utilities".to_string(),
            is_income: false,
        };

        let response = create_category_endpoint(
            State(CategoryEndpointState {
                db_connection: state.db_connection.clone(),
            }),
            Extension(user.id),
            Form(form),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::CATEGORIES_VIEW);

        let categories =
            get_categories(user.id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name.as_ref(), "Utilities");
    }

    #[tokio::test]
    async fn create_category_fails_on_empty_name() {
        let state = get_test_app_state();
        let user = insert_test_user(&state.db_connection.lock().unwrap());
        let form = CategoryFormData {
            name: "".to_string(),
            is_income: false,
        };

        let response = create_category_endpoint(
            State(CategoryEndpointState {
                db_connection: state.db_connection.clone(),
            }),
            Extension(user.id),
            Form(form),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let categories =
            get_categories(user.id, &state.db_connection.lock().unwrap()).unwrap();
        assert!(categories.is_empty());
    }

    #[tokio::test]
    async fn create_category_rejects_duplicate_name() {
        let state = get_test_app_state();
        let user = insert_test_user(&state.db_connection.lock().unwrap());
        let endpoint_state = CategoryEndpointState {
            db_connection: state.db_connection.clone(),
        };
        let form = CategoryFormData {
            name: "Utilities".to_string(),
            is_income: false,
        };
        create_category_endpoint(
            State(endpoint_state.clone()),
            Extension(user.id),
            Form(CategoryFormData {
                name: "Utilities".to_string(),
                is_income: false,
            }),
        )
        .await;

        let response = create_category_endpoint(
            State(endpoint_state),
            Extension(user.id),
            Form(form),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
