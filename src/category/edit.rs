//! Category edit page and endpoint.

use axum::{
    Extension, Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};

use crate::{
    Error,
    category::{
        Category, CategoryEndpointState, CategoryFormData, CategoryId, CategoryName, get_category,
        update_category,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CHECKBOX_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
    user::UserID,
};

/// Render the page for editing an existing category.
pub async fn get_edit_category_page(
    State(state): State<CategoryEndpointState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<CategoryId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let category = get_category(category_id, user_id, &connection)?;

    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();
    let form = edit_category_form_view(&category, "");

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    Ok(base("Edit Category", &content).into_response())
}

/// Handle category edit form submission.
pub async fn update_category_endpoint(
    State(state): State<CategoryEndpointState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<CategoryId>,
    Form(form_data): Form<CategoryFormData>,
) -> Response {
    let name = match CategoryName::new(&form_data.name) {
        Ok(name) => name,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_category(category_id, user_id, name, form_data.is_income, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => error.into_alert_response(),
    }
}

fn edit_category_form_view(category: &Category, error_message: &str) -> Markup {
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_CATEGORY, category.id);

    html! {
        form
            hx-put=(update_endpoint)
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
                    value=(category.name)
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
                    checked[category.is_income]
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

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Category" }
        }
    }
}

#[cfg(test)]
mod update_category_endpoint_tests {
    use axum::{
        Extension, Form,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };

    use crate::{
        category::{
            CategoryEndpointState, CategoryFormData, CategoryName, create_category, get_category,
            update_category_endpoint,
        },
        test_utils::{get_test_app_state, insert_test_user},
    };

    #[tokio::test]
    async fn can_update_category() {
        let state = get_test_app_state();
        let (user, category) = {
            let connection = state.db_connection.lock().unwrap();
            let user = insert_test_user(&connection);
            let category = create_category(
                CategoryName::new_unchecked("Food"),
                false,
                user.id,
                &connection,
            )
            .unwrap();
            (user, category)
        };

        let response = update_category_endpoint(
            State(CategoryEndpointState {
                db_connection: state.db_connection.clone(),
            }),
            Extension(user.id),
            Path(category.id),
            Form(CategoryFormData {
                name: "Dining".to_string(),
                is_income: false,
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let updated = get_category(category.id, user.id, &state.db_connection.lock().unwrap())
            .expect("Could not get updated category");
        assert_eq!(updated.name.as_ref(), "Dining");
    }

    #[tokio::test]
    async fn update_fails_for_other_users_category() {
        let state = get_test_app_state();
        let (other_user, category) = {
            let connection = state.db_connection.lock().unwrap();
            let owner = insert_test_user(&connection);
            let other_user = insert_test_user(&connection);
            let category = create_category(
                CategoryName::new_unchecked("Food"),
                false,
                owner.id,
                &connection,
            )
            .unwrap();
            (other_user, category)
        };

        let response = update_category_endpoint(
            State(CategoryEndpointState {
                db_connection: state.db_connection.clone(),
            }),
            Extension(other_user.id),
            Path(category.id),
            Form(CategoryFormData {
                name: "Hijacked".to_string(),
                is_income: false,
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
