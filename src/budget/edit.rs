//! Budget edit page and endpoint.

use axum::{
    Extension, Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::html;

use crate::{
    Error,
    budget::{
        Budget, BudgetEndpointState, BudgetFormData, BudgetId, BudgetUpdate,
        create::{BudgetFormValues, budget_form_fields},
        domain::parse_budget_form,
        get_budget, update_budget,
    },
    category::{Category, get_categories},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
    timezone::DATE_INPUT_FORMAT,
    user::UserID,
};

/// Render the page for editing an existing budget.
pub async fn get_edit_budget_page(
    State(state): State<BudgetEndpointState>,
    Extension(user_id): Extension<UserID>,
    Path(budget_id): Path<BudgetId>,
) -> Result<Response, Error> {
    let (budget, categories) = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        let budget = get_budget(budget_id, user_id, &connection)?;
        let categories = get_categories(user_id, &connection)?;

        (budget, categories)
    };

    Ok(edit_budget_view(&budget, &categories).into_response())
}

/// Handle budget edit form submission.
pub async fn update_budget_endpoint(
    State(state): State<BudgetEndpointState>,
    Extension(user_id): Extension<UserID>,
    Path(budget_id): Path<BudgetId>,
    Form(form_data): Form<BudgetFormData>,
) -> Response {
    let parsed = match parse_budget_form(&form_data) {
        Ok(parsed) => parsed,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let update = BudgetUpdate {
        category_id: parsed.category_id,
        amount: parsed.amount,
        start_date: parsed.start_date,
        end_date: parsed.end_date,
    };

    match update_budget(budget_id, user_id, update, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::BUDGETS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => error.into_alert_response(),
    }
}

fn edit_budget_view(budget: &Budget, categories: &[Category]) -> maud::Markup {
    let nav_bar = NavBar::new(endpoints::BUDGETS_VIEW).into_html();
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_BUDGET, budget.id);
    let format_date = |date: time::Date| date.format(DATE_INPUT_FORMAT).unwrap_or_default();
    let values = BudgetFormValues {
        category_id: Some(budget.category_id),
        amount: budget.amount.to_decimal_string(),
        start_date: format_date(budget.start_date),
        end_date: format_date(budget.end_date),
        categories,
    };

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-put=(update_endpoint)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                (budget_form_fields(&values))

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Budget" }
            }
        }
    };

    base("Edit Budget", &content)
}

#[cfg(test)]
mod update_budget_endpoint_tests {
    use axum::{
        Extension, Form,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use time::macros::date;

    use crate::{
        budget::{
            BudgetEndpointState, BudgetFormData, create_budget, get_budget,
            update_budget_endpoint,
        },
        category::{CategoryName, create_category},
        money::Money,
        test_utils::{get_test_app_state, insert_test_user, new_test_budget},
    };

    #[tokio::test]
    async fn can_update_budget() {
        let state = get_test_app_state();
        let (user, category, budget) = {
            let connection = state.db_connection.lock().unwrap();
            let user = insert_test_user(&connection);
            let category = create_category(
                CategoryName::new_unchecked("Food"),
                false,
                user.id,
                &connection,
            )
            .unwrap();
            let budget = create_budget(
                new_test_budget(
                    user.id,
                    category.id,
                    25000,
                    date!(2024 - 01 - 01),
                    date!(2024 - 01 - 31),
                ),
                &connection,
            )
            .unwrap();
            (user, category, budget)
        };

        let form = BudgetFormData {
            category_id: category.id.to_string(),
            amount: "300.00".to_string(),
            start_date: "2024-02-01".to_string(),
            end_date: "2024-02-29".to_string(),
        };

        let response = update_budget_endpoint(
            State(BudgetEndpointState {
                db_connection: state.db_connection.clone(),
                pagination_config: state.pagination_config.clone(),
            }),
            Extension(user.id),
            Path(budget.id),
            Form(form),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let updated = get_budget(budget.id, user.id, &state.db_connection.lock().unwrap())
            .expect("Could not get updated budget");
        assert_eq!(updated.amount, Money::from_cents(30000));
        assert_eq!(updated.start_date, date!(2024 - 02 - 01));
        assert_eq!(updated.end_date, date!(2024 - 02 - 29));
    }

    #[tokio::test]
    async fn update_fails_for_other_users_budget() {
        let state = get_test_app_state();
        let (other_user, category, budget) = {
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
            let budget = create_budget(
                new_test_budget(
                    owner.id,
                    category.id,
                    25000,
                    date!(2024 - 01 - 01),
                    date!(2024 - 01 - 31),
                ),
                &connection,
            )
            .unwrap();
            (other_user, category, budget)
        };

        let form = BudgetFormData {
            category_id: category.id.to_string(),
            amount: "300.00".to_string(),
            start_date: "2024-01-01".to_string(),
            end_date: "2024-01-31".to_string(),
        };

        let response = update_budget_endpoint(
            State(BudgetEndpointState {
                db_connection: state.db_connection.clone(),
                pagination_config: state.pagination_config.clone(),
            }),
            Extension(other_user.id),
            Path(budget.id),
            Form(form),
        )
        .await
        .into_response();

        // The other user does not own the category either, so the category
        // ownership check rejects the request first.
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
