//! Budget creation page and endpoint.

use axum::{
    Extension, Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};

use crate::{
    Error,
    budget::{BudgetEndpointState, BudgetFormData, NewBudget, create_budget, domain::parse_budget_form},
    category::{Category, get_categories},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE,
        FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
    user::UserID,
};

/// The values used to pre-fill the budget form fields.
pub(super) struct BudgetFormValues<'a> {
    pub(super) category_id: Option<i64>,
    pub(super) amount: String,
    pub(super) start_date: String,
    pub(super) end_date: String,
    pub(super) categories: &'a [Category],
}

/// Render the input fields shared by the create and edit budget forms.
pub(super) fn budget_form_fields(values: &BudgetFormValues) -> Markup {
    html! {
        div
        {
            label for="category-id" class=(FORM_LABEL_STYLE) { "Category" }

            select id="category-id" name="category_id" required class=(FORM_SELECT_STYLE)
            {
                option value="" disabled selected[values.category_id.is_none()] { "Choose a category" }

                @for category in values.categories
                {
                    option
                        value=(category.id)
                        selected[values.category_id == Some(category.id)]
                    {
                        (category.name)
                    }
                }
            }
        }

        div
        {
            label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

            input
                id="amount"
                type="text"
                inputmode="decimal"
                name="amount"
                placeholder="0.00"
                value=(values.amount)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="start-date" class=(FORM_LABEL_STYLE) { "Start Date" }

            input
                id="start-date"
                type="date"
                name="start_date"
                value=(values.start_date)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="end-date" class=(FORM_LABEL_STYLE) { "End Date" }

            input
                id="end-date"
                type="date"
                name="end_date"
                value=(values.end_date)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}

/// Render the budget creation page.
pub async fn get_new_budget_page(
    State(state): State<BudgetEndpointState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let categories = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;
        get_categories(user_id, &connection)?
    };

    let nav_bar = NavBar::new(endpoints::NEW_BUDGET_VIEW).into_html();
    let values = BudgetFormValues {
        category_id: None,
        amount: String::new(),
        start_date: String::new(),
        end_date: String::new(),
        categories: &categories,
    };

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            @if categories.is_empty() {
                p { "Create a category before setting up a budget." }
            } @else {
                form
                    hx-post=(endpoints::POST_BUDGET)
                    hx-target-error="#alert-container"
                    class="w-full space-y-4 md:space-y-6"
                {
                    (budget_form_fields(&values))

                    button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Budget" }
                }
            }
        }
    };

    Ok(base("New Budget", &content).into_response())
}

/// Handle budget creation form submission.
pub async fn create_budget_endpoint(
    State(state): State<BudgetEndpointState>,
    Extension(user_id): Extension<UserID>,
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

    let new_budget = NewBudget {
        user_id,
        category_id: parsed.category_id,
        amount: parsed.amount,
        start_date: parsed.start_date,
        end_date: parsed.end_date,
    };

    match create_budget(new_budget, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::BUDGETS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => error.into_alert_response(),
    }
}
