//! Transaction creation page and endpoint.

use axum::{
    Extension, Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::html;
use time::Date;

use crate::{
    Error,
    category::Category,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
    timezone::{DATE_INPUT_FORMAT, get_local_offset, local_today},
    transaction::{
        NewTransaction, TransactionEndpointState, create_transaction,
        form::{
            TransactionFormData, TransactionFormValues, parse_transaction_form,
            transaction_form_fields,
        },
    },
    user::UserID,
};

/// Render the page for recording a new transaction.
pub async fn get_new_transaction_page(
    State(state): State<TransactionEndpointState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let local_offset = get_local_offset(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezone(state.local_timezone.clone()))?;
    let today = local_today(local_offset);

    let categories = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;
        crate::category::get_categories(user_id, &connection)?
    };

    Ok(new_transaction_view(today, &categories).into_response())
}

/// Handle transaction creation form submission.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionEndpointState>,
    Extension(user_id): Extension<UserID>,
    Form(form_data): Form<TransactionFormData>,
) -> Response {
    let parsed = match parse_transaction_form(&form_data) {
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

    let new_transaction = NewTransaction {
        user_id,
        amount: parsed.amount,
        date: parsed.date,
        description: parsed.description,
        category_id: parsed.category_id,
        is_income: parsed.is_income,
    };

    match create_transaction(new_transaction, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => error.into_alert_response(),
    }
}

fn new_transaction_view(today: Date, categories: &[Category]) -> maud::Markup {
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();
    let values = TransactionFormValues {
        amount: String::new(),
        date: today
            .format(DATE_INPUT_FORMAT)
            .unwrap_or_else(|_| String::new()),
        description: "",
        category_id: None,
        is_income: false,
    };

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-post=(endpoints::TRANSACTIONS_API)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                (transaction_form_fields(&values, categories))

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Transaction" }
            }
        }
    };

    base("New Transaction", &content)
}
