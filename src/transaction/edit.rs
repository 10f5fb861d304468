//! Transaction edit page and endpoint.

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
    category::{Category, get_categories},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
    timezone::DATE_INPUT_FORMAT,
    transaction::{
        Transaction, TransactionEndpointState, TransactionId, TransactionUpdate, get_transaction,
        update_transaction,
        form::{
            TransactionFormData, TransactionFormValues, parse_transaction_form,
            transaction_form_fields,
        },
    },
    user::UserID,
};

/// Render the page for editing an existing transaction.
pub async fn get_edit_transaction_page(
    State(state): State<TransactionEndpointState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let (transaction, categories) = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        let transaction = get_transaction(transaction_id, user_id, &connection)?;
        let categories = get_categories(user_id, &connection)?;

        (transaction, categories)
    };

    Ok(edit_transaction_view(&transaction, &categories).into_response())
}

/// Handle transaction edit form submission.
pub async fn update_transaction_endpoint(
    State(state): State<TransactionEndpointState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
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

    let update = TransactionUpdate {
        amount: parsed.amount,
        date: parsed.date,
        description: parsed.description,
        category_id: parsed.category_id,
        is_income: parsed.is_income,
    };

    match update_transaction(transaction_id, user_id, update, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => error.into_alert_response(),
    }
}

fn edit_transaction_view(transaction: &Transaction, categories: &[Category]) -> maud::Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_TRANSACTION, transaction.id);
    let values = TransactionFormValues {
        amount: transaction.amount.to_decimal_string(),
        date: transaction
            .date
            .format(DATE_INPUT_FORMAT)
            .unwrap_or_else(|_| String::new()),
        description: &transaction.description,
        category_id: transaction.category_id,
        is_income: transaction.is_income,
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
                (transaction_form_fields(&values, categories))

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Transaction" }
            }
        }
    };

    base("Edit Transaction", &content)
}
