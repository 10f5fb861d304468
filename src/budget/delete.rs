//! Budget delete endpoint.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{
    Error,
    budget::{BudgetEndpointState, BudgetId, delete_budget},
    endpoints,
    user::UserID,
};

/// Delete a budget and redirect back to the budget list.
pub async fn delete_budget_endpoint(
    State(state): State<BudgetEndpointState>,
    Extension(user_id): Extension<UserID>,
    Path(budget_id): Path<BudgetId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_budget(budget_id, user_id, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::BUDGETS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => error.into_alert_response(),
    }
}

#[cfg(test)]
mod delete_budget_endpoint_tests {
    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use time::macros::date;

    use crate::{
        Error,
        budget::{BudgetEndpointState, create_budget, delete_budget_endpoint, get_budget},
        category::{CategoryName, create_category},
        test_utils::{get_test_app_state, insert_test_user, new_test_budget},
    };

    #[tokio::test]
    async fn can_delete_budget() {
        let state = get_test_app_state();
        let (user, budget) = {
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
            (user, budget)
        };

        let response = delete_budget_endpoint(
            State(BudgetEndpointState {
                db_connection: state.db_connection.clone(),
                pagination_config: state.pagination_config.clone(),
            }),
            Extension(user.id),
            Path(budget.id),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            get_budget(budget.id, user.id, &state.db_connection.lock().unwrap()),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn delete_missing_budget_returns_not_found() {
        let state = get_test_app_state();
        let user = insert_test_user(&state.db_connection.lock().unwrap());

        let response = delete_budget_endpoint(
            State(BudgetEndpointState {
                db_connection: state.db_connection.clone(),
                pagination_config: state.pagination_config.clone(),
            }),
            Extension(user.id),
            Path(12345),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
