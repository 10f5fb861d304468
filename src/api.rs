//! The JSON API consumed by non-HTML clients.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, Error,
    money::Money,
    transaction::{Transaction, get_transactions},
    user::UserID,
};

/// The state needed by the JSON API endpoints.
#[derive(Debug, Clone)]
pub struct ApiState {
    /// The shared database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ApiState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// All-time income and expense totals for one user.
#[derive(Debug, PartialEq, Serialize)]
pub struct Summary {
    /// The sum of all income transactions.
    pub total_income: Money,
    /// The sum of all expense transactions.
    pub total_expenses: Money,
}

/// Return the authenticated user's transactions as JSON, most recent first.
pub async fn get_transactions_api(
    State(state): State<ApiState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions(user_id, &connection)?;

    Ok(Json(transactions))
}

/// Return the authenticated user's all-time income and expense totals.
pub async fn get_summary_api(
    State(state): State<ApiState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Summary>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let summary = Summary {
        total_income: sum_all_transactions(user_id, true, &connection)?,
        total_expenses: sum_all_transactions(user_id, false, &connection)?,
    };

    Ok(Json(summary))
}

fn sum_all_transactions(
    user_id: UserID,
    is_income: bool,
    connection: &Connection,
) -> Result<Money, Error> {
    connection
        .query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM \"transaction\"
             WHERE user_id = ?1 AND is_income = ?2",
            (user_id.as_i64(), is_income),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

#[cfg(test)]
mod api_tests {
    use axum::{Extension, Json, extract::State};
    use time::macros::date;

    use crate::{
        money::Money,
        test_utils::{get_test_app_state, insert_test_user, new_test_transaction},
        transaction::create_transaction,
    };

    use super::{ApiState, Summary, get_summary_api, get_transactions_api};

    #[tokio::test]
    async fn summary_reports_all_time_totals() {
        let state = get_test_app_state();
        let user = {
            let connection = state.db_connection.lock().unwrap();
            let user = insert_test_user(&connection);
            create_transaction(
                new_test_transaction(user.id, 5000, date!(2023 - 06 - 01)),
                &connection,
            )
            .unwrap();
            let mut income = new_test_transaction(user.id, 20000, date!(2024 - 01 - 01));
            income.is_income = true;
            create_transaction(income, &connection).unwrap();
            user
        };

        let Json(summary) = get_summary_api(
            State(ApiState {
                db_connection: state.db_connection.clone(),
            }),
            Extension(user.id),
        )
        .await
        .unwrap();

        assert_eq!(
            summary,
            Summary {
                total_income: Money::from_cents(20000),
                total_expenses: Money::from_cents(5000),
            }
        );
    }

    #[tokio::test]
    async fn summary_is_zero_for_new_users() {
        let state = get_test_app_state();
        let user = insert_test_user(&state.db_connection.lock().unwrap());

        let Json(summary) = get_summary_api(
            State(ApiState {
                db_connection: state.db_connection.clone(),
            }),
            Extension(user.id),
        )
        .await
        .unwrap();

        assert_eq!(summary.total_income, Money::ZERO);
        assert_eq!(summary.total_expenses, Money::ZERO);
    }

    #[tokio::test]
    async fn transactions_api_only_returns_own_rows() {
        let state = get_test_app_state();
        let (user, other_user) = {
            let connection = state.db_connection.lock().unwrap();
            let user = insert_test_user(&connection);
            let other_user = insert_test_user(&connection);
            create_transaction(
                new_test_transaction(user.id, 5000, date!(2024 - 01 - 01)),
                &connection,
            )
            .unwrap();
            create_transaction(
                new_test_transaction(other_user.id, 7000, date!(2024 - 01 - 01)),
                &connection,
            )
            .unwrap();
            (user, other_user)
        };

        let Json(own) = get_transactions_api(
            State(ApiState {
                db_connection: state.db_connection.clone(),
            }),
            Extension(user.id),
        )
        .await
        .unwrap();
        let Json(theirs) = get_transactions_api(
            State(ApiState {
                db_connection: state.db_connection.clone(),
            }),
            Extension(other_user.id),
        )
        .await
        .unwrap();

        assert_eq!(own.len(), 1);
        assert_eq!(own[0].amount, Money::from_cents(5000));
        assert_eq!(theirs.len(), 1);
        assert_eq!(theirs[0].amount, Money::from_cents(7000));
    }
}
