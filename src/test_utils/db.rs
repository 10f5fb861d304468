//! Database fixtures shared by the test modules.

use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, PasswordHash,
    budget::NewBudget,
    category::CategoryId,
    db::initialize,
    money::Money,
    pagination::PaginationConfig,
    transaction::NewTransaction,
    user::{User, count_users, create_user},
};

/// An in-memory database with the full application schema.
pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("Could not open in-memory database");
    initialize(&connection).expect("Could not initialize database");

    connection
}

/// An [AppState] over an in-memory database, for endpoint tests.
pub(crate) fn get_test_app_state() -> AppState {
    AppState::new(
        Connection::open_in_memory().expect("Could not open in-memory database"),
        "averysecretsecret",
        "Etc/UTC",
        PaginationConfig::default(),
    )
    .expect("Could not create test app state")
}

/// Insert a user with a unique email address and a dummy password hash.
///
/// Each call creates a distinct user, so tests can easily set up "another
/// user" for isolation checks.
pub(crate) fn insert_test_user(connection: &Connection) -> User {
    let user_number = count_users(connection).expect("Could not count users") + 1;

    create_user(
        &format!("user{user_number}@example.com"),
        PasswordHash::new_unchecked("hunter2"),
        connection,
    )
    .expect("Could not create test user")
}

/// An uncategorized expense of `cents` on `date` for `user_id`.
pub(crate) fn new_test_transaction(
    user_id: crate::user::UserID,
    cents: i64,
    date: Date,
) -> NewTransaction {
    NewTransaction {
        user_id,
        amount: Money::from_cents(cents),
        date,
        description: String::new(),
        category_id: None,
        is_income: false,
    }
}

/// A budget of `cents` for `category_id` covering the given date range.
pub(crate) fn new_test_budget(
    user_id: crate::user::UserID,
    category_id: CategoryId,
    cents: i64,
    start_date: Date,
    end_date: Date,
) -> NewBudget {
    NewBudget {
        user_id,
        category_id,
        amount: Money::from_cents(cents),
        start_date,
        end_date,
    }
}
