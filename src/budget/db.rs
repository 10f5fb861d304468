//! Database operations for budgets.

use rusqlite::{Connection, Row, params};
use time::OffsetDateTime;

use crate::{
    Error,
    budget::{Budget, BudgetId, BudgetUpdate, NewBudget},
    category::get_category,
    user::UserID,
};

/// Initialize the budget table and indexes.
///
/// The UNIQUE constraint enforces one budget per (user, category, date range)
/// combination. There is deliberately no stored "spent" column: progress is
/// derived from live transaction data on every read.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            amount INTEGER NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE,
            UNIQUE(user_id, category_id, start_date, end_date)
        );

        CREATE INDEX IF NOT EXISTS idx_budget_user ON budget(user_id);",
    )?;

    Ok(())
}

/// A budget joined with its category name for display.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetRow {
    /// The budget itself.
    pub budget: Budget,
    /// The name of the budget's category.
    pub category_name: String,
}

fn check_category_owner(
    category_id: i64,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    get_category(category_id, user_id, connection)
        .map(|_| ())
        .map_err(|error| match error {
            Error::NotFound => Error::InvalidCategory(Some(category_id)),
            error => error,
        })
}

/// Create a budget and return it with its generated ID.
///
/// # Errors
/// This function will return an:
/// - [Error::InvalidCategory] if the category does not exist or belongs to
///   another user,
/// - [Error::DuplicateBudget] if the user already has a budget for this
///   category and date range,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_budget(new_budget: NewBudget, connection: &Connection) -> Result<Budget, Error> {
    check_category_owner(new_budget.category_id, new_budget.user_id, connection)?;

    let now = OffsetDateTime::now_utc();

    connection
        .execute(
            "INSERT INTO budget
                (user_id, category_id, amount, start_date, end_date, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            (
                new_budget.user_id.as_i64(),
                new_budget.category_id,
                new_budget.amount,
                new_budget.start_date,
                new_budget.end_date,
                now,
                now,
            ),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateBudget,
            error => error.into(),
        })?;

    let id = connection.last_insert_rowid();

    Ok(Budget {
        id,
        user_id: new_budget.user_id,
        category_id: new_budget.category_id,
        amount: new_budget.amount,
        start_date: new_budget.start_date,
        end_date: new_budget.end_date,
        created_at: now,
        updated_at: now,
    })
}

/// Retrieve a budget owned by `user_id`.
///
/// # Errors
/// Returns an [Error::NotFound] if the budget does not exist or belongs to
/// another user.
pub fn get_budget(
    budget_id: BudgetId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Budget, Error> {
    connection
        .prepare(
            "SELECT id, user_id, category_id, amount, start_date, end_date, created_at, updated_at
             FROM budget WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &budget_id), (":user_id", &user_id.as_i64())],
            map_budget_row,
        )
        .map_err(|error| error.into())
}

/// Get one page of a user's budgets with their category names, newest date
/// range first.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub fn get_budget_rows(
    user_id: UserID,
    limit: u64,
    offset: u64,
    connection: &Connection,
) -> Result<Vec<BudgetRow>, Error> {
    connection
        .prepare(
            "SELECT budget.id, budget.user_id, budget.category_id, budget.amount,
                    budget.start_date, budget.end_date, budget.created_at, budget.updated_at,
                    category.name
             FROM budget
             INNER JOIN category ON budget.category_id = category.id
             WHERE budget.user_id = ?1
             ORDER BY budget.start_date DESC, budget.id ASC
             LIMIT ?2 OFFSET ?3",
        )?
        .query_map(params![user_id.as_i64(), limit, offset], |row| {
            Ok(BudgetRow {
                budget: map_budget_row(row)?,
                category_name: row.get(8)?,
            })
        })?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

/// Get the number of budgets a user has.
///
/// # Errors
/// Returns an [Error::SqlError] if there is some SQL error.
pub fn count_budgets(user_id: UserID, connection: &Connection) -> Result<u64, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM budget WHERE user_id = :user_id",
            &[(":user_id", &user_id.as_i64())],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Update an existing budget's fields.
///
/// # Errors
/// This function will return an:
/// - [Error::InvalidCategory] if the new category does not exist or belongs
///   to another user,
/// - [Error::DuplicateBudget] if the change collides with another budget's
///   (category, date range) combination,
/// - [Error::UpdateMissingBudget] if the budget does not exist or belongs to
///   another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_budget(
    budget_id: BudgetId,
    user_id: UserID,
    update: BudgetUpdate,
    connection: &Connection,
) -> Result<(), Error> {
    check_category_owner(update.category_id, user_id, connection)?;

    let rows_affected = connection
        .execute(
            "UPDATE budget
             SET category_id = ?1, amount = ?2, start_date = ?3, end_date = ?4, updated_at = ?5
             WHERE id = ?6 AND user_id = ?7",
            (
                update.category_id,
                update.amount,
                update.start_date,
                update.end_date,
                OffsetDateTime::now_utc(),
                budget_id,
                user_id.as_i64(),
            ),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateBudget,
            error => error.into(),
        })?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingBudget);
    }

    Ok(())
}

/// Delete a budget owned by `user_id`.
///
/// # Errors
/// Returns an [Error::DeleteMissingBudget] if the budget does not exist or
/// belongs to another user.
pub fn delete_budget(
    budget_id: BudgetId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM budget WHERE id = ?1 AND user_id = ?2",
        (budget_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingBudget);
    }

    Ok(())
}

fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        category_id: row.get(2)?,
        amount: row.get(3)?,
        start_date: row.get(4)?,
        end_date: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}
