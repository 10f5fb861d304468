//! Defines the core data model and database queries for transactions.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    category::{CategoryId, get_category},
    money::Money,
    user::UserID,
};

/// Database identifier for a transaction.
pub type TransactionId = i64;

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user the transaction belongs to.
    pub user_id: UserID,
    /// The amount of money spent or earned, always at least $0.01.
    pub amount: Money,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The category the transaction belongs to, if any.
    ///
    /// Cleared when the category is deleted.
    pub category_id: Option<CategoryId>,
    /// Whether the transaction is income rather than an expense.
    pub is_income: bool,
    /// When the transaction was recorded.
    pub created_at: OffsetDateTime,
    /// When the transaction was last modified.
    pub updated_at: OffsetDateTime,
}

/// The data needed to record a new transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The user recording the transaction.
    pub user_id: UserID,
    /// The amount of money spent or earned.
    pub amount: Money,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The category to file the transaction under, if any.
    pub category_id: Option<CategoryId>,
    /// Whether the transaction is income rather than an expense.
    pub is_income: bool,
}

/// The editable fields of an existing transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionUpdate {
    /// The amount of money spent or earned.
    pub amount: Money,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The category to file the transaction under, if any.
    pub category_id: Option<CategoryId>,
    /// Whether the transaction is income rather than an expense.
    pub is_income: bool,
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            amount INTEGER NOT NULL,
            date TEXT NOT NULL,
            description TEXT NOT NULL,
            category_id INTEGER,
            is_income INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
    )?;

    Ok(())
}

/// Check that a transaction's category, if set, is one of the user's own.
///
/// A missing category and another user's category both map to
/// [Error::InvalidCategory] so the response does not reveal whether the
/// category exists.
fn check_category_owner(
    category_id: Option<CategoryId>,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let Some(category_id) = category_id else {
        return Ok(());
    };

    get_category(category_id, user_id, connection)
        .map(|_| ())
        .map_err(|error| match error {
            Error::NotFound => Error::InvalidCategory(Some(category_id)),
            error => error,
        })
}

/// Create a new transaction in the database.
///
/// # Errors
/// This function will return an:
/// - [Error::InvalidCategory] if the category does not exist or belongs to
///   another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    check_category_owner(new_transaction.category_id, new_transaction.user_id, connection)?;

    let now = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO \"transaction\"
            (user_id, amount, date, description, category_id, is_income, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        (
            new_transaction.user_id.as_i64(),
            new_transaction.amount,
            new_transaction.date,
            &new_transaction.description,
            new_transaction.category_id,
            new_transaction.is_income,
            now,
            now,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Transaction {
        id,
        user_id: new_transaction.user_id,
        amount: new_transaction.amount,
        date: new_transaction.date,
        description: new_transaction.description,
        category_id: new_transaction.category_id,
        is_income: new_transaction.is_income,
        created_at: now,
        updated_at: now,
    })
}

/// Retrieve a transaction owned by `user_id`.
///
/// # Errors
/// Returns an [Error::NotFound] if the transaction does not exist or belongs
/// to another user.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT id, user_id, amount, date, description, category_id, is_income,
                    created_at, updated_at
             FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve all of a user's transactions, most recent first.
///
/// Rows are ordered by date descending with the ID as a tie-break so the
/// order is stable across updates.
pub fn get_transactions(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, amount, date, description, category_id, is_income,
                    created_at, updated_at
             FROM \"transaction\" WHERE user_id = :user_id
             ORDER BY date DESC, id ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Update an existing transaction's fields.
///
/// # Errors
/// This function will return an:
/// - [Error::InvalidCategory] if the new category does not exist or belongs
///   to another user,
/// - [Error::UpdateMissingTransaction] if the transaction does not exist or
///   belongs to another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    user_id: UserID,
    update: TransactionUpdate,
    connection: &Connection,
) -> Result<(), Error> {
    check_category_owner(update.category_id, user_id, connection)?;

    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
         SET amount = ?1, date = ?2, description = ?3, category_id = ?4, is_income = ?5,
             updated_at = ?6
         WHERE id = ?7 AND user_id = ?8",
        (
            update.amount,
            update.date,
            &update.description,
            update.category_id,
            update.is_income,
            OffsetDateTime::now_utc(),
            id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(())
}

/// Delete a transaction owned by `user_id`.
///
/// # Errors
/// Returns an [Error::DeleteMissingTransaction] if the transaction does not
/// exist or belongs to another user.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Get the number of transactions a user has.
///
/// # Errors
/// Returns an [Error::SqlError] if there is some SQL error.
pub fn count_transactions(user_id: UserID, connection: &Connection) -> Result<u64, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE user_id = :user_id",
            &[(":user_id", &user_id.as_i64())],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        amount: row.get(2)?,
        date: row.get(3)?,
        description: row.get(4)?,
        category_id: row.get(5)?,
        is_income: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

#[cfg(test)]
mod database_tests {
    use time::macros::date;

    use crate::{
        Error,
        category::{CategoryName, create_category},
        money::Money,
        test_utils::{get_test_connection, insert_test_user, new_test_transaction},
        transaction::{
            TransactionUpdate, count_transactions, create_transaction, delete_transaction,
            get_transaction, get_transactions, update_transaction,
        },
    };

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn);

        let transaction = create_transaction(
            new_test_transaction(user.id, 1230, date!(2024 - 01 - 05)),
            &conn,
        )
        .expect("Could not create transaction");

        assert!(transaction.id > 0);
        assert_eq!(transaction.amount, Money::from_cents(1230));
        assert_eq!(transaction.date, date!(2024 - 01 - 05));
    }

    #[test]
    fn create_fails_on_other_users_category() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn);
        let other_user = insert_test_user(&conn);
        let someone_elses_category = create_category(
            CategoryName::new_unchecked("Food"),
            false,
            other_user.id,
            &conn,
        )
        .unwrap();

        let mut new_transaction = new_test_transaction(user.id, 1230, date!(2024 - 01 - 05));
        new_transaction.category_id = Some(someone_elses_category.id);

        let result = create_transaction(new_transaction, &conn);

        // The same error as a non-existent category so the response does not
        // reveal that the category exists and belongs to someone else.
        assert_eq!(
            result,
            Err(Error::InvalidCategory(Some(someone_elses_category.id)))
        );
    }

    #[test]
    fn create_fails_on_missing_category() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn);

        let mut new_transaction = new_test_transaction(user.id, 1230, date!(2024 - 01 - 05));
        new_transaction.category_id = Some(42);

        let result = create_transaction(new_transaction, &conn);

        assert_eq!(result, Err(Error::InvalidCategory(Some(42))));
    }

    #[test]
    fn get_transaction_does_not_leak_other_users_transactions() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn);
        let other_user = insert_test_user(&conn);
        let transaction = create_transaction(
            new_test_transaction(user.id, 1230, date!(2024 - 01 - 05)),
            &conn,
        )
        .unwrap();

        let result = get_transaction(transaction.id, other_user.id, &conn);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn get_transactions_orders_by_date_descending_then_id() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn);
        let first = create_transaction(
            new_test_transaction(user.id, 100, date!(2024 - 01 - 05)),
            &conn,
        )
        .unwrap();
        let second = create_transaction(
            new_test_transaction(user.id, 200, date!(2024 - 02 - 01)),
            &conn,
        )
        .unwrap();
        let third = create_transaction(
            new_test_transaction(user.id, 300, date!(2024 - 01 - 05)),
            &conn,
        )
        .unwrap();

        let transactions = get_transactions(user.id, &conn).unwrap();

        let ids: Vec<i64> = transactions.iter().map(|t| t.id).collect();
        assert_eq!(ids, [second.id, first.id, third.id]);
    }

    #[test]
    fn update_succeeds() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn);
        let transaction = create_transaction(
            new_test_transaction(user.id, 1230, date!(2024 - 01 - 05)),
            &conn,
        )
        .unwrap();

        update_transaction(
            transaction.id,
            user.id,
            TransactionUpdate {
                amount: Money::from_cents(4560),
                date: date!(2024 - 01 - 06),
                description: "Updated".to_string(),
                category_id: None,
                is_income: true,
            },
            &conn,
        )
        .expect("Could not update transaction");

        let updated = get_transaction(transaction.id, user.id, &conn).unwrap();
        assert_eq!(updated.amount, Money::from_cents(4560));
        assert_eq!(updated.date, date!(2024 - 01 - 06));
        assert_eq!(updated.description, "Updated");
        assert!(updated.is_income);
    }

    #[test]
    fn update_fails_for_other_users_transaction() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn);
        let other_user = insert_test_user(&conn);
        let transaction = create_transaction(
            new_test_transaction(user.id, 1230, date!(2024 - 01 - 05)),
            &conn,
        )
        .unwrap();

        let result = update_transaction(
            transaction.id,
            other_user.id,
            TransactionUpdate {
                amount: Money::from_cents(1),
                date: date!(2024 - 01 - 06),
                description: String::new(),
                category_id: None,
                is_income: false,
            },
            &conn,
        );

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
    }

    #[test]
    fn delete_succeeds() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn);
        let transaction = create_transaction(
            new_test_transaction(user.id, 1230, date!(2024 - 01 - 05)),
            &conn,
        )
        .unwrap();

        delete_transaction(transaction.id, user.id, &conn).expect("Could not delete transaction");

        assert_eq!(
            get_transaction(transaction.id, user.id, &conn),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_fails_on_missing_transaction() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn);

        let result = delete_transaction(999, user.id, &conn);

        assert_eq!(result, Err(Error::DeleteMissingTransaction));
    }

    #[test]
    fn counts_only_own_transactions() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn);
        let other_user = insert_test_user(&conn);
        for i in 1..=3 {
            create_transaction(
                new_test_transaction(user.id, i * 100, date!(2024 - 01 - 05)),
                &conn,
            )
            .unwrap();
        }
        create_transaction(
            new_test_transaction(other_user.id, 100, date!(2024 - 01 - 05)),
            &conn,
        )
        .unwrap();

        assert_eq!(count_transactions(user.id, &conn), Ok(3));
    }
}
