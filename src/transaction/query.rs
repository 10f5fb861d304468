//! Database query helpers for the transactions page and dashboard.

use rusqlite::{Connection, Row, params};
use time::Date;

use crate::{Error, category::CategoryId, money::Money, user::UserID};

use super::TransactionId;

/// A transaction row joined with its category name for display.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TransactionRow {
    /// The ID of the transaction.
    pub(crate) id: TransactionId,
    /// The amount of money spent or earned.
    pub(crate) amount: Money,
    /// When the transaction happened.
    pub(crate) date: Date,
    /// A text description of what the transaction was for.
    pub(crate) description: String,
    /// The name of the transaction's category, if it has one.
    pub(crate) category_name: Option<String>,
    /// The ID of the transaction's category, if it has one.
    pub(crate) category_id: Option<CategoryId>,
    /// Whether the transaction is income rather than an expense.
    pub(crate) is_income: bool,
}

/// Get one page of a user's transactions, most recent first.
///
/// Rows are sorted by date descending and then ID ascending to keep the
/// order stable after updates.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub(crate) fn get_transaction_rows(
    user_id: UserID,
    limit: u64,
    offset: u64,
    connection: &Connection,
) -> Result<Vec<TransactionRow>, Error> {
    connection
        .prepare(
            "SELECT \"transaction\".id, amount, date, description, category.name, category.id,
                    is_income
             FROM \"transaction\"
             LEFT JOIN category ON \"transaction\".category_id = category.id
             WHERE \"transaction\".user_id = ?1
             ORDER BY date DESC, \"transaction\".id ASC
             LIMIT ?2 OFFSET ?3",
        )?
        .query_map(params![user_id.as_i64(), limit, offset], map_row)?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

/// Get a user's `limit` most recent transactions for the dashboard.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub(crate) fn get_recent_transaction_rows(
    user_id: UserID,
    limit: u64,
    connection: &Connection,
) -> Result<Vec<TransactionRow>, Error> {
    get_transaction_rows(user_id, limit, 0, connection)
}

fn map_row(row: &Row) -> Result<TransactionRow, rusqlite::Error> {
    Ok(TransactionRow {
        id: row.get(0)?,
        amount: row.get(1)?,
        date: row.get(2)?,
        description: row.get(3)?,
        category_name: row.get(4)?,
        category_id: row.get(5)?,
        is_income: row.get(6)?,
    })
}
