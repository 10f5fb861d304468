//! Summation of transaction amounts under a filter predicate.
//!
//! This is the one query the budget evaluator, report generator and
//! dashboard all lean on: the sum of a user's transactions in an inclusive
//! date range, split by income/expense and optionally restricted to one
//! category. An empty result set sums to zero rather than erroring.

use std::ops::RangeInclusive;

use rusqlite::{Connection, params};
use time::Date;

use crate::{Error, category::CategoryId, money::Money, user::UserID};

/// Whether to sum income or expense transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    /// Transactions flagged as income.
    Income,
    /// Transactions flagged as expenses.
    Expense,
}

/// Which categories to include in an aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFilter {
    /// Include transactions regardless of category.
    Any,
    /// Include only transactions without a category.
    Uncategorized,
    /// Include only transactions filed under one category.
    Id(CategoryId),
}

/// Sum the amounts of a user's transactions matching the given filters.
///
/// The date range is inclusive at both ends. Returns [Money::ZERO] when no
/// transactions match; "no rows" is never an error. The query is a pure read
/// with no side effects, so it is safe to call once per category when
/// rendering the dashboard.
///
/// # Errors
/// Returns an [Error::SqlError] if the query itself fails.
pub fn sum_transactions(
    user_id: UserID,
    date_range: RangeInclusive<Date>,
    kind: TransactionKind,
    category: CategoryFilter,
    connection: &Connection,
) -> Result<Money, Error> {
    let is_income = kind == TransactionKind::Income;
    let (start, end) = (date_range.start(), date_range.end());

    let total = match category {
        CategoryFilter::Any => connection.query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM \"transaction\"
             WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3 AND is_income = ?4",
            params![user_id.as_i64(), start, end, is_income],
            |row| row.get(0),
        )?,
        CategoryFilter::Uncategorized => connection.query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM \"transaction\"
             WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3 AND is_income = ?4
               AND category_id IS NULL",
            params![user_id.as_i64(), start, end, is_income],
            |row| row.get(0),
        )?,
        CategoryFilter::Id(category_id) => connection.query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM \"transaction\"
             WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3 AND is_income = ?4
               AND category_id = ?5",
            params![user_id.as_i64(), start, end, is_income, category_id],
            |row| row.get(0),
        )?,
    };

    Ok(total)
}
