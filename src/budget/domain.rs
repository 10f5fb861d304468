//! Core budget domain types and form parsing.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error, category::CategoryId, money::Money, timezone::parse_form_date, user::UserID,
};

/// Database identifier for a budget.
pub type BudgetId = i64;

/// A user-defined spending cap for one category over a date range.
///
/// How much of the budget has been spent is never stored; it is always
/// derived from live transaction data by
/// [evaluate_budget](crate::budget::evaluate_budget).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// The ID of the budget.
    pub id: BudgetId,
    /// The user the budget belongs to.
    pub user_id: UserID,
    /// The category the budget caps spending for.
    pub category_id: CategoryId,
    /// The spending cap.
    pub amount: Money,
    /// The first day the budget covers.
    pub start_date: Date,
    /// The last day the budget covers, inclusive.
    pub end_date: Date,
    /// When the budget was created.
    pub created_at: OffsetDateTime,
    /// When the budget was last modified.
    pub updated_at: OffsetDateTime,
}

/// The data needed to create a new budget.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    /// The user creating the budget.
    pub user_id: UserID,
    /// The category the budget caps spending for.
    pub category_id: CategoryId,
    /// The spending cap.
    pub amount: Money,
    /// The first day the budget covers.
    pub start_date: Date,
    /// The last day the budget covers, inclusive.
    pub end_date: Date,
}

/// The editable fields of an existing budget.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetUpdate {
    /// The category the budget caps spending for.
    pub category_id: CategoryId,
    /// The spending cap.
    pub amount: Money,
    /// The first day the budget covers.
    pub start_date: Date,
    /// The last day the budget covers, inclusive.
    pub end_date: Date,
}

/// The raw form fields submitted when creating or editing a budget.
#[derive(Debug, Serialize, Deserialize)]
pub struct BudgetFormData {
    /// The selected category ID.
    #[serde(default)]
    pub category_id: String,
    /// The amount as typed by the user.
    pub amount: String,
    /// The first day the budget covers.
    pub start_date: String,
    /// The last day the budget covers.
    pub end_date: String,
}

/// A budget form that passed shape validation.
#[derive(Debug, PartialEq)]
pub(crate) struct ParsedBudgetForm {
    pub(crate) category_id: CategoryId,
    pub(crate) amount: Money,
    pub(crate) start_date: Date,
    pub(crate) end_date: Date,
}

/// Validate the shape of a budget form.
///
/// # Errors
/// This function will return an:
/// - [Error::InvalidCategory] if no category was selected,
/// - [Error::InvalidAmount] if the amount is not a decimal of at least $0.01,
/// - [Error::InvalidDateFormat] if either date is invalid,
/// - or [Error::InvalidDateRange] if the end date is before the start date.
pub(crate) fn parse_budget_form(form: &BudgetFormData) -> Result<ParsedBudgetForm, Error> {
    let category_id = match form.category_id.trim() {
        "" => return Err(Error::InvalidCategory(None)),
        raw => raw.parse().map_err(|_| Error::InvalidCategory(None))?,
    };

    let amount = Money::parse_positive(&form.amount)?;
    let start_date = parse_form_date(&form.start_date)?;
    let end_date = parse_form_date(&form.end_date)?;

    if end_date < start_date {
        return Err(Error::InvalidDateRange(start_date, end_date));
    }

    Ok(ParsedBudgetForm {
        category_id,
        amount,
        start_date,
        end_date,
    })
}
