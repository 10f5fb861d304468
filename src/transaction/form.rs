//! The shared form data and field markup for creating and editing
//! transactions.

use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    category::{Category, CategoryId},
    html::{FORM_CHECKBOX_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE, FORM_TEXT_INPUT_STYLE},
    money::Money,
    timezone::parse_form_date,
};

/// The raw form fields submitted when creating or editing a transaction.
///
/// Everything arrives as strings; [parse_transaction_form] validates the
/// shape before any database work happens.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct TransactionFormData {
    /// The amount as typed by the user, e.g. "12.34".
    pub(crate) amount: String,
    /// The date as submitted by the date input, e.g. "2024-01-05".
    pub(crate) date: String,
    /// A text description of what the transaction was for.
    #[serde(default)]
    pub(crate) description: String,
    /// The selected category ID, or an empty string for "no category".
    #[serde(default)]
    pub(crate) category_id: String,
    /// Whether the transaction is income rather than an expense.
    #[serde(default)]
    pub(crate) is_income: bool,
}

/// A transaction form that passed shape validation.
#[derive(Debug, PartialEq)]
pub(crate) struct ParsedTransactionForm {
    pub(crate) amount: Money,
    pub(crate) date: Date,
    pub(crate) description: String,
    pub(crate) category_id: Option<CategoryId>,
    pub(crate) is_income: bool,
}

/// Validate the shape of a transaction form.
///
/// This is the first half of the two-step mutation contract: parse and
/// validate here, then let the insert surface ownership and uniqueness
/// violations as their own error variants.
///
/// # Errors
/// This function will return an:
/// - [Error::InvalidAmount] if the amount is not a decimal of at least $0.01,
/// - [Error::InvalidDateFormat] if the date is not a valid calendar date,
/// - or [Error::InvalidCategory] if the category selection is not a number.
pub(crate) fn parse_transaction_form(
    form: &TransactionFormData,
) -> Result<ParsedTransactionForm, Error> {
    let amount = Money::parse_positive(&form.amount)?;
    let date = parse_form_date(&form.date)?;

    let category_id = match form.category_id.trim() {
        "" => None,
        raw => Some(raw.parse().map_err(|_| Error::InvalidCategory(None))?),
    };

    Ok(ParsedTransactionForm {
        amount,
        date,
        description: form.description.trim().to_owned(),
        category_id,
        is_income: form.is_income,
    })
}

/// The values used to pre-fill the transaction form fields.
pub(crate) struct TransactionFormValues<'a> {
    pub(crate) amount: String,
    pub(crate) date: String,
    pub(crate) description: &'a str,
    pub(crate) category_id: Option<CategoryId>,
    pub(crate) is_income: bool,
}

/// Render the input fields shared by the create and edit transaction forms.
pub(crate) fn transaction_form_fields(
    values: &TransactionFormValues,
    categories: &[Category],
) -> Markup {
    html! {
        div
        {
            label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

            input
                id="amount"
                type="text"
                inputmode="decimal"
                name="amount"
                placeholder="0.00"
                value=(values.amount)
                required
                autofocus
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="date" class=(FORM_LABEL_STYLE) { "Date" }

            input
                id="date"
                type="date"
                name="date"
                value=(values.date)
                required
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="description" class=(FORM_LABEL_STYLE) { "Description" }

            input
                id="description"
                type="text"
                name="description"
                placeholder="What was this for?"
                value=(values.description)
                class=(FORM_TEXT_INPUT_STYLE);
        }

        div
        {
            label for="category-id" class=(FORM_LABEL_STYLE) { "Category" }

            select id="category-id" name="category_id" class=(FORM_SELECT_STYLE)
            {
                option value="" selected[values.category_id.is_none()] { "No category" }

                @for category in categories
                {
                    option
                        value=(category.id)
                        selected[values.category_id == Some(category.id)]
                    {
                        (category.name)
                    }
                }
            }
        }

        div class="flex items-center gap-2"
        {
            input
                id="is-income"
                type="checkbox"
                name="is_income"
                value="true"
                checked[values.is_income]
                class=(FORM_CHECKBOX_STYLE);

            label for="is-income" class=(FORM_LABEL_STYLE) { "This is income" }
        }
    }
}
