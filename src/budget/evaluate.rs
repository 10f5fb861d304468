//! Derives a budget's progress from live transaction data.

use rusqlite::Connection;

use crate::{
    Error,
    budget::Budget,
    money::Money,
    transaction::{CategoryFilter, TransactionKind, sum_transactions},
};

/// How much of a budget has been used, derived at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetProgress {
    /// The sum of expense transactions in the budget's category and date range.
    pub spent: Money,
    /// The budgeted amount minus what was spent. Negative when overspent.
    pub remaining: Money,
    /// The share of the budget spent, as a whole percentage capped at 100.
    pub percent_spent: u8,
}

/// Evaluate a budget against the user's live transactions.
///
/// Only expense transactions filed under the budget's category and dated
/// within the budget's inclusive date range count towards `spent`. The
/// arithmetic is exact integer cents; `remaining` is always
/// `amount - spent`.
///
/// # Errors
/// Returns an [Error::SqlError] if the aggregation query fails.
pub fn evaluate_budget(budget: &Budget, connection: &Connection) -> Result<BudgetProgress, Error> {
    let spent = sum_transactions(
        budget.user_id,
        budget.start_date..=budget.end_date,
        TransactionKind::Expense,
        CategoryFilter::Id(budget.category_id),
        connection,
    )?;

    Ok(BudgetProgress {
        spent,
        remaining: budget.amount - spent,
        percent_spent: percent_spent(spent, budget.amount),
    })
}

/// The share of `amount` taken up by `spent`, as a whole percentage.
///
/// A zero-amount budget never divides and reports 0; overspent budgets are
/// capped at 100.
fn percent_spent(spent: Money, amount: Money) -> u8 {
    if amount.is_zero() {
        return 0;
    }

    let percent = spent.as_cents().saturating_mul(100) / amount.as_cents();

    percent.clamp(0, 100) as u8
}


#[cfg(test)]
mod evaluate_budget_tests {
    use time::macros::date;

    use crate::{
        budget::create_budget,
        category::{CategoryName, create_category},
        money::Money,
        test_utils::{
            get_test_connection, insert_test_user, new_test_budget, new_test_transaction,
        },
        transaction::create_transaction,
    };

    use super::evaluate_budget;

    #[test]
    fn reports_zero_spending_for_empty_range() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn);
        let category =
            create_category(CategoryName::new_unchecked("Food"), false, user.id, &conn).unwrap();
        let budget = create_budget(
            new_test_budget(
                user.id,
                category.id,
                25000,
                date!(2024 - 01 - 01),
                date!(2024 - 01 - 31),
            ),
            &conn,
        )
        .unwrap();

        let progress = evaluate_budget(&budget, &conn).unwrap();

        assert_eq!(progress.spent, Money::ZERO);
        assert_eq!(progress.remaining, Money::from_cents(25000));
        assert_eq!(progress.percent_spent, 0);
    }

    #[test]
    fn remaining_is_exactly_amount_minus_spent() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn);
        let category =
            create_category(CategoryName::new_unchecked("Food"), false, user.id, &conn).unwrap();
        let budget = create_budget(
            new_test_budget(
                user.id,
                category.id,
                25000,
                date!(2024 - 01 - 01),
                date!(2024 - 01 - 31),
            ),
            &conn,
        )
        .unwrap();

        // 0.10 + 0.20 style cent values that would drift as binary floats.
        for cents in [1010, 2020, 3030] {
            let mut transaction = new_test_transaction(user.id, cents, date!(2024 - 01 - 15));
            transaction.category_id = Some(category.id);
            create_transaction(transaction, &conn).unwrap();
        }

        let progress = evaluate_budget(&budget, &conn).unwrap();

        assert_eq!(progress.spent, Money::from_cents(6060));
        assert_eq!(progress.remaining, Money::from_cents(25000 - 6060));
        assert_eq!(
            budget.amount - progress.spent,
            progress.remaining,
            "remaining must be exactly amount minus spent"
        );
    }

    #[test]
    fn overspent_budget_caps_percentage_and_goes_negative() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn);
        let category =
            create_category(CategoryName::new_unchecked("Food"), false, user.id, &conn).unwrap();
        let budget = create_budget(
            new_test_budget(
                user.id,
                category.id,
                10000,
                date!(2024 - 01 - 01),
                date!(2024 - 01 - 31),
            ),
            &conn,
        )
        .unwrap();

        let mut transaction = new_test_transaction(user.id, 15000, date!(2024 - 01 - 15));
        transaction.category_id = Some(category.id);
        create_transaction(transaction, &conn).unwrap();

        let progress = evaluate_budget(&budget, &conn).unwrap();

        assert_eq!(progress.spent, Money::from_cents(15000));
        assert_eq!(progress.remaining, Money::from_cents(-5000));
        assert_eq!(progress.percent_spent, 100);
    }

    #[test]
    fn ignores_income_and_other_categories() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn);
        let category =
            create_category(CategoryName::new_unchecked("Food"), false, user.id, &conn).unwrap();
        let other_category =
            create_category(CategoryName::new_unchecked("Fuel"), false, user.id, &conn).unwrap();
        let budget = create_budget(
            new_test_budget(
                user.id,
                category.id,
                10000,
                date!(2024 - 01 - 01),
                date!(2024 - 01 - 31),
            ),
            &conn,
        )
        .unwrap();

        let mut in_category = new_test_transaction(user.id, 3000, date!(2024 - 01 - 10));
        in_category.category_id = Some(category.id);
        create_transaction(in_category, &conn).unwrap();

        let mut other = new_test_transaction(user.id, 4000, date!(2024 - 01 - 10));
        other.category_id = Some(other_category.id);
        create_transaction(other, &conn).unwrap();

        let mut income = new_test_transaction(user.id, 5000, date!(2024 - 01 - 10));
        income.category_id = Some(category.id);
        income.is_income = true;
        create_transaction(income, &conn).unwrap();

        let progress = evaluate_budget(&budget, &conn).unwrap();

        assert_eq!(progress.spent, Money::from_cents(3000));
    }

    #[test]
    fn ignores_transactions_outside_date_range() {
        let conn = get_test_connection();
        let user = insert_test_user(&conn);
        let category =
            create_category(CategoryName::new_unchecked("Food"), false, user.id, &conn).unwrap();
        let budget = create_budget(
            new_test_budget(
                user.id,
                category.id,
                10000,
                date!(2024 - 01 - 01),
                date!(2024 - 01 - 31),
            ),
            &conn,
        )
        .unwrap();

        let mut before = new_test_transaction(user.id, 1000, date!(2023 - 12 - 31));
        before.category_id = Some(category.id);
        create_transaction(before, &conn).unwrap();

        let mut after = new_test_transaction(user.id, 2000, date!(2024 - 02 - 01));
        after.category_id = Some(category.id);
        create_transaction(after, &conn).unwrap();

        let progress = evaluate_budget(&budget, &conn).unwrap();

        assert_eq!(progress.spent, Money::ZERO);
    }
}
