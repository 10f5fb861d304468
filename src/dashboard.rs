//! The dashboard page: a month-to-date overview of the user's finances.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::{Connection, params};
use time::{Date, Month, util::days_in_year_month};

use crate::{
    AppState, Error,
    category::{Category, CategoryId, get_categories},
    endpoints,
    html::{CARD_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base},
    money::Money,
    navigation::NavBar,
    timezone::{get_local_offset, local_today},
    transaction::{
        CategoryFilter, TransactionKind, TransactionRow, get_recent_transaction_rows,
        sum_transactions,
    },
    user::UserID,
};

/// The number of recent transactions shown on the dashboard.
const RECENT_TRANSACTION_COUNT: u64 = 5;

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The shared database connection.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A category's actual spending compared against its budgeted amount for the
/// current month.
#[derive(Debug, PartialEq)]
struct CategoryComparison {
    name: String,
    spent: Money,
    budgeted: Money,
}

/// Display a page with an overview of the user's current month.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let local_offset = get_local_offset(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezone(state.local_timezone.clone()))?;
    let today = local_today(local_offset);
    let (month_start, month_end) = month_bounds(today);

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let total_income = sum_transactions(
        user_id,
        month_start..=month_end,
        TransactionKind::Income,
        CategoryFilter::Any,
        &connection,
    )?;
    let total_expenses = sum_transactions(
        user_id,
        month_start..=month_end,
        TransactionKind::Expense,
        CategoryFilter::Any,
        &connection,
    )?;
    let balance = total_income - total_expenses;

    let recent_transactions =
        get_recent_transaction_rows(user_id, RECENT_TRANSACTION_COUNT, &connection)?;

    // One aggregation per category; only categories with spending or a
    // budget this month make it onto the dashboard.
    let mut comparisons = Vec::new();
    for category in get_categories(user_id, &connection)? {
        let Category { id, name, .. } = category;

        let spent = sum_transactions(
            user_id,
            month_start..=month_end,
            TransactionKind::Expense,
            CategoryFilter::Id(id),
            &connection,
        )?;
        let budgeted =
            sum_overlapping_budgets(user_id, id, month_start, month_end, &connection)?;

        if !spent.is_zero() || !budgeted.is_zero() {
            comparisons.push(CategoryComparison {
                name: name.to_string(),
                spent,
                budgeted,
            });
        }
    }

    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let content = html! {
        (nav_bar)
        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-1" { "Dashboard" }
            p class="mb-4 text-gray-500 dark:text-gray-400" { (month_label(today)) }

            (summary_cards(total_income, total_expenses, balance))
            (category_comparison_view(&comparisons))
            (recent_transactions_view(&recent_transactions))
        }
    };

    Ok(base("Dashboard", &content).into_response())
}

/// The first and last day of the month containing `date`.
fn month_bounds(date: Date) -> (Date, Date) {
    let start = date.replace_day(1).expect("day 1 is valid for every month");
    let end = date
        .replace_day(days_in_year_month(date.year(), date.month()))
        .expect("last day of month is valid");

    (start, end)
}

/// The sum of the user's budget amounts for one category whose date ranges
/// overlap the given period.
fn sum_overlapping_budgets(
    user_id: UserID,
    category_id: CategoryId,
    period_start: Date,
    period_end: Date,
    connection: &Connection,
) -> Result<Money, Error> {
    connection
        .query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM budget
             WHERE user_id = ?1 AND category_id = ?2
               AND start_date <= ?3 AND end_date >= ?4",
            params![user_id.as_i64(), category_id, period_end, period_start],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

fn month_label(date: Date) -> String {
    let month_name = match date.month() {
        Month::January => "January",
        Month::February => "February",
        Month::March => "March",
        Month::April => "April",
        Month::May => "May",
        Month::June => "June",
        Month::July => "July",
        Month::August => "August",
        Month::September => "September",
        Month::October => "October",
        Month::November => "November",
        Month::December => "December",
    };

    format!("{} {}", month_name, date.year())
}

fn summary_cards(total_income: Money, total_expenses: Money, balance: Money) -> Markup {
    html! {
        div class="grid grid-cols-1 sm:grid-cols-3 gap-4 w-full mb-6"
        {
            div class=(CARD_STYLE)
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { "Income this month" }
                p class="text-xl font-semibold text-green-600 dark:text-green-400" { (total_income) }
            }

            div class=(CARD_STYLE)
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { "Expenses this month" }
                p class="text-xl font-semibold text-red-600 dark:text-red-400" { (total_expenses) }
            }

            div class=(CARD_STYLE)
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { "Balance" }
                p class="text-xl font-semibold" { (balance) }
            }
        }
    }
}

fn category_comparison_view(comparisons: &[CategoryComparison]) -> Markup {
    html! {
        @if !comparisons.is_empty() {
            div class="w-full mb-6"
            {
                h2 class="text-xl font-bold mb-2" { "Spending by category" }

                @for comparison in comparisons
                {
                    div class="mb-2"
                    {
                        div class="flex justify-between text-sm"
                        {
                            span { (comparison.name) }
                            span
                            {
                                (comparison.spent)
                                @if !comparison.budgeted.is_zero() {
                                    " of " (comparison.budgeted) " budgeted"
                                }
                            }
                        }

                        (comparison_bar(comparison))
                    }
                }
            }
        }
    }
}

fn comparison_bar(comparison: &CategoryComparison) -> Markup {
    let percent = if comparison.budgeted.is_zero() {
        100
    } else {
        (comparison.spent.as_cents().saturating_mul(100) / comparison.budgeted.as_cents())
            .clamp(0, 100)
    };
    let bar_color = if percent >= 100 {
        "bg-red-600"
    } else {
        "bg-blue-600"
    };

    html! {
        div class="w-full bg-gray-200 rounded-full h-2.5 dark:bg-gray-700"
        {
            div
                class=(format!("{bar_color} h-2.5 rounded-full"))
                style=(format!("width: {percent}%"))
            {}
        }
    }
}

fn recent_transactions_view(transactions: &[TransactionRow]) -> Markup {
    html! {
        div class="w-full"
        {
            h2 class="text-xl font-bold mb-2" { "Recent transactions" }

            @if transactions.is_empty() {
                p
                {
                    "Nothing recorded yet. "
                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE) { "Add your first transaction" }
                    "."
                }
            } @else {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                        }
                    }

                    tbody
                    {
                        @for transaction in transactions
                        {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE) { (transaction.date) }
                                td class=(TABLE_CELL_STYLE) { (transaction.description) }
                                td class=(TABLE_CELL_STYLE)
                                {
                                    @if transaction.is_income {
                                        span class="text-green-600 dark:text-green-400" { "+" (transaction.amount) }
                                    } @else {
                                        span class="text-red-600 dark:text-red-400" { "-" (transaction.amount) }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
