//! The page listing a user's budgets with live progress.

use axum::{
    Extension,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    Error,
    budget::{
        BudgetEndpointState, BudgetProgress, BudgetRow, count_budgets, evaluate_budget,
        get_budget_rows,
    },
    endpoints,
    html::{
        BUTTON_DELETE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
    },
    navigation::NavBar,
    pagination::{Pager, PaginationIndicator},
    user::UserID,
};

/// The query parameters accepted by the budgets page.
#[derive(Debug, Deserialize)]
pub struct BudgetsPageQuery {
    /// The 1-based page number to display.
    page: Option<u64>,
}

/// Display the user's budgets with how much of each has been spent.
///
/// Progress is computed from live transaction data for every render; there
/// is no cached "spent" value that could go stale.
pub async fn get_budgets_page(
    State(state): State<BudgetEndpointState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<BudgetsPageQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let row_count = count_budgets(user_id, &connection)?;
    let pager = Pager::new(
        row_count,
        query.page.unwrap_or(state.pagination_config.default_page),
        state.pagination_config.page_size,
    );
    let rows = get_budget_rows(user_id, pager.page_size, pager.offset(), &connection)?;

    let rows_with_progress: Vec<(BudgetRow, BudgetProgress)> = rows
        .into_iter()
        .map(|row| {
            let progress = evaluate_budget(&row.budget, &connection)?;
            Ok((row, progress))
        })
        .collect::<Result<_, Error>>()?;

    let nav_bar = NavBar::new(endpoints::BUDGETS_VIEW).into_html();
    let content = html! {
        (nav_bar)
        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-4" { "Budgets" }

            a href=(endpoints::NEW_BUDGET_VIEW) class=(LINK_STYLE) { "Create budget" }

            @if rows_with_progress.is_empty() {
                p class="mt-4" { "No budgets yet. Create one to keep spending in check." }
            } @else {
                (budgets_table(&rows_with_progress))
                (pagination_view(&pager, state.pagination_config.max_indicator_pages))
            }
        }
    };

    Ok(base("Budgets", &content).into_response())
}

fn budgets_table(rows: &[(BudgetRow, BudgetProgress)]) -> Markup {
    html! {
        table class="w-full mt-4 text-sm text-left text-gray-500 dark:text-gray-400"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Period" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Budgeted" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Spent" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Remaining" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Progress" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                }
            }

            tbody
            {
                @for (row, progress) in rows
                {
                    tr class=(TABLE_ROW_STYLE)
                    {
                        td class=(TABLE_CELL_STYLE) { (row.category_name) }
                        td class=(TABLE_CELL_STYLE)
                        {
                            (row.budget.start_date) " to " (row.budget.end_date)
                        }
                        td class=(TABLE_CELL_STYLE) { (row.budget.amount) }
                        td class=(TABLE_CELL_STYLE) { (progress.spent) }
                        td class=(TABLE_CELL_STYLE)
                        {
                            @if progress.remaining.as_cents() < 0 {
                                span class="text-red-600 dark:text-red-400" { (progress.remaining) }
                            } @else {
                                (progress.remaining)
                            }
                        }
                        td class=(TABLE_CELL_STYLE) { (progress_bar(progress.percent_spent)) }
                        td class=(TABLE_CELL_STYLE)
                        {
                            a
                                href=(endpoints::format_endpoint(endpoints::EDIT_BUDGET_VIEW, row.budget.id))
                                class=(LINK_STYLE)
                            {
                                "Edit"
                            }

                            " "

                            button
                                hx-delete=(endpoints::format_endpoint(endpoints::DELETE_BUDGET, row.budget.id))
                                hx-confirm="Delete this budget?"
                                hx-target-error="#alert-container"
                                class=(BUTTON_DELETE_STYLE)
                            {
                                "Delete"
                            }
                        }
                    }
                }
            }
        }
    }
}

fn progress_bar(percent_spent: u8) -> Markup {
    let bar_color = if percent_spent >= 100 {
        "bg-red-600"
    } else if percent_spent >= 75 {
        "bg-yellow-400"
    } else {
        "bg-blue-600"
    };

    html! {
        div class="w-full bg-gray-200 rounded-full h-4 dark:bg-gray-700"
        {
            div
                class=(format!("{bar_color} h-4 rounded-full"))
                style=(format!("width: {percent_spent}%"))
            {}
        }

        span class="text-xs" { (percent_spent) "%" }
    }
}

fn pagination_view(pager: &Pager, max_indicator_pages: u64) -> Markup {
    let page_url = |page: u64| format!("{}?page={}", endpoints::BUDGETS_VIEW, page);

    html! {
        nav class="flex gap-2 mt-4" aria-label="Budget pages"
        {
            @for indicator in pager.indicators(max_indicator_pages)
            {
                @match indicator {
                    PaginationIndicator::BackButton(page) => {
                        a href=(page_url(page)) class=(LINK_STYLE) { "Previous" }
                    }
                    PaginationIndicator::Page(page) => {
                        a href=(page_url(page)) class=(LINK_STYLE) { (page) }
                    }
                    PaginationIndicator::CurrPage(page) => {
                        span class="font-bold" { (page) }
                    }
                    PaginationIndicator::Ellipsis => {
                        span { "…" }
                    }
                    PaginationIndicator::NextButton(page) => {
                        a href=(page_url(page)) class=(LINK_STYLE) { "Next" }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod budgets_page_tests {
    use axum::{
        Extension,
        extract::{Query, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use time::macros::date;

    use crate::{
        budget::{BudgetEndpointState, create_budget, get_budgets_page},
        category::{CategoryName, create_category},
        test_utils::{
            assert_valid_html, get_test_app_state, insert_test_user, new_test_budget,
            new_test_transaction, parse_html_document,
        },
        transaction::create_transaction,
    };

    use super::BudgetsPageQuery;

    #[tokio::test]
    async fn shows_live_progress() {
        let state = get_test_app_state();
        let user = {
            let connection = state.db_connection.lock().unwrap();
            let user = insert_test_user(&connection);
            let category = create_category(
                CategoryName::new_unchecked("Food"),
                false,
                user.id,
                &connection,
            )
            .unwrap();
            create_budget(
                new_test_budget(
                    user.id,
                    category.id,
                    20000,
                    date!(2024 - 01 - 01),
                    date!(2024 - 01 - 31),
                ),
                &connection,
            )
            .unwrap();

            let mut transaction = new_test_transaction(user.id, 5000, date!(2024 - 01 - 10));
            transaction.category_id = Some(category.id);
            create_transaction(transaction, &connection).unwrap();

            user
        };

        let response = get_budgets_page(
            State(BudgetEndpointState {
                db_connection: state.db_connection.clone(),
                pagination_config: state.pagination_config.clone(),
            }),
            Extension(user.id),
            Query(BudgetsPageQuery { page: None }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let text = html.root_element().text().collect::<Vec<_>>().join("");
        assert!(text.contains("$200.00"), "budgeted amount missing: {text}");
        assert!(text.contains("$50.00"), "spent amount missing: {text}");
        assert!(text.contains("$150.00"), "remaining amount missing: {text}");
        assert!(text.contains("25%"), "percentage missing: {text}");
    }

    #[tokio::test]
    async fn shows_empty_state_without_budgets() {
        let state = get_test_app_state();
        let user = insert_test_user(&state.db_connection.lock().unwrap());

        let response = get_budgets_page(
            State(BudgetEndpointState {
                db_connection: state.db_connection.clone(),
                pagination_config: state.pagination_config.clone(),
            }),
            Extension(user.id),
            Query(BudgetsPageQuery { page: None }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_document(response).await;
        let text = html.root_element().text().collect::<Vec<_>>().join("");
        assert!(text.contains("No budgets yet"));
    }
}
