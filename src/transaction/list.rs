//! The paginated page listing a user's transactions.

use axum::{
    Extension,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    Error, endpoints,
    html::{
        BUTTON_DELETE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
    },
    navigation::NavBar,
    pagination::{Pager, PaginationIndicator},
    transaction::{
        TransactionEndpointState, TransactionRow, count_transactions, get_transaction_rows,
    },
    user::UserID,
};

/// The query parameters accepted by the transactions page.
#[derive(Debug, Deserialize)]
pub struct TransactionsPageQuery {
    /// The 1-based page number to display.
    page: Option<u64>,
}

/// Display one page of the user's transactions, most recent first.
pub async fn get_transactions_page(
    State(state): State<TransactionEndpointState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<TransactionsPageQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let row_count = count_transactions(user_id, &connection)?;
    let pager = Pager::new(
        row_count,
        query.page.unwrap_or(state.pagination_config.default_page),
        state.pagination_config.page_size,
    );
    let rows = get_transaction_rows(user_id, pager.page_size, pager.offset(), &connection)?;

    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let content = html! {
        (nav_bar)
        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-4" { "Transactions" }

            a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE) { "Add transaction" }

            @if rows.is_empty() {
                p class="mt-4" { "No transactions yet. Add one to get started." }
            } @else {
                (transactions_table(&rows))
                (pagination_view(&pager, state.pagination_config.max_indicator_pages))
            }
        }
    };

    Ok(base("Transactions", &content).into_response())
}

fn transactions_table(rows: &[TransactionRow]) -> Markup {
    html! {
        table class="w-full mt-4 text-sm text-left text-gray-500 dark:text-gray-400"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                }
            }

            tbody
            {
                @for row in rows
                {
                    tr class=(TABLE_ROW_STYLE)
                    {
                        td class=(TABLE_CELL_STYLE) { (row.date) }
                        td class=(TABLE_CELL_STYLE) { (row.description) }
                        td class=(TABLE_CELL_STYLE)
                        {
                            @match &row.category_name {
                                Some(name) => { (name) }
                                None => { span class="italic" { "Uncategorized" } }
                            }
                        }
                        td class=(TABLE_CELL_STYLE)
                        {
                            @if row.is_income {
                                span class="text-green-600 dark:text-green-400" { "+" (row.amount) }
                            } @else {
                                span class="text-red-600 dark:text-red-400" { "-" (row.amount) }
                            }
                        }
                        td class=(TABLE_CELL_STYLE)
                        {
                            a
                                href=(endpoints::format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, row.id))
                                class=(LINK_STYLE)
                            {
                                "Edit"
                            }

                            " "

                            button
                                hx-delete=(endpoints::format_endpoint(endpoints::DELETE_TRANSACTION, row.id))
                                hx-confirm="Delete this transaction?"
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

fn pagination_view(pager: &Pager, max_indicator_pages: u64) -> Markup {
    let page_url = |page: u64| format!("{}?page={}", endpoints::TRANSACTIONS_VIEW, page);

    html! {
        nav class="flex gap-2 mt-4" aria-label="Transaction pages"
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
