//! The page listing all of a user's categories.

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error,
    category::{Category, CategoryEndpointState, get_categories},
    endpoints,
    html::{
        BUTTON_DELETE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
    },
    navigation::NavBar,
    user::UserID,
};

/// Display the user's categories with links to create, edit and delete them.
pub async fn get_categories_page(
    State(state): State<CategoryEndpointState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories(user_id, &connection)?;

    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();
    let content = html! {
        (nav_bar)
        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-4" { "Categories" }

            a href=(endpoints::NEW_CATEGORY_VIEW) class=(LINK_STYLE) { "Create category" }

            @if categories.is_empty() {
                p class="mt-4" { "No categories yet. Create one to start organizing transactions." }
            } @else {
                (categories_table(&categories))
            }
        }
    };

    Ok(base("Categories", &content).into_response())
}

fn categories_table(categories: &[Category]) -> Markup {
    html! {
        table class="w-full mt-4 text-sm text-left text-gray-500 dark:text-gray-400"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                }
            }

            tbody
            {
                @for category in categories
                {
                    tr class=(TABLE_ROW_STYLE)
                    {
                        td class=(TABLE_CELL_STYLE) { (category.name) }
                        td class=(TABLE_CELL_STYLE)
                        {
                            @if category.is_income { "Income" } @else { "Expense" }
                        }
                        td class=(TABLE_CELL_STYLE)
                        {
                            a
                                href=(endpoints::format_endpoint(endpoints::EDIT_CATEGORY_VIEW, category.id))
                                class=(LINK_STYLE)
                            {
                                "Edit"
                            }

                            " "

                            button
                                hx-delete=(endpoints::format_endpoint(endpoints::DELETE_CATEGORY, category.id))
                                hx-confirm=(format!("Delete the category \"{}\"? Its transactions will become uncategorized.", category.name))
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
