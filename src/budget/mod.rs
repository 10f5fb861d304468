//! Budget management: per-category spending caps over a date range, with
//! progress always derived from live transaction data.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod evaluate;
mod list;

pub use create::{create_budget_endpoint, get_new_budget_page};
pub use db::{
    BudgetRow, count_budgets, create_budget, create_budget_table, delete_budget, get_budget,
    get_budget_rows, update_budget,
};
pub use delete::delete_budget_endpoint;
pub use domain::{Budget, BudgetFormData, BudgetId, BudgetUpdate, NewBudget};
pub use edit::{get_edit_budget_page, update_budget_endpoint};
pub use evaluate::{BudgetProgress, evaluate_budget};
pub use list::get_budgets_page;

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{AppState, pagination::PaginationConfig};

/// The state needed by the budget pages and endpoints.
#[derive(Debug, Clone)]
pub struct BudgetEndpointState {
    /// The shared database connection.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for BudgetEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}
