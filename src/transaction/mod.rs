//! Transaction management: recording, listing and summing income and
//! expenses.

mod aggregation;
mod core;
mod create;
mod delete;
mod edit;
mod form;
mod list;
mod query;

pub use aggregation::{CategoryFilter, TransactionKind, sum_transactions};
pub use core::{
    NewTransaction, Transaction, TransactionId, TransactionUpdate, count_transactions,
    create_transaction, create_transaction_table, delete_transaction, get_transaction,
    get_transactions, update_transaction,
};
pub use create::{create_transaction_endpoint, get_new_transaction_page};
pub use delete::delete_transaction_endpoint;
pub use edit::{get_edit_transaction_page, update_transaction_endpoint};
pub use list::get_transactions_page;
pub(crate) use query::{TransactionRow, get_recent_transaction_rows, get_transaction_rows};

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{AppState, pagination::PaginationConfig};

/// The state needed by the transaction pages and endpoints.
#[derive(Debug, Clone)]
pub struct TransactionEndpointState {
    /// The shared database connection.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}
