//! Report generation: date-ranged summaries of a user's transactions grouped
//! by time period or category, serialized as JSON, CSV or an HTML table.

mod db;
mod domain;
mod generate;
mod page;

pub use db::{create_report, create_report_table, get_reports};
pub use domain::{Report, ReportFormat, ReportFormData, ReportId, ReportParameters, ReportType};
pub use generate::{
    CategoryGroup, MonthlyGroup, ReportData, UNCATEGORIZED_LABEL, YearlyGroup, generate_report,
};
pub use page::{generate_report_endpoint, get_reports_page};

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

/// The state needed by the report page and endpoint.
#[derive(Debug, Clone)]
pub struct ReportEndpointState {
    /// The shared database connection.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ReportEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}
