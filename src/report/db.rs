//! Database operations for the report history.

use std::str::FromStr;

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    report::{Report, ReportParameters, ReportType},
    user::UserID,
};

/// Initialize the report table.
pub fn create_report_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS report (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            report_type TEXT NOT NULL,
            parameters TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_report_user ON report(user_id);",
    )?;

    Ok(())
}

/// Record a generated report and return it with its generated ID.
///
/// # Errors
/// Returns an [Error::JsonSerializationError] if the parameters cannot be
/// serialized, or an [Error::SqlError] for other SQL errors.
pub fn create_report(
    user_id: UserID,
    report_type: ReportType,
    parameters: &ReportParameters,
    connection: &Connection,
) -> Result<Report, Error> {
    let parameters_json = serde_json::to_string(parameters)
        .map_err(|error| Error::JsonSerializationError(error.to_string()))?;
    let now = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO report (user_id, report_type, parameters, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        (user_id.as_i64(), report_type.as_str(), &parameters_json, now),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Report {
        id,
        user_id,
        report_type,
        parameters: parameters.clone(),
        created_at: now,
    })
}

/// Retrieve a user's report history, most recent first.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub fn get_reports(user_id: UserID, connection: &Connection) -> Result<Vec<Report>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, report_type, parameters, created_at
             FROM report WHERE user_id = :user_id
             ORDER BY created_at DESC, id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_report_row)?
        .map(|maybe_report| maybe_report.map_err(|error| error.into()))
        .collect()
}

fn map_report_row(row: &Row) -> Result<Report, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = UserID::new(row.get(1)?);
    let raw_report_type: String = row.get(2)?;
    let raw_parameters: String = row.get(3)?;
    let created_at = row.get(4)?;

    // Rows are only written by `create_report`, so failing to parse them back
    // means the database was modified out from under the app.
    let report_type = ReportType::from_str(&raw_report_type).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown report type {raw_report_type:?}").into(),
        )
    })?;
    let parameters: ReportParameters = serde_json::from_str(&raw_parameters).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            error.to_string().into(),
        )
    })?;

    Ok(Report {
        id,
        user_id,
        report_type,
        parameters,
        created_at,
    })
}
