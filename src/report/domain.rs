//! Core report domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{Error, user::UserID};

/// Database identifier for a report.
pub type ReportId = i64;

/// The ways a user's transactions can be summarized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    /// Totals grouped by (year, month, income flag).
    Monthly,
    /// Totals grouped by (year, income flag).
    Yearly,
    /// Totals grouped by (category, income flag).
    Category,
}

impl ReportType {
    /// The wire value of the report type, as submitted by the report form.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Monthly => "monthly",
            ReportType::Yearly => "yearly",
            ReportType::Category => "category",
        }
    }
}

impl FromStr for ReportType {
    type Err = Error;

    /// Parse a report type from its wire value.
    ///
    /// An unrecognized string is the one rejection case report generation
    /// has; it maps to [Error::UnknownReportType].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(ReportType::Monthly),
            "yearly" => Ok(ReportType::Yearly),
            "category" => Ok(ReportType::Category),
            unknown => Err(Error::UnknownReportType(unknown.to_owned())),
        }
    }
}

impl Display for ReportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The output serializations a report can be requested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// A structured JSON array of group records.
    Json,
    /// Delimited rows with a header, offered as a download.
    Csv,
    /// A display-oriented HTML table.
    Html,
}

impl ReportFormat {
    /// The wire value of the format, as submitted by the report form.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
            ReportFormat::Html => "html",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(ReportFormat::Json),
            "csv" => Ok(ReportFormat::Csv),
            "html" => Ok(ReportFormat::Html),
            unknown => Err(Error::UnknownReportFormat(unknown.to_owned())),
        }
    }
}

impl Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The parameters a report was generated with, stored alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportParameters {
    /// The first day the report covers.
    pub start_date: Date,
    /// The last day the report covers, inclusive.
    pub end_date: Date,
    /// The output format that was requested.
    pub format: ReportFormat,
}

/// A record of a generated report.
///
/// Only the request is stored; the content is recomputed from live
/// transaction data whenever it is needed.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// The ID of the report.
    pub id: ReportId,
    /// The user the report belongs to.
    pub user_id: UserID,
    /// How the transactions were grouped.
    pub report_type: ReportType,
    /// The date range and format the report was generated with.
    pub parameters: ReportParameters,
    /// When the report was generated.
    pub created_at: OffsetDateTime,
}

/// The raw form fields submitted when generating a report.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReportFormData {
    /// The report type wire value.
    pub report_type: String,
    /// The first day the report covers.
    pub start_date: String,
    /// The last day the report covers.
    pub end_date: String,
    /// The output format wire value.
    pub format: String,
}
