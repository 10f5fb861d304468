//! The report page and generation endpoint.

use std::str::FromStr;

use axum::{
    Extension, Form,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::{Date, Duration};

use crate::{
    Error,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_SELECT_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, render,
    },
    navigation::NavBar,
    report::{
        Report, ReportEndpointState, ReportFormData, ReportFormat, ReportParameters, ReportType,
        create_report, generate_report, get_reports,
    },
    timezone::{DATE_INPUT_FORMAT, get_local_offset, local_today, parse_form_date},
    user::UserID,
};

/// Display the report form and the user's report history.
pub async fn get_reports_page(
    State(state): State<ReportEndpointState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let local_offset = get_local_offset(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezone(state.local_timezone.clone()))?;
    let today = local_today(local_offset);

    let reports = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;
        get_reports(user_id, &connection)?
    };

    let nav_bar = NavBar::new(endpoints::REPORTS_VIEW).into_html();
    let content = html! {
        (nav_bar)
        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-4" { "Reports" }

            (report_form_view(today))

            @if !reports.is_empty() {
                h2 class="text-xl font-bold mt-8 mb-2" { "Previously generated" }
                (report_history_table(&reports))
            }
        }
    };

    Ok(base("Reports", &content).into_response())
}

/// Generate a report and return it in the requested output format.
pub async fn generate_report_endpoint(
    State(state): State<ReportEndpointState>,
    Extension(user_id): Extension<UserID>,
    Form(form_data): Form<ReportFormData>,
) -> Response {
    let report_type = match ReportType::from_str(&form_data.report_type) {
        Ok(report_type) => report_type,
        Err(error) => return error.into_alert_response(),
    };
    let format = match ReportFormat::from_str(&form_data.format) {
        Ok(format) => format,
        Err(error) => return error.into_alert_response(),
    };
    let (start_date, end_date) =
        match (parse_form_date(&form_data.start_date), parse_form_date(&form_data.end_date)) {
            (Ok(start_date), Ok(end_date)) => (start_date, end_date),
            (Err(error), _) | (_, Err(error)) => return error.into_alert_response(),
        };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let data = match generate_report(user_id, report_type, start_date..=end_date, &connection) {
        Ok(data) => data,
        Err(error) => return error.into_alert_response(),
    };

    let parameters = ReportParameters {
        start_date,
        end_date,
        format,
    };
    if let Err(error) = create_report(user_id, report_type, &parameters, &connection) {
        tracing::error!("could not record generated report: {error}");
        return error.into_alert_response();
    }

    match format {
        ReportFormat::Json => {
            let json = match data.to_json() {
                Ok(json) => json,
                Err(error) => return error.into_alert_response(),
            };

            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                json,
            )
                .into_response()
        }
        ReportFormat::Csv => {
            let csv = match data.to_csv() {
                Ok(csv) => csv,
                Err(error) => return error.into_alert_response(),
            };
            let file_name =
                format!("{report_type}_report_{start_date}_{end_date}.csv");

            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv".to_owned()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{file_name}\""),
                    ),
                ],
                csv,
            )
                .into_response()
        }
        ReportFormat::Html => {
            let result = html! {
                @if data.is_empty() {
                    p class="mt-4" { "No transactions in the selected date range." }
                } @else {
                    (data.to_html_table())
                }
            };

            render(StatusCode::OK, result)
        }
    }
}

fn report_form_view(today: Date) -> Markup {
    let default_start = today - Duration::days(30);
    let format_date = |date: Date| date.format(DATE_INPUT_FORMAT).unwrap_or_default();

    html! {
        form
            hx-post=(endpoints::GENERATE_REPORT)
            hx-target="#report-result"
            hx-target-error="#alert-container"
            class="w-full max-w-md space-y-4"
        {
            div
            {
                label for="report-type" class=(FORM_LABEL_STYLE) { "Report Type" }

                select id="report-type" name="report_type" class=(FORM_SELECT_STYLE)
                {
                    option value="monthly" { "Monthly Summary" }
                    option value="yearly" { "Yearly Summary" }
                    option value="category" { "Category Breakdown" }
                }
            }

            div
            {
                label for="start-date" class=(FORM_LABEL_STYLE) { "Start Date" }

                input
                    id="start-date"
                    type="date"
                    name="start_date"
                    value=(format_date(default_start))
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="end-date" class=(FORM_LABEL_STYLE) { "End Date" }

                input
                    id="end-date"
                    type="date"
                    name="end_date"
                    value=(format_date(today))
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="format" class=(FORM_LABEL_STYLE) { "Format" }

                select id="format" name="format" class=(FORM_SELECT_STYLE)
                {
                    option value="html" { "Display" }
                    option value="json" { "JSON" }
                    option value="csv" { "CSV download" }
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Generate Report" }
        }

        div id="report-result" class="w-full" {}
    }
}

fn report_history_table(reports: &[Report]) -> Markup {
    html! {
        table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Period" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Format" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Generated" }
                }
            }

            tbody
            {
                @for report in reports
                {
                    tr class=(TABLE_ROW_STYLE)
                    {
                        td class=(TABLE_CELL_STYLE) { (report.report_type) }
                        td class=(TABLE_CELL_STYLE)
                        {
                            (report.parameters.start_date) " to " (report.parameters.end_date)
                        }
                        td class=(TABLE_CELL_STYLE) { (report.parameters.format) }
                        td class=(TABLE_CELL_STYLE) { (report.created_at.date()) }
                    }
                }
            }
        }
    }
}
