//! Grouped summation of transactions and serialization of the result.

use std::{collections::BTreeMap, ops::RangeInclusive};

use maud::{Markup, html};
use rusqlite::{Connection, params};
use serde::Serialize;
use time::Date;

use crate::{
    Error,
    html::{TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE},
    money::Money,
    report::ReportType,
    user::UserID,
};

/// The label category reports group transactions without a category under.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// One (year, month, income flag) group of a monthly report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyGroup {
    /// The calendar year of the group.
    pub year: i32,
    /// The calendar month of the group, 1 to 12.
    pub month: u8,
    /// Whether the group sums income or expense transactions.
    pub is_income: bool,
    /// The sum of the group's transaction amounts.
    pub total: Money,
}

/// One (year, income flag) group of a yearly report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearlyGroup {
    /// The calendar year of the group.
    pub year: i32,
    /// Whether the group sums income or expense transactions.
    pub is_income: bool,
    /// The sum of the group's transaction amounts.
    pub total: Money,
}

/// One (category, income flag) group of a category report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryGroup {
    /// The category name, or [UNCATEGORIZED_LABEL].
    pub category: String,
    /// Whether the group sums income or expense transactions.
    pub is_income: bool,
    /// The sum of the group's transaction amounts.
    pub total: Money,
}

/// The grouped rows of a generated report, in their fixed output order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportData {
    /// Groups ordered by year then month ascending, expenses before income
    /// within a month.
    Monthly(Vec<MonthlyGroup>),
    /// Groups ordered by year ascending, expenses before income within a
    /// year.
    Yearly(Vec<YearlyGroup>),
    /// Groups ordered by category name, expenses before income within a
    /// category.
    Category(Vec<CategoryGroup>),
}

struct ReportSourceRow {
    date: Date,
    amount: Money,
    is_income: bool,
    category_name: Option<String>,
}

/// Generate a report over the user's transactions in an inclusive date range.
///
/// Grouping is deterministic: the same inputs over unmodified data produce
/// byte-identical serialized output. An empty date range produces an empty
/// group list, not an error.
///
/// # Errors
/// Returns an [Error::SqlError] if the transaction query fails.
pub fn generate_report(
    user_id: UserID,
    report_type: ReportType,
    date_range: RangeInclusive<Date>,
    connection: &Connection,
) -> Result<ReportData, Error> {
    let rows = get_source_rows(user_id, date_range, connection)?;

    let data = match report_type {
        ReportType::Monthly => {
            let mut groups: BTreeMap<(i32, u8, bool), Money> = BTreeMap::new();

            for row in rows {
                let key = (row.date.year(), row.date.month() as u8, row.is_income);
                *groups.entry(key).or_insert(Money::ZERO) += row.amount;
            }

            ReportData::Monthly(
                groups
                    .into_iter()
                    .map(|((year, month, is_income), total)| MonthlyGroup {
                        year,
                        month,
                        is_income,
                        total,
                    })
                    .collect(),
            )
        }
        ReportType::Yearly => {
            let mut groups: BTreeMap<(i32, bool), Money> = BTreeMap::new();

            for row in rows {
                let key = (row.date.year(), row.is_income);
                *groups.entry(key).or_insert(Money::ZERO) += row.amount;
            }

            ReportData::Yearly(
                groups
                    .into_iter()
                    .map(|((year, is_income), total)| YearlyGroup {
                        year,
                        is_income,
                        total,
                    })
                    .collect(),
            )
        }
        ReportType::Category => {
            let mut groups: BTreeMap<(String, bool), Money> = BTreeMap::new();

            for row in rows {
                let category = row
                    .category_name
                    .unwrap_or_else(|| UNCATEGORIZED_LABEL.to_owned());
                *groups.entry((category, row.is_income)).or_insert(Money::ZERO) += row.amount;
            }

            ReportData::Category(
                groups
                    .into_iter()
                    .map(|((category, is_income), total)| CategoryGroup {
                        category,
                        is_income,
                        total,
                    })
                    .collect(),
            )
        }
    };

    Ok(data)
}

fn get_source_rows(
    user_id: UserID,
    date_range: RangeInclusive<Date>,
    connection: &Connection,
) -> Result<Vec<ReportSourceRow>, Error> {
    connection
        .prepare(
            "SELECT date, amount, is_income, category.name
             FROM \"transaction\"
             LEFT JOIN category ON \"transaction\".category_id = category.id
             WHERE \"transaction\".user_id = ?1 AND date BETWEEN ?2 AND ?3",
        )?
        .query_map(
            params![user_id.as_i64(), date_range.start(), date_range.end()],
            |row| {
                Ok(ReportSourceRow {
                    date: row.get(0)?,
                    amount: row.get(1)?,
                    is_income: row.get(2)?,
                    category_name: row.get(3)?,
                })
            },
        )?
        .map(|maybe_row| maybe_row.map_err(|error| error.into()))
        .collect()
}

impl ReportData {
    /// Whether the report contains no groups.
    pub fn is_empty(&self) -> bool {
        match self {
            ReportData::Monthly(groups) => groups.is_empty(),
            ReportData::Yearly(groups) => groups.is_empty(),
            ReportData::Category(groups) => groups.is_empty(),
        }
    }

    /// Serialize the report as a JSON array of group records.
    ///
    /// # Errors
    /// Returns an [Error::JsonSerializationError] if serialization fails.
    pub fn to_json(&self) -> Result<String, Error> {
        let result = match self {
            ReportData::Monthly(groups) => serde_json::to_string(groups),
            ReportData::Yearly(groups) => serde_json::to_string(groups),
            ReportData::Category(groups) => serde_json::to_string(groups),
        };

        result.map_err(|error| Error::JsonSerializationError(error.to_string()))
    }

    /// Serialize the report as CSV with a header row.
    ///
    /// # Errors
    /// Returns an [Error::CsvSerializationError] if a row cannot be written.
    pub fn to_csv(&self) -> Result<String, Error> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        let write_result = match self {
            ReportData::Monthly(groups) => {
                writer
                    .write_record(["year", "month", "is_income", "total"])
                    .and_then(|_| {
                        groups.iter().try_for_each(|group| {
                            writer.write_record([
                                group.year.to_string(),
                                group.month.to_string(),
                                group.is_income.to_string(),
                                group.total.to_decimal_string(),
                            ])
                        })
                    })
            }
            ReportData::Yearly(groups) => writer
                .write_record(["year", "is_income", "total"])
                .and_then(|_| {
                    groups.iter().try_for_each(|group| {
                        writer.write_record([
                            group.year.to_string(),
                            group.is_income.to_string(),
                            group.total.to_decimal_string(),
                        ])
                    })
                }),
            ReportData::Category(groups) => writer
                .write_record(["category", "is_income", "total"])
                .and_then(|_| {
                    groups.iter().try_for_each(|group| {
                        writer.write_record([
                            group.category.clone(),
                            group.is_income.to_string(),
                            group.total.to_decimal_string(),
                        ])
                    })
                }),
        };

        write_result.map_err(|error| Error::CsvSerializationError(error.to_string()))?;

        let bytes = writer
            .into_inner()
            .map_err(|error| Error::CsvSerializationError(error.to_string()))?;

        String::from_utf8(bytes).map_err(|error| Error::CsvSerializationError(error.to_string()))
    }

    /// Render the report as an HTML table for the results page.
    pub fn to_html_table(&self) -> Markup {
        let kind_cell = |is_income: bool| if is_income { "Income" } else { "Expense" };

        html! {
            table class="w-full mt-4 text-sm text-left text-gray-500 dark:text-gray-400"
            {
                @match self {
                    ReportData::Monthly(groups) => {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Year" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Month" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Total" }
                            }
                        }
                        tbody
                        {
                            @for group in groups
                            {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td class=(TABLE_CELL_STYLE) { (group.year) }
                                    td class=(TABLE_CELL_STYLE) { (group.month) }
                                    td class=(TABLE_CELL_STYLE) { (kind_cell(group.is_income)) }
                                    td class=(TABLE_CELL_STYLE) { (group.total) }
                                }
                            }
                        }
                    }
                    ReportData::Yearly(groups) => {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Year" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Total" }
                            }
                        }
                        tbody
                        {
                            @for group in groups
                            {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td class=(TABLE_CELL_STYLE) { (group.year) }
                                    td class=(TABLE_CELL_STYLE) { (kind_cell(group.is_income)) }
                                    td class=(TABLE_CELL_STYLE) { (group.total) }
                                }
                            }
                        }
                    }
                    ReportData::Category(groups) => {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Total" }
                            }
                        }
                        tbody
                        {
                            @for group in groups
                            {
                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td class=(TABLE_CELL_STYLE) { (group.category) }
                                    td class=(TABLE_CELL_STYLE) { (kind_cell(group.is_income)) }
                                    td class=(TABLE_CELL_STYLE) { (group.total) }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}


#[cfg(test)]
mod serialization_tests {
    use crate::{
        money::Money,
        report::{MonthlyGroup, ReportData},
    };

    fn sample_data() -> ReportData {
        ReportData::Monthly(vec![
            MonthlyGroup {
                year: 2024,
                month: 1,
                is_income: false,
                total: Money::from_cents(15000),
            },
            MonthlyGroup {
                year: 2024,
                month: 2,
                is_income: true,
                total: Money::from_cents(20000),
            },
        ])
    }

    #[test]
    fn json_output_is_an_ordered_array_of_group_records() {
        let json = sample_data().to_json().unwrap();

        assert_eq!(
            json,
            r#"[{"year":2024,"month":1,"is_income":false,"total":"150.00"},{"year":2024,"month":2,"is_income":true,"total":"200.00"}]"#
        );
    }

    #[test]
    fn csv_output_has_header_and_delimited_rows() {
        let csv = sample_data().to_csv().unwrap();

        assert_eq!(
            csv,
            "year,month,is_income,total\n2024,1,false,150.00\n2024,2,true,200.00\n"
        );
    }

    #[test]
    fn html_table_contains_group_rows() {
        let html = sample_data().to_html_table().into_string();

        assert!(html.contains("$150.00"));
        assert!(html.contains("$200.00"));
        assert!(html.contains("Income"));
        assert!(html.contains("Expense"));
    }
}
