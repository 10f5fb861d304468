//! Helpers for resolving the server's configured timezone and parsing dates.

use time::{
    Date, OffsetDateTime, UtcOffset, format_description::BorrowedFormatItem,
    macros::format_description,
};
use time_tz::{Offset, TimeZone};

use crate::Error;

/// The date format used by HTML date inputs, e.g. "2024-01-05".
pub(crate) const DATE_INPUT_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day]");

/// Resolve a canonical timezone name, e.g. "Pacific/Auckland", to its current
/// UTC offset.
pub(crate) fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// Today's date in the given timezone.
pub(crate) fn local_today(local_offset: UtcOffset) -> Date {
    OffsetDateTime::now_utc().to_offset(local_offset).date()
}

/// Parse a date submitted by an HTML date input.
///
/// # Errors
/// Returns an [Error::InvalidDateFormat] containing the original input if it
/// is not a valid "[year]-[month]-[day]" date.
pub(crate) fn parse_form_date(text: &str) -> Result<Date, Error> {
    Date::parse(text, DATE_INPUT_FORMAT)
        .map_err(|error| Error::InvalidDateFormat(error.to_string(), text.to_owned()))
}
