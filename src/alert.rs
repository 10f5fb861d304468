//! Alert fragments for displaying success and error messages to users.
//!
//! Alerts are returned from htmx endpoints and rendered into the page's
//! `#alert-container` element via the response-targets extension.

use maud::{Markup, html};

/// Renders alert messages with appropriate styling.
pub struct AlertView;

impl AlertView {
    /// Create a new success alert.
    pub fn success(message: &str, details: &str) -> Markup {
        alert(
            "text-green-800 bg-green-50 dark:bg-gray-800 dark:text-green-400",
            message,
            details,
        )
    }

    /// Create a new error alert.
    pub fn error(message: &str, details: &str) -> Markup {
        alert(
            "text-red-800 bg-red-50 dark:bg-gray-800 dark:text-red-400",
            message,
            details,
        )
    }
}

fn alert(color_style: &str, message: &str, details: &str) -> Markup {
    html! {
        div
            class=(format!("p-4 mb-4 text-sm rounded-lg {color_style}"))
            role="alert"
        {
            span class="font-medium" { (message) }

            @if !details.is_empty() {
                " " (details)
            }
        }
    }
}

#[cfg(test)]
mod alert_tests {
    use scraper::{Html, Selector};

    use super::AlertView;

    #[test]
    fn error_alert_contains_message_and_details() {
        let markup = AlertView::error("Something went wrong", "Try again later.");
        let document = Html::parse_fragment(&markup.into_string());
        let alert = document
            .select(&Selector::parse("div[role=alert]").unwrap())
            .next()
            .expect("No alert found");

        let text = alert.text().collect::<Vec<_>>().join("");
        assert!(text.contains("Something went wrong"));
        assert!(text.contains("Try again later."));
    }

    #[test]
    fn success_alert_omits_empty_details() {
        let markup = AlertView::success("Saved", "");
        let document = Html::parse_fragment(&markup.into_string());
        let alert = document
            .select(&Selector::parse("div[role=alert]").unwrap())
            .next()
            .expect("No alert found");

        let text = alert.text().collect::<Vec<_>>().join("");
        assert_eq!(text.trim(), "Saved");
    }
}
