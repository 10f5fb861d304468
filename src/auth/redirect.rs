//! Builds the log-in page URLs that send users back where they came from.

use axum::extract::Request;

use crate::endpoints;

/// Build a log-in page URL that redirects back to the page the user was on.
///
/// For htmx requests the current page comes from the `HX-Current-URL` header;
/// for regular requests the request URI itself is the target. Returns `None`
/// if a sensible target cannot be determined.
pub(crate) fn build_log_in_redirect_url(request: &Request) -> Option<String> {
    let target = match request.headers().get("HX-Current-URL") {
        Some(current_url) => current_url.to_str().ok()?.to_owned(),
        None => {
            let uri = request.uri();

            match uri.query() {
                Some(query) => format!("{}?{}", uri.path(), query),
                None => uri.path().to_owned(),
            }
        }
    };

    build_log_in_redirect_url_from_target(&target)
}

/// Build a log-in page URL that redirects to `target` after logging in.
pub(crate) fn build_log_in_redirect_url_from_target(target: &str) -> Option<String> {
    let query = serde_urlencoded::to_string([("redirect_url", target)]).ok()?;

    Some(format!("{}?{}", endpoints::LOG_IN_VIEW, query))
}

/// Whether a client-supplied redirect target is safe to follow.
///
/// Only local absolute paths are allowed; anything that could leave the site
/// (full URLs, protocol-relative "//host" paths) is rejected.
pub(crate) fn is_safe_redirect_target(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//")
}
