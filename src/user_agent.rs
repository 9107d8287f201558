//! Shared User-Agent string for phone and call-manager HTTP requests.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/vikdir";

/// Default User-Agent for directory fetches (identifies the tool).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("vikdir/{version} (+{PROJECT_UA_URL})")
}
