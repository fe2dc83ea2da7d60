//! Opening URLs in the user's browser.

use std::process::Command;

use tracing::debug;

use super::CollaboratorError;

/// Placeholder replaced by the encoded query in a search URL template.
const QUERY_PLACEHOLDER: &str = "{query}";

pub trait Browser: Send + Sync {
    fn open_url(&self, url: &str) -> Result<(), CollaboratorError>;
}

/// Hands URLs to the platform opener (`xdg-open`, `open`, `start`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBrowser;

impl Browser for SystemBrowser {
    fn open_url(&self, url: &str) -> Result<(), CollaboratorError> {
        debug!("opening {url}");
        let mut cmd = opener_command(url);
        cmd.spawn()
            .map(drop)
            .map_err(|e| CollaboratorError::Launch(format!("browser: {e}")))
    }
}

#[cfg(target_os = "macos")]
fn opener_command(url: &str) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(url);
    cmd
}

#[cfg(target_os = "windows")]
fn opener_command(url: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", "", url]);
    cmd
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn opener_command(url: &str) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(url);
    cmd
}

/// Substitute the URL-encoded `query` into `template`.
///
/// A template without a `{query}` placeholder gets the query appended.
pub fn search_url(template: &str, query: &str) -> String {
    let encoded = urlencoding::encode(query);
    if template.contains(QUERY_PLACEHOLDER) {
        template.replace(QUERY_PLACEHOLDER, &encoded)
    } else {
        format!("{template}{encoded}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_is_encoded_into_template() {
        assert_eq!(
            search_url("https://www.google.com/search?q={query}", "rust & tokio"),
            "https://www.google.com/search?q=rust%20%26%20tokio"
        );
    }

    #[test]
    fn template_without_placeholder_appends() {
        assert_eq!(
            search_url("https://duckduckgo.com/?q=", "crab"),
            "https://duckduckgo.com/?q=crab"
        );
    }

    #[test]
    fn empty_query_is_allowed() {
        assert_eq!(
            search_url("https://example.com/?q={query}", ""),
            "https://example.com/?q="
        );
    }
}
