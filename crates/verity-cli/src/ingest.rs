//! Turning caller input into subject text: raw text, files, stdin, or a
//! fetched web page.

use anyhow::{Context, Result};
use regex::Regex;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::info;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Text and title recovered from an HTML page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: Option<String>,
    pub text: String,
}

static TITLE_RE: OnceLock<Option<Regex>> = OnceLock::new();
static TAG_RE: OnceLock<Option<Regex>> = OnceLock::new();
static WHITESPACE_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn compiled(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

fn collapse_whitespace(s: &str) -> String {
    match compiled(&WHITESPACE_RE, r"\s+") {
        Some(re) => re.replace_all(s, " ").trim().to_string(),
        None => s.split_whitespace().collect::<Vec<_>>().join(" "),
    }
}

/// Strip tags, collapse whitespace, and take `<title>` as the title.
pub fn extract_page(html: &str) -> Page {
    let title = compiled(&TITLE_RE, r"(?is)<title[^>]*>(.*?)</title>")
        .and_then(|re| re.captures(html))
        .and_then(|c| c.get(1))
        .map(|m| collapse_whitespace(m.as_str()))
        .filter(|t| !t.is_empty());

    let stripped = match compiled(&TAG_RE, r"<[^>]+>") {
        Some(re) => re.replace_all(html, " ").into_owned(),
        None => html.to_string(),
    };

    Page {
        title,
        text: collapse_whitespace(&stripped),
    }
}

/// Fetch `url` and extract its text.
pub async fn fetch_page(url: &str) -> Result<Page> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("verity/", env!("CARGO_PKG_VERSION")))
        .timeout(FETCH_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to fetch {}", url))?
        .error_for_status()
        .with_context(|| format!("Server refused {}", url))?;

    let html = response
        .text()
        .await
        .with_context(|| format!("Failed to read body of {}", url))?;

    let page = extract_page(&html);
    info!(url = %url, html_bytes = html.len(), text_chars = page.text.chars().count(), "fetched page");
    Ok(page)
}

/// Body text from `--text`, `--file`, or stdin, in that order.
pub fn read_body(text: Option<String>, file: Option<&Path>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()));
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read subject text from stdin")?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_text_and_title() {
        let html = r#"<html><head><TITLE>
            Mayor  resigns </TITLE><style>p{}</style></head>
            <body><h1>Breaking</h1><p>The mayor   resigned
            on <b>Friday</b>.</p></body></html>"#;
        let page = extract_page(html);
        assert_eq!(page.title.as_deref(), Some("Mayor resigns"));
        assert!(page.text.starts_with("Mayor resigns p{} Breaking"));
        assert!(page.text.ends_with("The mayor resigned on Friday ."));
        assert!(!page.text.contains('<'));
    }

    #[test]
    fn page_without_title() {
        let page = extract_page("<p>just a paragraph</p>");
        assert_eq!(page.title, None);
        assert_eq!(page.text, "just a paragraph");
    }

    #[test]
    fn empty_title_is_none() {
        assert_eq!(extract_page("<title>  </title>body").title, None);
    }

    #[test]
    fn inline_text_wins_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("story.txt");
        std::fs::write(&path, "from file").unwrap();

        assert_eq!(
            read_body(Some("inline".to_string()), Some(&path)).unwrap(),
            "inline"
        );
        assert_eq!(read_body(None, Some(&path)).unwrap(), "from file");
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = read_body(None, Some(Path::new("/nonexistent/story.txt"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
