//! Document retrieval: HTTP(S) through a shared blocking client, or local
//! files given as plain paths or `file://` URLs.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::blocking::Client;
use tracing::debug;

pub const DEFAULT_USER_AGENT: &str = concat!("legiscrape/", env!("CARGO_PKG_VERSION"));

const DETAIL_PAGE: &str = "/DetaliiDocument/";
const PRINTABLE_PAGE: &str = "/DetaliiDocumentAfis/";

#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// URL as requested; this is the act's source identity.
    pub source_url: String,
    /// URL actually read, after the printable rewrite.
    pub fetched_url: String,
    pub body: String,
}

pub struct DocumentFetcher {
    client: Client,
    printable: bool,
}

impl DocumentFetcher {
    pub fn new(user_agent: &str, timeout_secs: u64, printable: bool) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build http client")?;

        Ok(Self { client, printable })
    }

    pub fn fetch(&self, source_url: &str) -> Result<FetchedDocument> {
        let source_url = source_url.trim();
        if let Some(path) = local_path(source_url) {
            let body = read_local_document(Path::new(path))?;
            return Ok(FetchedDocument {
                source_url: source_url.to_string(),
                fetched_url: source_url.to_string(),
                body,
            });
        }

        let fetched_url = if self.printable {
            printable_url(source_url)
        } else {
            source_url.to_string()
        };

        let response = self
            .client
            .get(&fetched_url)
            .send()
            .with_context(|| format!("failed to fetch {fetched_url}"))?;

        let status = response.status();
        if !status.is_success() {
            bail!("http status {status} for {fetched_url}");
        }

        let bytes = response
            .bytes()
            .with_context(|| format!("failed to read body for {fetched_url}"))?;
        let body = String::from_utf8_lossy(&bytes).to_string();

        debug!(url = %fetched_url, bytes = bytes.len(), "fetched document");

        Ok(FetchedDocument {
            source_url: source_url.to_string(),
            fetched_url,
            body,
        })
    }
}

/// Rewrites a portal detail page to its printable rendering, which carries
/// the same CSS markers without navigation chrome.
pub fn printable_url(url: &str) -> String {
    if url.contains(PRINTABLE_PAGE) {
        return url.to_string();
    }
    url.replacen(DETAIL_PAGE, PRINTABLE_PAGE, 1)
}

fn local_path(source: &str) -> Option<&str> {
    if let Some(path) = source.strip_prefix("file://") {
        return Some(path);
    }
    let lower = source.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return None;
    }
    Some(source)
}

pub fn read_local_document(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_rewrite_targets_detail_pages_only() {
        assert_eq!(
            printable_url("https://legislatie.just.ro/Public/DetaliiDocument/281585"),
            "https://legislatie.just.ro/Public/DetaliiDocumentAfis/281585"
        );
        assert_eq!(
            printable_url("https://legislatie.just.ro/Public/DetaliiDocumentAfis/281585"),
            "https://legislatie.just.ro/Public/DetaliiDocumentAfis/281585"
        );
        assert_eq!(
            printable_url("https://example.org/act/1"),
            "https://example.org/act/1"
        );
    }

    #[test]
    fn local_sources_bypass_http() {
        assert_eq!(local_path("file:///tmp/lege.html"), Some("/tmp/lege.html"));
        assert_eq!(local_path("fixtures/lege.html"), Some("fixtures/lege.html"));
        assert_eq!(local_path("https://legislatie.just.ro/Public/DetaliiDocument/1"), None);
        assert_eq!(local_path("HTTP://legislatie.just.ro/"), None);
    }

    #[test]
    fn fetch_reads_local_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("lege.html");
        fs::write(&path, "<div class=\"S_DEN\">LEGE nr. 1 din 01/01/2024</div>").expect("write");

        let fetcher = DocumentFetcher::new(DEFAULT_USER_AGENT, 5, true).expect("fetcher");
        let url = format!("file://{}", path.display());
        let document = fetcher.fetch(&url).expect("fetch");

        assert_eq!(document.source_url, url);
        assert_eq!(document.fetched_url, url);
        assert!(document.body.contains("S_DEN"));
    }
}
