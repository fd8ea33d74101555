//! Share-link file download.
//!
//! Training decks live behind cloud-drive share links. The export endpoint
//! serves small files directly; for large files it answers with an
//! interstitial HTML page carrying a confirmation token, which we replay as
//! a query parameter. Any payload that still looks like markup is rejected
//! rather than saved as a deck.

use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use regex::Regex;
use tracing::{info, warn};

use crate::deck::looks_like_markup;

const EXPORT_URL: &str = "https://drive.google.com/uc?export=download";

const MAX_RETRIES: u32 = 2;
const BASE_BACKOFF_MS: u64 = 1500;

static PATH_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/d/([A-Za-z0-9_-]+)").unwrap());
static QUERY_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]id=([A-Za-z0-9_-]+)").unwrap());
static CONFIRM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"confirm=([0-9A-Za-z_-]+)").unwrap());

/// Pull the file id out of a share link. Supports both
/// `.../file/d/<id>/view` and `...?id=<id>` forms.
pub fn extract_file_id(url: &str) -> Result<&str> {
    PATH_ID_RE
        .captures(url)
        .or_else(|| QUERY_ID_RE.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .with_context(|| format!("could not extract a file id from {url}"))
}

/// Download with bounded retries on transient HTTP failures (rate limits and
/// server errors). Permission and markup failures are deterministic and
/// return immediately.
pub async fn download_with_retry(
    client: &reqwest::Client,
    share_url: &str,
    dest: &Path,
) -> Result<u64> {
    for attempt in 0..MAX_RETRIES {
        match download_share_file(client, share_url, dest).await {
            Ok(size) => return Ok(size),
            Err(e) if is_transient(&e) => {
                let backoff = Duration::from_millis(BASE_BACKOFF_MS * 2u64.pow(attempt));
                warn!(
                    "download failed ({}), retrying in {:.1}s",
                    e,
                    backoff.as_secs_f64()
                );
                tokio::time::sleep(backoff).await;
            }
            Err(e) => return Err(e),
        }
    }
    download_share_file(client, share_url, dest).await
}

fn is_transient(err: &anyhow::Error) -> bool {
    let msg = format!("{err:#}");
    ["429", "500", "502", "503"]
        .iter()
        .any(|code| msg.contains(code))
}

/// Download the file behind a share link to `dest`, following the large-file
/// confirmation handshake once. Returns the payload size in bytes.
pub async fn download_share_file(
    client: &reqwest::Client,
    share_url: &str,
    dest: &Path,
) -> Result<u64> {
    let file_id = extract_file_id(share_url)?;
    let url = format!("{EXPORT_URL}&id={file_id}");

    let mut bytes = fetch(client, &url).await?;
    if looks_like_markup(&bytes) {
        let body = String::from_utf8_lossy(&bytes);
        let Some(token) = confirm_token(&body) else {
            bail!("download returned an HTML page instead of a deck (check share permissions)");
        };
        let url = format!("{EXPORT_URL}&id={file_id}&confirm={token}");
        bytes = fetch(client, &url).await?;
        if looks_like_markup(&bytes) {
            bail!("download still returned HTML after the confirmation handshake");
        }
    }

    std::fs::write(dest, &bytes)
        .with_context(|| format!("failed to write download to {}", dest.display()))?;
    info!("downloaded {} bytes to {}", bytes.len(), dest.display());
    Ok(bytes.len() as u64)
}

async fn fetch(client: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    let bytes = client
        .get(url)
        .send()
        .await?
        .error_for_status()
        .with_context(|| format!("download request failed for {url}"))?
        .bytes()
        .await?;
    Ok(bytes.to_vec())
}

/// Confirmation token embedded in the large-file interstitial page.
fn confirm_token(body: &str) -> Option<&str> {
    CONFIRM_RE
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_id_from_path_form() {
        let url = "https://drive.google.com/file/d/1AbC_d-9xYz/view?usp=sharing";
        assert_eq!(extract_file_id(url).unwrap(), "1AbC_d-9xYz");
    }

    #[test]
    fn file_id_from_query_form() {
        let url = "https://drive.google.com/open?id=1AbC_d-9xYz";
        assert_eq!(extract_file_id(url).unwrap(), "1AbC_d-9xYz");
        let url = "https://drive.google.com/uc?export=download&id=XYZ123";
        assert_eq!(extract_file_id(url).unwrap(), "XYZ123");
    }

    #[test]
    fn unrecognized_link_is_an_error() {
        assert!(extract_file_id("https://example.com/decks/rto.json").is_err());
    }

    #[test]
    fn transient_errors_are_retryable() {
        assert!(is_transient(&anyhow::anyhow!(
            "HTTP status server error (503 Service Unavailable) for url"
        )));
        assert!(is_transient(&anyhow::anyhow!("429 Too Many Requests")));
        assert!(!is_transient(&anyhow::anyhow!(
            "download returned an HTML page instead of a deck"
        )));
    }

    #[test]
    fn confirm_token_from_interstitial() {
        let body = r#"<html><body><a href="/uc?export=download&confirm=t0k-3N&id=X">Download anyway</a></body></html>"#;
        assert_eq!(confirm_token(body), Some("t0k-3N"));
        assert_eq!(confirm_token("<html>no token here</html>"), None);
    }
}
