//! CSV download fetcher.
//!
//! Downloads a CSV (optionally gzip-compressed) over HTTP and parses it
//! into a [`RawTable`].

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::parsing::{CsvOptions, parse_csv};
use crate::progress::ProgressCallback;
use crate::{RawTable, SourceError};

/// Configuration for the CSV download fetcher.
pub struct CsvDownloadConfig<'a> {
    /// URL of the CSV file to download.
    pub url: &'a str,
    /// Human-readable label for log messages.
    pub label: &'a str,
    /// Additional HTTP headers.
    pub headers: &'a BTreeMap<String, String>,
    /// Parse settings.
    pub csv: CsvOptions,
}

/// Builds a [`reqwest::Client`] with the configured headers.
fn build_client(headers: &BTreeMap<String, String>) -> Result<reqwest::Client, SourceError> {
    let mut header_map = reqwest::header::HeaderMap::new();
    for (key, value) in headers {
        let name = reqwest::header::HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
            SourceError::InvalidData {
                message: format!("invalid header name '{key}': {e}"),
            }
        })?;
        let val = reqwest::header::HeaderValue::from_str(value).map_err(|e| {
            SourceError::InvalidData {
                message: format!("invalid header value for '{key}': {e}"),
            }
        })?;
        header_map.insert(name, val);
    }
    Ok(reqwest::Client::builder()
        .default_headers(header_map)
        .build()?)
}

/// Downloads and parses a CSV file.
///
/// # Errors
///
/// Returns [`SourceError`] if the request fails, the server returns an
/// error status, or the body cannot be parsed.
pub async fn fetch_csv_download(
    config: &CsvDownloadConfig<'_>,
    progress: Arc<dyn ProgressCallback>,
) -> Result<RawTable, SourceError> {
    log::info!("[{}] Downloading CSV: {}", config.label, config.url);
    progress.set_message(format!("[{}] downloading", config.label));

    let client = build_client(config.headers)?;
    let response = client.get(config.url).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;

    log::debug!(
        "[{}] Downloaded {} bytes from {}",
        config.label,
        bytes.len(),
        config.url
    );

    let options = config.csv;
    let label = config.label.to_owned();
    let table = tokio::task::spawn_blocking(move || {
        let table = parse_csv(&bytes[..], &options, progress.as_ref())?;
        progress.finish(format!("[{label}] download complete -- {} rows", table.len()));
        Ok::<_, SourceError>(table)
    })
    .await??;

    log::info!(
        "[{}] CSV download complete: {} rows",
        config.label,
        table.len()
    );

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_header_name() {
        let mut headers = BTreeMap::new();
        headers.insert("bad header".to_string(), "x".to_string());
        assert!(matches!(
            build_client(&headers),
            Err(SourceError::InvalidData { .. })
        ));
    }

    #[test]
    fn accepts_authorization_header() {
        let mut headers = BTreeMap::new();
        headers.insert("Authorization".to_string(), "Bearer token".to_string());
        assert!(build_client(&headers).is_ok());
    }
}
