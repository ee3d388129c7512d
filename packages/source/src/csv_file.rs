//! Local CSV file fetcher.
//!
//! Parses on a blocking thread so an async caller (the HTTP server) is not
//! stalled while half a million rows are read.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::parsing::{CsvOptions, parse_csv};
use crate::progress::ProgressCallback;
use crate::{RawTable, SourceError};

/// Reads and parses a local CSV file.
///
/// Files ending in `.gz` are decompressed even when `options.gzip` is not
/// set.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be opened or parsed.
pub async fn fetch_csv_file(
    path: &Path,
    options: CsvOptions,
    progress: Arc<dyn ProgressCallback>,
) -> Result<RawTable, SourceError> {
    let path: PathBuf = path.to_path_buf();
    let options = CsvOptions {
        gzip: options.gzip || path.extension().is_some_and(|ext| ext == "gz"),
        ..options
    };

    log::info!("Reading CSV file {}", path.display());
    progress.set_message(format!("Reading {}", path.display()));

    let table = tokio::task::spawn_blocking(move || {
        let file = File::open(&path)?;
        let table = parse_csv(BufReader::new(file), &options, progress.as_ref())?;
        progress.finish(format!("Read {} rows from {}", table.len(), path.display()));
        Ok::<_, SourceError>(table)
    })
    .await??;

    log::info!("Parsed {} rows", table.len());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;
    use crate::progress::null_progress;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("accident_dash_{}_{name}", std::process::id()))
    }

    #[tokio::test]
    async fn reads_plain_file() {
        let path = temp_path("plain.csv");
        std::fs::write(&path, "State,Severity\nCA,2\nTX,3\n").unwrap();

        let table = fetch_csv_file(&path, CsvOptions::default(), null_progress())
            .await
            .unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(table.headers, vec!["State", "Severity"]);
        assert_eq!(table.len(), 2);
    }

    #[tokio::test]
    async fn detects_gzip_by_extension() {
        let path = temp_path("packed.csv.gz");
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b"State,Severity\nCA,2\n").unwrap();
        std::fs::write(&path, encoder.finish().unwrap()).unwrap();

        let table = fetch_csv_file(&path, CsvOptions::default(), null_progress())
            .await
            .unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(table.len(), 1);
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let result = fetch_csv_file(
            &temp_path("does_not_exist.csv"),
            CsvOptions::default(),
            null_progress(),
        )
        .await;
        assert!(matches!(result, Err(SourceError::Io(_))));
    }
}
