//! Shared CSV parsing for all fetchers.
//!
//! Turns any byte stream into a [`RawTable`], optionally decompressing
//! gzip first and stopping at a row cap.

use std::io::Read;

use crate::progress::ProgressCallback;
use crate::{RawTable, SourceError};

/// Rows parsed between progress updates.
const PROGRESS_CHUNK: u64 = 10_000;

/// Parse settings shared by the file and download fetchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    /// Field delimiter byte (defaults to `,`).
    pub delimiter: u8,
    /// Whether the input is gzip-compressed.
    pub gzip: bool,
    /// Optional cap on the number of data rows.
    pub max_records: Option<u64>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            gzip: false,
            max_records: None,
        }
    }
}

impl CsvOptions {
    /// Builds options from the string forms used in source definitions.
    #[must_use]
    pub fn from_config(
        delimiter: Option<&str>,
        compressed: Option<&str>,
        max_records: Option<u64>,
    ) -> Self {
        let delimiter = delimiter
            .and_then(|d| d.as_bytes().first().copied())
            .unwrap_or(b',');
        Self {
            delimiter,
            gzip: compressed == Some("gzip"),
            max_records,
        }
    }
}

/// Parses CSV from `reader` into a [`RawTable`].
///
/// The first row is the header. Header names and cells are trimmed.
///
/// # Errors
///
/// Returns [`SourceError`] if decompression or CSV parsing fails, or if the
/// input has no header row.
pub fn parse_csv<R: Read>(
    reader: R,
    options: &CsvOptions,
    progress: &dyn ProgressCallback,
) -> Result<RawTable, SourceError> {
    if options.gzip {
        read_table(flate2::read::GzDecoder::new(reader), options, progress)
    } else {
        read_table(reader, options, progress)
    }
}

fn read_table<R: Read>(
    reader: R,
    options: &CsvOptions,
    progress: &dyn ProgressCallback,
) -> Result<RawTable, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_owned())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(SourceError::InvalidData {
            message: "CSV input contains no header row".to_owned(),
        });
    }

    if let Some(max) = options.max_records {
        progress.set_total(max);
    }

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut since_update = 0u64;

    for result in reader.records() {
        if let Some(max) = options.max_records
            && rows.len() as u64 >= max
        {
            log::info!("Reached row limit ({max}), stopping CSV parse");
            break;
        }

        let record = result?;
        rows.push(record.iter().map(|v| v.trim().to_owned()).collect());

        since_update += 1;
        if since_update == PROGRESS_CHUNK {
            progress.inc(since_update);
            since_update = 0;
        }
    }
    progress.inc(since_update);

    log::debug!("Parsed {} rows across {} columns", rows.len(), headers.len());

    Ok(RawTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;
    use crate::progress::NullProgress;

    const SAMPLE: &str = "State,Severity,Start_Time\n\
                          CA,2,2021-04-01 10:00:00\n\
                          TX , 3 ,2021-05-01 11:00:00\n\
                          NY,1\n";

    #[test]
    fn parses_headers_and_trims_cells() {
        let table = parse_csv(SAMPLE.as_bytes(), &CsvOptions::default(), &NullProgress).unwrap();
        assert_eq!(table.headers, vec!["State", "Severity", "Start_Time"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows[1][0], "TX");
        assert_eq!(table.rows[1][1], "3");
        assert_eq!(table.rows[2].len(), 2);
    }

    #[test]
    fn stops_at_row_limit() {
        let options = CsvOptions {
            max_records: Some(2),
            ..CsvOptions::default()
        };
        let table = parse_csv(SAMPLE.as_bytes(), &options, &NullProgress).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn honors_delimiter() {
        let tsv = "State\tSeverity\nCA\t4\n";
        let options = CsvOptions::from_config(Some("\t"), None, None);
        let table = parse_csv(tsv.as_bytes(), &options, &NullProgress).unwrap();
        assert_eq!(table.rows, vec![vec!["CA".to_string(), "4".to_string()]]);
    }

    #[test]
    fn decompresses_gzip() {
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(SAMPLE.as_bytes()).unwrap();
        let bytes = encoder.finish().unwrap();

        let options = CsvOptions::from_config(None, Some("gzip"), None);
        let table = parse_csv(bytes.as_slice(), &options, &NullProgress).unwrap();
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn rejects_empty_input() {
        assert!(parse_csv("".as_bytes(), &CsvOptions::default(), &NullProgress).is_err());
    }
}
