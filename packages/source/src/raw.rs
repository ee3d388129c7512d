//! Untyped tabular data as it comes out of a source.

/// Cell values treated as missing, matching the default NA tokens of the
/// pandas CSV reader the dataset is usually consumed with.
const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Returns `true` if a raw cell should be treated as a missing value.
#[must_use]
pub fn is_missing(value: &str) -> bool {
    MISSING_TOKENS.contains(&value.trim())
}

/// A header row plus data rows of trimmed strings.
///
/// Rows may be shorter than the header (flexible CSV); absent trailing
/// cells read as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    /// Column names from the header row.
    pub headers: Vec<String>,
    /// Data rows, one `String` per field.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Creates a table from headers and rows.
    #[must_use]
    pub const fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Number of data rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the named column, if present.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Returns the cell at `(row, col)`, or `None` if it is absent or holds
    /// a missing-value token.
    #[must_use]
    pub fn value(&self, row: usize, col: usize) -> Option<&str> {
        let cell = self.rows.get(row)?.get(col)?;
        if is_missing(cell) {
            None
        } else {
            Some(cell.trim())
        }
    }
}
