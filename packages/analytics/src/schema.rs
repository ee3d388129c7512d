//! Required-column check for raw tables.

use accident_dash_accident_models::RequiredField;
use accident_dash_analytics_models::{SchemaReport, SchemaStatus};

/// Classifies `headers` against the required field set.
///
/// Missing key fields make the table [`SchemaStatus::Unusable`]; any other
/// missing field makes it [`SchemaStatus::Partial`], in which case the
/// cleaner works on the columns that are there.
#[must_use]
pub fn validate(headers: &[String]) -> SchemaReport {
    let (present, missing): (Vec<RequiredField>, Vec<RequiredField>) = RequiredField::all()
        .iter()
        .copied()
        .partition(|field| headers.iter().any(|h| h == field.column_name()));

    let status = if missing.is_empty() {
        SchemaStatus::Full
    } else if missing.iter().any(|f| f.is_key()) {
        SchemaStatus::Unusable { missing }
    } else {
        SchemaStatus::Partial { missing }
    };

    SchemaReport { status, present }
}
