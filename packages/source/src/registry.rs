//! Source registry: loads the built-in source definitions from embedded
//! TOML configs.
//!
//! Each `.toml` file in `packages/source/sources/` is baked into the binary
//! at compile time via [`include_str!`].

use crate::source_def::{SourceDefinition, parse_source_toml};

/// Identifier of the source used when no configuration says otherwise.
pub const DEFAULT_SOURCE_ID: &str = "us_accidents";

/// TOML configs embedded at compile time.
const SOURCE_TOMLS: &[(&str, &str)] = &[(
    "us_accidents",
    include_str!("../sources/us_accidents.toml"),
)];

/// Returns all built-in source definitions, parsed from embedded TOML.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_sources() -> Vec<SourceDefinition> {
    SOURCE_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_source_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Looks up a built-in source by id.
#[must_use]
pub fn find_source(id: &str) -> Option<SourceDefinition> {
    all_sources().into_iter().find(|s| s.id == id)
}

/// Returns the built-in default source definition.
///
/// # Panics
///
/// Panics if the embedded default source is missing from the registry.
#[must_use]
pub fn default_source() -> SourceDefinition {
    find_source(DEFAULT_SOURCE_ID)
        .unwrap_or_else(|| panic!("built-in source '{DEFAULT_SOURCE_ID}' is not registered"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_ROW_LIMIT;

    #[test]
    fn loads_all_sources() {
        assert_eq!(all_sources().len(), SOURCE_TOMLS.len());
    }

    #[test]
    fn source_ids_are_unique() {
        let sources = all_sources();
        let mut ids: Vec<&str> = sources.iter().map(|s| s.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), sources.len());
    }

    #[test]
    fn default_source_caps_rows() {
        let source = default_source();
        assert_eq!(source.id, DEFAULT_SOURCE_ID);
        assert_eq!(source.row_limit, Some(DEFAULT_ROW_LIMIT));
    }
}
