//! Constants used throughout the ICD core crate.
//!
//! Defaults for the lookup service and the classification rules live here so the
//! configuration layer and the tests agree on a single set of values.

/// Default Clinical Tables ICD-10-CM search endpoint.
pub const DEFAULT_LOOKUP_BASE_URL: &str = "https://clinicaltables.nlm.nih.gov/api/icd10cm/v3/search";

/// Search field specifier sent as `sf`.
pub const SEARCH_FIELD: &str = "code";

/// Display fields requested as `df`. Each returned row is `[code, name]`.
pub const DISPLAY_FIELDS: &str = "code,name";

/// Default number of candidate matches requested per code (`maxList`).
///
/// Two is the smallest value that still lets an ambiguous mapping show itself.
pub const DEFAULT_MAX_LIST: u32 = 2;

/// Upper bound the service accepts for `maxList`.
pub const MAX_LIST_LIMIT: u32 = 500;

/// Default HTTP timeout for a single lookup.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Lowercase substrings that flag a resolved description as a priority diagnosis.
pub const DEFAULT_PRIORITY_TRIGGERS: &[&str] = &["covid", "respiratory failure"];

/// Environment variable names read once at startup by the binaries.
pub const ENV_LOOKUP_BASE_URL: &str = "ICD_LOOKUP_BASE_URL";
pub const ENV_LOOKUP_MAX_LIST: &str = "ICD_LOOKUP_MAX_LIST";
pub const ENV_LOOKUP_TIMEOUT_SECS: &str = "ICD_LOOKUP_TIMEOUT_SECS";
pub const ENV_PRIORITY_TRIGGERS: &str = "ICD_PRIORITY_TRIGGERS";
pub const ENV_AMBIGUITY_POLICY: &str = "ICD_AMBIGUITY_POLICY";
pub const ENV_PATIENTS_FILE: &str = "ICD_PATIENTS_FILE";
