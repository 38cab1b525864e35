//! Diagnosis codes as they arrive from patient input.
//!
//! Codes are nominally ICD-10 strings, but patient lists are not trusted: any JSON value is
//! accepted and kept verbatim so it can be reported back unchanged as a malformed code.

use serde::{Deserialize, Serialize};

/// A single diagnosis code attached to a patient.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DiagnosisCode {
    /// The expected form, e.g. `"U07.1"`.
    Text(String),
    /// Anything else the input carried (numbers, booleans, null, nested values).
    Other(serde_json::Value),
}

impl DiagnosisCode {
    /// The term sent to the lookup service, if this code can be searched at all.
    ///
    /// Scalars other than strings are searched by their textual form, the same way a query
    /// string would carry them. Blank strings, null, arrays and objects are not searchable and
    /// classify as malformed without a lookup.
    pub fn search_term(&self) -> Option<String> {
        match self {
            DiagnosisCode::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            DiagnosisCode::Other(serde_json::Value::Number(n)) => Some(n.to_string()),
            DiagnosisCode::Other(serde_json::Value::Bool(b)) => Some(b.to_string()),
            DiagnosisCode::Other(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            DiagnosisCode::Text(s) => Some(s),
            DiagnosisCode::Other(_) => None,
        }
    }
}

impl std::fmt::Display for DiagnosisCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosisCode::Text(s) => write!(f, "{}", s),
            DiagnosisCode::Other(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for DiagnosisCode {
    fn from(value: &str) -> Self {
        DiagnosisCode::Text(value.to_string())
    }
}

impl From<String> for DiagnosisCode {
    fn from(value: String) -> Self {
        DiagnosisCode::Text(value)
    }
}

impl From<i64> for DiagnosisCode {
    fn from(value: i64) -> Self {
        DiagnosisCode::Other(serde_json::Value::from(value))
    }
}
