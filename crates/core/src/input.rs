//! Patient input: the built-in sample list and file loading.

use crate::{DiagnosisCode, EnrichError, EnrichResult, Patient};
use std::path::Path;

/// The six sample patients the pipeline was written against.
///
/// Patient 5 carries the integer `1` among its codes to exercise non-string input.
pub fn sample_patients() -> Vec<Patient> {
    vec![
        Patient::new(0, ["I10", "K21.9"]),
        Patient::new(1, ["E78.5", "ABC.123", "U07.1", "J96.00"]),
        Patient::new(2, Vec::<&str>::new()),
        Patient::new(3, ["U07.1", "N18.30"]),
        Patient::new(4, ["I10", "E66.9", "745.902"]),
        Patient {
            patient_id: 5,
            diagnoses: vec![
                DiagnosisCode::from("G47.33"),
                DiagnosisCode::from("I73.9"),
                DiagnosisCode::from("N18.30"),
                DiagnosisCode::from(1),
            ],
        },
    ]
}

/// Input formats accepted by [`load_patients`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Yaml,
}

impl InputFormat {
    /// Pick the format from a file extension. Anything other than `.yaml`/`.yml` is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => InputFormat::Yaml,
            _ => InputFormat::Json,
        }
    }
}

/// Read a patient list from a JSON or YAML file.
///
/// # Errors
///
/// Returns `EnrichError::FileRead` if the file cannot be read and
/// `EnrichError::Deserialization` (with the failing path) if it does not hold a patient list.
pub fn load_patients(path: &Path) -> EnrichResult<Vec<Patient>> {
    let contents = std::fs::read_to_string(path).map_err(EnrichError::FileRead)?;
    parse_patients(&contents, InputFormat::from_path(path))
}

/// Parse a patient list.
///
/// This uses `serde_path_to_error` to surface a best-effort "path" (e.g. `[3].patient_id`)
/// when the input does not match.
pub fn parse_patients(text: &str, format: InputFormat) -> EnrichResult<Vec<Patient>> {
    let parsed = match format {
        InputFormat::Json => {
            let mut deserializer = serde_json::Deserializer::from_str(text);
            serde_path_to_error::deserialize::<_, Vec<Patient>>(&mut deserializer)
                .map_err(|err| schema_error(err.path().to_string(), err.into_inner()))
        }
        InputFormat::Yaml => {
            let deserializer = serde_yaml::Deserializer::from_str(text);
            serde_path_to_error::deserialize::<_, Vec<Patient>>(deserializer)
                .map_err(|err| schema_error(err.path().to_string(), err.into_inner()))
        }
    }?;

    tracing::debug!("parsed {} patients", parsed.len());
    Ok(parsed)
}

fn schema_error(path: String, source: impl std::fmt::Display) -> EnrichError {
    let path = if path.is_empty() || path == "." {
        "<root>".to_string()
    } else {
        path
    };
    EnrichError::Deserialization {
        what: "patient list".into(),
        message: format!("schema mismatch at {path}: {source}"),
    }
}
