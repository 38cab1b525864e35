use crate::code::DiagnosisCode;

#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(reqwest::Error),
    #[error("lookup service unreachable for code {code}: {source}")]
    ServiceUnreachable {
        code: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("lookup service returned status {status} for code {code}: {body}")]
    ServiceStatus { code: String, status: u16, body: String },
    #[error("unexpected lookup response for code {code}: {message}")]
    Protocol { code: String, message: String },
    #[error("ambiguous mapping for code {code}: {count} matches ({candidates})")]
    AmbiguousMapping {
        code: DiagnosisCode,
        count: usize,
        candidates: String,
    },
    #[error("failed to read file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to deserialize {what}: {message}")]
    Deserialization { what: String, message: String },
    #[error("failed to serialize results: {0}")]
    Serialization(serde_json::Error),
}

impl EnrichError {
    /// True for failures raised by the lookup service rather than by the input data.
    pub fn is_service_error(&self) -> bool {
        matches!(
            self,
            EnrichError::ServiceUnreachable { .. }
                | EnrichError::ServiceStatus { .. }
                | EnrichError::Protocol { .. }
        )
    }
}

pub type EnrichResult<T> = std::result::Result<T, EnrichError>;
