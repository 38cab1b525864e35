//! HTTP client for the NLM Clinical Tables ICD-10-CM search API.
//!
//! The service answers `GET {base}?sf=code&terms=..&maxList=..&df=code,name` with a JSON array:
//!
//! ```text
//! [total, ["U07.1", ...], null | {extra fields}, [["U07.1", "COVID-19"], ...]]
//! ```
//!
//! [`decode_search_response`] validates that layout before anything reads from it.

use super::{CodeLookup, CodeMatch, LookupResult};
use crate::constants::{DISPLAY_FIELDS, SEARCH_FIELD};
use crate::{CoreConfig, Description, EnrichError, EnrichResult};
use serde::Deserialize;
use std::time::Duration;

/// Blocking client for the Clinical Tables search endpoint.
pub struct ClinicalTablesClient {
    base_url: String,
    max_list: u32,
    timeout: Duration,
    client: reqwest::blocking::Client,
}

impl ClinicalTablesClient {
    /// Create a client for the endpoint and limits in `cfg`.
    ///
    /// # Errors
    ///
    /// Returns `EnrichError::HttpClient` if the underlying HTTP client cannot be built
    /// (for example when no TLS backend is available).
    pub fn new(cfg: &CoreConfig) -> EnrichResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(cfg.timeout())
            .build()
            .map_err(EnrichError::HttpClient)?;

        Ok(Self::with_http_client(cfg, client))
    }

    /// Wrap an already configured HTTP client.
    pub(crate) fn with_http_client(cfg: &CoreConfig, client: reqwest::blocking::Client) -> Self {
        Self {
            base_url: cfg.lookup_base_url().to_string(),
            max_list: cfg.max_list(),
            timeout: cfg.timeout(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn query_params(&self, term: &str) -> [(&'static str, String); 4] {
        [
            ("sf", SEARCH_FIELD.to_string()),
            ("terms", term.to_string()),
            ("maxList", self.max_list.to_string()),
            ("df", DISPLAY_FIELDS.to_string()),
        ]
    }
}

impl CodeLookup for ClinicalTablesClient {
    fn lookup(&self, term: &str) -> EnrichResult<LookupResult> {
        tracing::debug!(term, url = %self.base_url, "querying lookup service");

        let response = self
            .client
            .get(&self.base_url)
            .query(&self.query_params(term))
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    tracing::error!("lookup for {} timed out after {:?}", term, self.timeout);
                }
                EnrichError::ServiceUnreachable {
                    code: term.to_string(),
                    source: e,
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(EnrichError::ServiceStatus {
                code: term.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .map_err(|e| EnrichError::ServiceUnreachable {
                code: term.to_string(),
                source: e,
            })?;

        decode_search_response(term, &body)
    }
}

/// Wire layout of a search response.
#[derive(Deserialize)]
struct SearchWire(
    u64,
    Vec<String>,
    #[allow(dead_code)] Option<serde_json::Value>,
    Vec<Vec<String>>,
);

/// Decode and validate a search response body.
///
/// This uses `serde_path_to_error` to surface a best-effort "path" (e.g. `[3][0][1]`) when
/// the body does not match the expected layout.
///
/// # Errors
///
/// Returns `EnrichError::Protocol` if:
/// - the body is not a four-element array of the documented types,
/// - the code list and display rows differ in length,
/// - more rows are returned than the reported total,
/// - a display row is not `[code, name]`, names a different code, or has a blank name.
pub fn decode_search_response(term: &str, body: &str) -> EnrichResult<LookupResult> {
    let protocol = |message: String| EnrichError::Protocol {
        code: term.to_string(),
        message,
    };

    let mut deserializer = serde_json::Deserializer::from_str(body);
    let wire = match serde_path_to_error::deserialize::<_, SearchWire>(&mut deserializer) {
        Ok(parsed) => parsed,
        Err(err) => {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() || path == "." {
                "<root>"
            } else {
                path.as_str()
            };
            return Err(protocol(format!("schema mismatch at {path}: {source}")));
        }
    };
    deserializer
        .end()
        .map_err(|e| protocol(format!("trailing data after response: {e}")))?;

    let SearchWire(total, codes, _extra, rows) = wire;

    if codes.len() != rows.len() {
        return Err(protocol(format!(
            "{} codes but {} display rows",
            codes.len(),
            rows.len()
        )));
    }

    if rows.len() as u64 > total {
        return Err(protocol(format!(
            "{} rows returned but total reported as {total}",
            rows.len()
        )));
    }

    let mut matches = Vec::with_capacity(rows.len());
    for (i, (code, row)) in codes.into_iter().zip(rows).enumerate() {
        let [row_code, name] = row.as_slice() else {
            return Err(protocol(format!(
                "display row {i} has {} fields, expected [code, name]",
                row.len()
            )));
        };

        if *row_code != code {
            return Err(protocol(format!(
                "display row {i} names code {row_code} but code list has {code}"
            )));
        }

        let description = Description::new(name)
            .map_err(|_| protocol(format!("display row {i} has a blank name for {code}")))?;
        matches.push(CodeMatch::new(code, description));
    }

    Ok(LookupResult { total, matches })
}
