//! Code lookup against an ICD-10 search service.
//!
//! [`CodeLookup`] is the seam between the pipeline and whatever answers "which codes match
//! this term": the Clinical Tables HTTP client in production, [`StaticLookup`] for fixtures
//! and tests, optionally wrapped in a per-run [`CachingLookup`].
//!
//! A lookup only reports matches. Turning a match list into an outcome is [`resolve`]'s job,
//! which yields a tagged [`Resolution`] and leaves the recovery decision to the caller.

pub mod cache;
pub mod clinical_tables;
pub mod fixture;

pub use cache::CachingLookup;
pub use clinical_tables::ClinicalTablesClient;
pub use fixture::StaticLookup;

use crate::{Description, DiagnosisCode, EnrichResult};

/// One `(code, description)` pair reported by the lookup service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeMatch {
    pub code: String,
    pub description: Description,
}

impl CodeMatch {
    pub fn new(code: impl Into<String>, description: Description) -> Self {
        Self {
            code: code.into(),
            description,
        }
    }
}

/// Matches returned for a single search term.
///
/// `total` is the number of matches the service knows about, which can exceed
/// `matches.len()` because the request caps the list length.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LookupResult {
    pub total: u64,
    pub matches: Vec<CodeMatch>,
}

impl LookupResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_matches(matches: Vec<CodeMatch>) -> Self {
        Self {
            total: matches.len() as u64,
            matches,
        }
    }
}

/// Anything that can answer a code search.
pub trait CodeLookup {
    /// Search for `term` and return every match the source reports.
    ///
    /// # Errors
    ///
    /// Returns a service error if the source is unreachable, answers with a non-success
    /// status, or answers with a payload of the wrong shape.
    fn lookup(&self, term: &str) -> EnrichResult<LookupResult>;
}

impl<L: CodeLookup + ?Sized> CodeLookup for &L {
    fn lookup(&self, term: &str) -> EnrichResult<LookupResult> {
        (**self).lookup(term)
    }
}

impl<L: CodeLookup + ?Sized> CodeLookup for Box<L> {
    fn lookup(&self, term: &str) -> EnrichResult<LookupResult> {
        (**self).lookup(term)
    }
}

/// Outcome of looking up one diagnosis code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// No match, or the code is not a searchable term.
    Malformed,
    /// Exactly one match.
    Resolved(CodeMatch),
    /// More than one match; `total` is what the service reported.
    Ambiguous { total: u64, matches: Vec<CodeMatch> },
}

impl Resolution {
    /// Classify a lookup result by cardinality.
    pub fn from_result(result: LookupResult) -> Self {
        let LookupResult { total, mut matches } = result;
        match matches.len() {
            0 => Resolution::Malformed,
            1 if total <= 1 => match matches.pop() {
                Some(only) => Resolution::Resolved(only),
                None => Resolution::Malformed,
            },
            n => Resolution::Ambiguous {
                total: total.max(n as u64),
                matches,
            },
        }
    }
}

/// Look up `code` and classify the answer.
///
/// Codes without a search term (blank strings, null, arrays, objects) classify as
/// [`Resolution::Malformed`] without calling the lookup.
pub fn resolve<L: CodeLookup + ?Sized>(
    lookup: &L,
    code: &DiagnosisCode,
) -> EnrichResult<Resolution> {
    let Some(term) = code.search_term() else {
        tracing::debug!("code {} is not a searchable term", code);
        return Ok(Resolution::Malformed);
    };

    let result = lookup.lookup(&term)?;
    tracing::debug!(
        term = %term,
        total = result.total,
        returned = result.matches.len(),
        "lookup complete"
    );
    Ok(Resolution::from_result(result))
}
