//! Helpers shared by unit tests across modules.

use crate::lookup::{CodeLookup, CodeMatch, LookupResult, StaticLookup};
use crate::{Description, EnrichError, EnrichResult};
use std::cell::Cell;

pub(crate) fn desc(text: &str) -> Description {
    Description::new(text).expect("test description")
}

pub(crate) fn m(code: &str, description: &str) -> CodeMatch {
    CodeMatch::new(code, desc(description))
}

/// Counts calls and either delegates to a fixture or fails every lookup with a 503.
pub(crate) struct CountingLookup {
    inner: Option<StaticLookup>,
    calls: Cell<usize>,
}

impl CountingLookup {
    pub(crate) fn new(inner: StaticLookup) -> Self {
        Self {
            inner: Some(inner),
            calls: Cell::new(0),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            inner: None,
            calls: Cell::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl CodeLookup for CountingLookup {
    fn lookup(&self, term: &str) -> EnrichResult<LookupResult> {
        self.calls.set(self.calls.get() + 1);
        match &self.inner {
            Some(lookup) => lookup.lookup(term),
            None => Err(EnrichError::ServiceStatus {
                code: term.to_string(),
                status: 503,
                body: "unavailable".into(),
            }),
        }
    }
}
