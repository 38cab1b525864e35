//! Per-run memoisation of lookups.
//!
//! Patients often share codes (`I10`, `U07.1`, `N18.30` in the sample set). Wrapping a lookup
//! in [`CachingLookup`] sends each distinct term to the service once per run. The cache is
//! dropped with the wrapper and never persisted.

use super::{CodeLookup, LookupResult};
use crate::EnrichResult;
use std::cell::RefCell;
use std::collections::HashMap;

pub struct CachingLookup<L> {
    inner: L,
    cache: RefCell<HashMap<String, LookupResult>>,
}

impl<L: CodeLookup> CachingLookup<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Number of distinct terms looked up so far.
    pub fn cached_terms(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn into_inner(self) -> L {
        self.inner
    }
}

impl<L: CodeLookup> CodeLookup for CachingLookup<L> {
    fn lookup(&self, term: &str) -> EnrichResult<LookupResult> {
        if let Some(hit) = self.cache.borrow().get(term) {
            tracing::debug!(term, "lookup cache hit");
            return Ok(hit.clone());
        }

        // Errors are not cached; they abort the run.
        let result = self.inner.lookup(term)?;
        self.cache
            .borrow_mut()
            .insert(term.to_string(), result.clone());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::StaticLookup;
    use crate::test_support::CountingLookup;
    use crate::EnrichError;

    #[test]
    fn test_repeated_terms_hit_inner_once() {
        let counting = CountingLookup::new(StaticLookup::icd10_sample());
        let cached = CachingLookup::new(&counting);

        for _ in 0..3 {
            let result = cached.lookup("U07.1").unwrap();
            assert_eq!(result.matches[0].description, "COVID-19");
        }
        cached.lookup("I10").unwrap();

        assert_eq!(counting.calls(), 2);
        assert_eq!(cached.cached_terms(), 2);
    }

    #[test]
    fn test_empty_results_are_cached_too() {
        let counting = CountingLookup::new(StaticLookup::new());
        let cached = CachingLookup::new(&counting);

        assert!(cached.lookup("ABC.123").unwrap().matches.is_empty());
        assert!(cached.lookup("ABC.123").unwrap().matches.is_empty());
        assert_eq!(counting.calls(), 1);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let counting = CountingLookup::failing();
        let cached = CachingLookup::new(&counting);

        assert!(matches!(cached.lookup("I10"), Err(EnrichError::ServiceStatus { .. })));
        assert!(cached.lookup("I10").is_err());
        assert_eq!(counting.calls(), 2);
        assert_eq!(cached.cached_terms(), 0);
    }
}
