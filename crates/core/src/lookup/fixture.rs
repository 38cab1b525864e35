//! In-memory lookup backed by a fixed code table.
//!
//! Used for tests and offline runs. Terms are matched exactly (no prefix search, no case
//! folding), so a fixture answers only for the codes it was given.

use super::{CodeLookup, CodeMatch, LookupResult};
use crate::{Description, EnrichError, EnrichResult};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

#[derive(Clone, Debug, Default)]
pub struct StaticLookup {
    entries: HashMap<String, Vec<CodeMatch>>,
}

impl StaticLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers recorded from the Clinical Tables API for the built-in sample patients.
    ///
    /// `ABC.123`, `745.902` and `1` are deliberately absent: the service reports no match.
    pub fn icd10_sample() -> Self {
        [
            ("I10", "Essential (primary) hypertension"),
            ("K21.9", "Gastro-esophageal reflux disease without esophagitis"),
            ("E78.5", "Hyperlipidemia, unspecified"),
            ("U07.1", "COVID-19"),
            (
                "J96.00",
                "Acute respiratory failure, unspecified whether with hypoxia or hypercapnia",
            ),
            ("N18.30", "Chronic kidney disease, stage 3 unspecified"),
            ("E66.9", "Obesity, unspecified"),
            ("G47.33", "Obstructive sleep apnea (adult) (pediatric)"),
            ("I73.9", "Peripheral vascular disease, unspecified"),
        ]
        .into_iter()
        .filter_map(|(code, name)| Description::new(name).ok().map(|d| (code, d)))
        .fold(Self::new(), |lookup, (code, description)| {
            lookup.with_match(code, description)
        })
    }

    /// Record one more match for `code`.
    pub fn with_match(mut self, code: &str, description: Description) -> Self {
        self.entries
            .entry(code.to_string())
            .or_default()
            .push(CodeMatch::new(code, description));
        self
    }

    /// Replace whatever `term` answers with `matches`.
    pub fn insert(&mut self, term: impl Into<String>, matches: Vec<CodeMatch>) {
        self.entries.insert(term.into(), matches);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a fixture table.
    ///
    /// The format is a JSON object mapping each search term to its `[code, name]` rows:
    ///
    /// ```json
    /// { "U07.1": [["U07.1", "COVID-19"]], "ABC.123": [] }
    /// ```
    pub fn from_json_str(json: &str) -> EnrichResult<Self> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        let table = match serde_path_to_error::deserialize::<_, BTreeMap<String, Vec<(String, Description)>>>(
            &mut deserializer,
        ) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                return Err(EnrichError::Deserialization {
                    what: "lookup fixture".into(),
                    message: format!("schema mismatch at {path}: {source}"),
                });
            }
        };

        let mut lookup = Self::new();
        for (term, rows) in table {
            let matches = rows
                .into_iter()
                .map(|(code, description)| CodeMatch::new(code, description))
                .collect();
            lookup.insert(term, matches);
        }
        Ok(lookup)
    }

    /// Read a fixture table from a JSON file. See [`StaticLookup::from_json_str`].
    pub fn load(path: &Path) -> EnrichResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(EnrichError::FileRead)?;
        Self::from_json_str(&contents)
    }
}

impl CodeLookup for StaticLookup {
    fn lookup(&self, term: &str) -> EnrichResult<LookupResult> {
        Ok(self
            .entries
            .get(term)
            .map(|matches| LookupResult::from_matches(matches.clone()))
            .unwrap_or_default())
    }
}
