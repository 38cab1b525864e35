//! Priority diagnosis rules.
//!
//! A resolved description is a priority diagnosis when it contains any configured trigger,
//! compared case-insensitively.

use crate::constants::DEFAULT_PRIORITY_TRIGGERS;
use crate::{EnrichError, EnrichResult};

/// Lowercase trigger substrings that flag a description as a priority diagnosis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PriorityRules {
    triggers: Vec<String>,
}

impl PriorityRules {
    /// Build rules from raw trigger strings.
    ///
    /// Triggers are trimmed and lowercased. Blank entries are dropped and duplicates collapse.
    ///
    /// # Errors
    ///
    /// Returns `EnrichError::InvalidInput` if no non-blank trigger remains.
    pub fn new<I>(triggers: I) -> EnrichResult<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut normalised: Vec<String> = Vec::new();
        for trigger in triggers {
            let t = trigger.as_ref().trim().to_lowercase();
            if !t.is_empty() && !normalised.contains(&t) {
                normalised.push(t);
            }
        }

        if normalised.is_empty() {
            return Err(EnrichError::InvalidInput(
                "at least one priority trigger is required".into(),
            ));
        }

        Ok(Self {
            triggers: normalised,
        })
    }

    pub fn triggers(&self) -> &[String] {
        &self.triggers
    }

    /// Returns true if `description` contains any trigger, ignoring case.
    pub fn matches(&self, description: &str) -> bool {
        let lowered = description.to_lowercase();
        self.triggers.iter().any(|t| lowered.contains(t.as_str()))
    }
}

impl Default for PriorityRules {
    fn default() -> Self {
        Self {
            triggers: DEFAULT_PRIORITY_TRIGGERS
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_flag_covid_and_respiratory_failure() {
        let rules = PriorityRules::default();
        assert!(rules.matches("COVID-19"));
        assert!(rules.matches(
            "Acute respiratory failure, unspecified whether with hypoxia or hypercapnia"
        ));
        assert!(rules.matches("Post COVID-19 condition, unspecified"));
    }

    #[test]
    fn test_default_rules_ignore_unrelated_descriptions() {
        let rules = PriorityRules::default();
        assert!(!rules.matches("Hyperlipidemia, unspecified"));
        assert!(!rules.matches("Essential (primary) hypertension"));
        assert!(!rules.matches("Respiratory arrest"));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let rules = PriorityRules::default();
        assert!(rules.matches("ACUTE RESPIRATORY FAILURE"));
        assert!(rules.matches("covid"));
    }

    #[test]
    fn test_new_normalises_triggers() {
        let rules = PriorityRules::new([" Sepsis ", "", "SEPSIS", "Stroke"]).expect("rules");
        assert_eq!(rules.triggers(), &["sepsis".to_string(), "stroke".to_string()]);
        assert!(rules.matches("Sepsis, unspecified organism"));
    }

    #[test]
    fn test_new_rejects_empty_trigger_list() {
        let err = PriorityRules::new([" ", ""]).expect_err("should reject blanks");
        assert!(matches!(err, EnrichError::InvalidInput(msg) if msg.contains("trigger")));
    }
}
