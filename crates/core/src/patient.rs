//! Patient input records and their enriched results.
//!
//! [`classify_patient`] is the per-patient step of the pipeline: every code is resolved in
//! input order and lands in exactly one of `diagnoses` or `malformed_diagnoses`.

use crate::lookup::{resolve, CodeLookup, Resolution};
use crate::{AmbiguityPolicy, CoreConfig, Description, DiagnosisCode, EnrichError, EnrichResult};
use serde::{Deserialize, Serialize};

/// A patient as supplied to the pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    #[serde(alias = "id")]
    pub patient_id: i64,
    #[serde(default)]
    pub diagnoses: Vec<DiagnosisCode>,
}

impl Patient {
    pub fn new<I, C>(patient_id: i64, diagnoses: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<DiagnosisCode>,
    {
        Self {
            patient_id,
            diagnoses: diagnoses.into_iter().map(Into::into).collect(),
        }
    }
}

/// A patient after enrichment.
///
/// `diagnoses` serialises as `[code, description]` pairs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatientResult {
    pub patient_id: i64,
    pub diagnoses: Vec<(DiagnosisCode, Description)>,
    pub priority_diagnoses: Vec<Description>,
    pub malformed_diagnoses: Vec<DiagnosisCode>,
}

impl PatientResult {
    pub fn empty(patient_id: i64) -> Self {
        Self {
            patient_id,
            diagnoses: Vec::new(),
            priority_diagnoses: Vec::new(),
            malformed_diagnoses: Vec::new(),
        }
    }

    pub fn priority_count(&self) -> usize {
        self.priority_diagnoses.len()
    }
}

/// Resolve every code of `patient` and sort it into resolved, priority and malformed.
///
/// # Errors
///
/// Returns the lookup's error if the service fails, and `EnrichError::AmbiguousMapping` if a
/// code matches more than one description while the policy is [`AmbiguityPolicy::Fail`].
pub fn classify_patient<L: CodeLookup + ?Sized>(
    patient: &Patient,
    lookup: &L,
    cfg: &CoreConfig,
) -> EnrichResult<PatientResult> {
    let rules = cfg.priority_rules();
    let mut result = PatientResult::empty(patient.patient_id);

    for code in &patient.diagnoses {
        let resolved = match resolve(lookup, code)? {
            Resolution::Malformed => None,
            Resolution::Resolved(only) => Some(only),
            Resolution::Ambiguous { total, matches } => match cfg.ambiguity_policy() {
                AmbiguityPolicy::Fail => {
                    let candidates = matches
                        .iter()
                        .map(|m| format!("{} {}", m.code, m.description))
                        .collect::<Vec<_>>()
                        .join("; ");
                    return Err(EnrichError::AmbiguousMapping {
                        code: code.clone(),
                        count: total as usize,
                        candidates,
                    });
                }
                AmbiguityPolicy::FirstMatch => {
                    tracing::warn!(
                        "code {} has {} matches for patient {}, using the first",
                        code,
                        total,
                        patient.patient_id
                    );
                    matches.into_iter().next()
                }
            },
        };

        match resolved {
            Some(found) => {
                if rules.matches(found.description.as_str()) {
                    result.priority_diagnoses.push(found.description.clone());
                }
                result.diagnoses.push((code.clone(), found.description));
            }
            None => {
                tracing::warn!(
                    "malformed diagnosis code {} for patient {}",
                    code,
                    patient.patient_id
                );
                result.malformed_diagnoses.push(code.clone());
            }
        }
    }

    tracing::debug!(
        patient_id = patient.patient_id,
        resolved = result.diagnoses.len(),
        priority = result.priority_diagnoses.len(),
        malformed = result.malformed_diagnoses.len(),
        "patient classified"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::StaticLookup;
    use crate::test_support::{desc, CountingLookup};
    use crate::PriorityRules;
    use serde_json::json;
    use std::time::Duration;

    fn first_match_config() -> CoreConfig {
        CoreConfig::new(
            crate::constants::DEFAULT_LOOKUP_BASE_URL,
            2,
            Duration::from_secs(1),
            PriorityRules::default(),
            AmbiguityPolicy::FirstMatch,
        )
        .unwrap()
    }

    fn ambiguous_lookup() -> StaticLookup {
        StaticLookup::icd10_sample()
            .with_match("E11", desc("Type 2 diabetes mellitus"))
            .with_match("E11", desc("Type 2 diabetes mellitus with COVID complications"))
    }

    #[test]
    fn test_classify_mixed_patient() {
        let patient = Patient::new(1, ["E78.5", "ABC.123", "U07.1", "J96.00"]);
        let result =
            classify_patient(&patient, &StaticLookup::icd10_sample(), &CoreConfig::default())
                .unwrap();

        assert_eq!(result.patient_id, 1);
        assert_eq!(
            result.diagnoses,
            vec![
                (DiagnosisCode::from("E78.5"), desc("Hyperlipidemia, unspecified")),
                (DiagnosisCode::from("U07.1"), desc("COVID-19")),
                (
                    DiagnosisCode::from("J96.00"),
                    desc("Acute respiratory failure, unspecified whether with hypoxia or hypercapnia")
                ),
            ]
        );
        assert_eq!(
            result.priority_diagnoses,
            vec![
                desc("COVID-19"),
                desc("Acute respiratory failure, unspecified whether with hypoxia or hypercapnia"),
            ]
        );
        assert_eq!(result.malformed_diagnoses, vec![DiagnosisCode::from("ABC.123")]);
    }

    #[test]
    fn test_classify_empty_patient() {
        let patient = Patient::new(2, Vec::<&str>::new());
        let counting = CountingLookup::new(StaticLookup::icd10_sample());
        let result = classify_patient(&patient, &counting, &CoreConfig::default()).unwrap();

        assert_eq!(result, PatientResult::empty(2));
        assert_eq!(counting.calls(), 0);
    }

    #[test]
    fn test_classify_keeps_non_string_code_verbatim() {
        let mut patient = Patient::new(5, ["G47.33", "I73.9", "N18.30"]);
        patient.diagnoses.push(DiagnosisCode::from(1));

        let result =
            classify_patient(&patient, &StaticLookup::icd10_sample(), &CoreConfig::default())
                .unwrap();

        assert_eq!(result.diagnoses.len(), 3);
        assert!(result.priority_diagnoses.is_empty());
        assert_eq!(result.malformed_diagnoses, vec![DiagnosisCode::from(1)]);
        assert_eq!(
            serde_json::to_value(&result.malformed_diagnoses).unwrap(),
            json!([1])
        );
    }

    #[test]
    fn test_classify_unsearchable_values_are_malformed() {
        let patient = Patient {
            patient_id: 9,
            diagnoses: vec![
                DiagnosisCode::Other(json!(null)),
                DiagnosisCode::from(""),
                DiagnosisCode::Other(json!({"code": "I10"})),
            ],
        };
        let counting = CountingLookup::new(StaticLookup::icd10_sample());
        let result = classify_patient(&patient, &counting, &CoreConfig::default()).unwrap();

        assert!(result.diagnoses.is_empty());
        assert_eq!(result.malformed_diagnoses, patient.diagnoses);
        assert_eq!(counting.calls(), 0);
    }

    #[test]
    fn test_every_code_lands_in_exactly_one_bucket() {
        let patient = Patient::new(4, ["I10", "E66.9", "745.902", "I10", "ABC.123"]);
        let result =
            classify_patient(&patient, &StaticLookup::icd10_sample(), &CoreConfig::default())
                .unwrap();

        assert_eq!(
            result.diagnoses.len() + result.malformed_diagnoses.len(),
            patient.diagnoses.len()
        );
        // Duplicated input codes are kept, not collapsed.
        assert_eq!(result.diagnoses.len(), 3);
        assert_eq!(result.malformed_diagnoses.len(), 2);
    }

    #[test]
    fn test_ambiguous_mapping_fails_by_default() {
        let patient = Patient::new(7, ["I10", "E11"]);
        let err = classify_patient(&patient, &ambiguous_lookup(), &CoreConfig::default())
            .expect_err("ambiguous");

        match err {
            EnrichError::AmbiguousMapping {
                code,
                count,
                candidates,
            } => {
                assert_eq!(code, DiagnosisCode::from("E11"));
                assert_eq!(count, 2);
                assert!(candidates.contains("E11 Type 2 diabetes mellitus"));
            }
            other => panic!("expected AmbiguousMapping, got {other:?}"),
        }
    }

    #[test]
    fn test_ambiguous_mapping_first_match_policy_takes_first() {
        let patient = Patient::new(7, ["I10", "E11"]);
        let result = classify_patient(&patient, &ambiguous_lookup(), &first_match_config())
            .unwrap();

        assert_eq!(
            result.diagnoses[1],
            (DiagnosisCode::from("E11"), desc("Type 2 diabetes mellitus"))
        );
        // The second candidate mentions COVID, but only the chosen one is tested.
        assert!(result.priority_diagnoses.is_empty());
    }

    #[test]
    fn test_service_error_propagates() {
        let patient = Patient::new(0, ["I10", "K21.9"]);
        let counting = CountingLookup::failing();
        let err = classify_patient(&patient, &counting, &CoreConfig::default())
            .expect_err("service down");

        assert!(err.is_service_error());
        assert_eq!(counting.calls(), 1);
    }

    #[test]
    fn test_custom_priority_rules() {
        let cfg = CoreConfig::new(
            crate::constants::DEFAULT_LOOKUP_BASE_URL,
            2,
            Duration::from_secs(1),
            PriorityRules::new(["kidney"]).unwrap(),
            AmbiguityPolicy::Fail,
        )
        .unwrap();
        let patient = Patient::new(3, ["U07.1", "N18.30"]);
        let result = classify_patient(&patient, &StaticLookup::icd10_sample(), &cfg).unwrap();

        assert_eq!(
            result.priority_diagnoses,
            vec![desc("Chronic kidney disease, stage 3 unspecified")]
        );
    }

    #[test]
    fn test_patient_deserialises_with_id_alias_and_mixed_codes() {
        let patient: Patient =
            serde_json::from_value(json!({"id": 5, "diagnoses": ["G47.33", 1]})).unwrap();
        assert_eq!(patient.patient_id, 5);
        assert_eq!(
            patient.diagnoses,
            vec![DiagnosisCode::from("G47.33"), DiagnosisCode::from(1)]
        );
    }

    #[test]
    fn test_result_serialises_pairs_as_arrays() {
        let result = PatientResult {
            patient_id: 0,
            diagnoses: vec![(DiagnosisCode::from("U07.1"), desc("COVID-19"))],
            priority_diagnoses: vec![desc("COVID-19")],
            malformed_diagnoses: vec![],
        };
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "patient_id": 0,
                "diagnoses": [["U07.1", "COVID-19"]],
                "priority_diagnoses": ["COVID-19"],
                "malformed_diagnoses": []
            })
        );
    }
}
