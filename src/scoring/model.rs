//! Classifier artifact and the feature row it consumes.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::survey::CompletedSurvey;
use crate::survey::answers::Canonical;

pub const FEATURE_COLUMNS: [&str; 29] = [
  "Age",
  "Gender",
  "Course",
  "CGPA",
  "Stress_Level",
  "Anxiety_Score",
  "Sleep_Quality",
  "Physical_Activity",
  "Diet_Quality",
  "Social_Support",
  "Relationship_Status",
  "Substance_Use",
  "Counseling_Service_Use",
  "Family_History",
  "Chronic_Illness",
  "Financial_Stress",
  "Extracurricular_Involvement",
  "Semester_Credit_Load",
  "Residence_Type",
  "Counseling_Service_Use_Level",
  "Diet_Quality_Level",
  "Family_History_Bool",
  "Gender_Bool",
  "Substance_Use_Level",
  "Social_Support_Level",
  "Extracurricular_Involvement_Level",
  "Physical_Activity_Level",
  "Sleep_Quality_Level",
  "Chronic_Illness_Bool",
];

const FEATURE_COURSE: &str = "Engineering";
const FEATURE_EXTRACURRICULAR: f64 = 2.0;
const FEATURE_CREDIT_LOAD: f64 = 22.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue {
  Number(f64),
  Category(&'static str),
  Missing,
}

/// One row in [`FEATURE_COLUMNS`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
  values: Vec<FeatureValue>,
}

impl FeatureRow {
  pub fn from_survey(survey: &CompletedSurvey) -> Self {
    use FeatureValue::Category;
    use FeatureValue::Missing;
    use FeatureValue::Number;

    let mut values = vec![
      Number(f64::from(survey.age)),
      Category(survey.gender.canonical()),
      Category(FEATURE_COURSE),
      Number(survey.gpa),
      Number(f64::from(survey.stress_level)),
      Number(f64::from(survey.anxiety_score)),
      Category(survey.sleep_quality.canonical()),
      Category(survey.physical_activity.canonical()),
      Category(survey.diet_quality.canonical()),
      Category(survey.social_support.canonical()),
      Category(survey.relationship_status.canonical()),
      Category(survey.substance_use.canonical()),
      Category(survey.counseling_use.canonical()),
      Category(survey.family_history.canonical()),
      Category(survey.chronic_illness.canonical()),
      Number(f64::from(survey.financial_stress)),
      Number(FEATURE_EXTRACURRICULAR),
      Number(FEATURE_CREDIT_LOAD),
      Category(survey.residence.canonical()),
    ];
    values.resize(FEATURE_COLUMNS.len(), Missing);
    Self { values }
  }

  pub fn iter(&self) -> impl Iterator<Item = (&'static str, FeatureValue)> + '_ {
    FEATURE_COLUMNS.iter().copied().zip(self.values.iter().copied())
  }
}

#[derive(Debug, Error, PartialEq)]
pub enum ScoringError {
  #[error("model expects {expected} features, row has {found}")]
  FeatureCount { expected: usize, found: usize },
  #[error("model expects feature {expected:?} at position {position}, row has {found:?}")]
  FeatureName {
    position: usize,
    expected: String,
    found: &'static str,
  },
  #[error("model produced a non-finite probability")]
  NonFinite,
}

/// Anything that can turn a feature row into the probability of the positive class.
pub trait Classifier: Send + Sync {
  fn predict_proba(&self, row: &FeatureRow) -> Result<f64, ScoringError>;
}

/// Logistic regression over numeric columns plus one-hot encoded categorical columns.
/// Missing values and unseen categories contribute nothing to the linear term.
#[derive(Debug, Clone, Deserialize)]
pub struct LogisticModel {
  pub intercept: f64,
  #[serde(default)]
  pub numeric: HashMap<String, f64>,
  #[serde(default)]
  pub categorical: HashMap<String, HashMap<String, f64>>,
  #[serde(default)]
  pub feature_names: Option<Vec<String>>,
}

impl LogisticModel {
  fn check_columns(&self) -> Result<(), ScoringError> {
    let Some(names) = &self.feature_names else {
      return Ok(());
    };
    if names.len() != FEATURE_COLUMNS.len() {
      return Err(ScoringError::FeatureCount {
        expected: names.len(),
        found: FEATURE_COLUMNS.len(),
      });
    }
    for (position, (expected, found)) in names.iter().zip(FEATURE_COLUMNS).enumerate() {
      if expected != found {
        return Err(ScoringError::FeatureName {
          position,
          expected: expected.clone(),
          found,
        });
      }
    }
    Ok(())
  }
}

impl Classifier for LogisticModel {
  fn predict_proba(&self, row: &FeatureRow) -> Result<f64, ScoringError> {
    self.check_columns()?;

    let mut z = self.intercept;
    for (column, value) in row.iter() {
      match value {
        FeatureValue::Number(x) => z += self.numeric.get(column).copied().unwrap_or_default() * x,
        FeatureValue::Category(category) => {
          z += self
            .categorical
            .get(column)
            .and_then(|weights| weights.get(category))
            .copied()
            .unwrap_or_default();
        },
        FeatureValue::Missing => {},
      }
    }

    let probability = 1.0 / (1.0 + (-z).exp());
    if probability.is_finite() {
      Ok(probability)
    } else {
      Err(ScoringError::NonFinite)
    }
  }
}

#[derive(Debug, Error)]
pub enum ArtifactError {
  #[error("failed to read model artifact {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("malformed model artifact: {0}")]
  Parse(#[from] serde_json::Error),
  #[error("artifact threshold {0} is outside [0, 1]")]
  Threshold(f64),
}

/// The persisted `{ "model": ..., "threshold": ... }` package.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelArtifact {
  pub model: LogisticModel,
  pub threshold: f64,
}

impl ModelArtifact {
  pub fn load(path: &Path) -> Result<Self, ArtifactError> {
    let raw = fs::read_to_string(path).map_err(|source| ArtifactError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_json(&raw)
  }

  pub fn from_json(raw: &str) -> Result<Self, ArtifactError> {
    let artifact: Self = serde_json::from_str(raw)?;
    if !(0.0 ..= 1.0).contains(&artifact.threshold) {
      return Err(ArtifactError::Threshold(artifact.threshold));
    }
    Ok(artifact)
  }
}

#[cfg(test)]
mod tests {
  use std::path::Path;

  use super::ArtifactError;
  use super::Classifier;
  use super::FEATURE_COLUMNS;
  use super::FeatureRow;
  use super::FeatureValue;
  use super::ModelArtifact;
  use super::ScoringError;
  use crate::survey::flow::tests::completed_survey;

  fn value(row: &FeatureRow, column: &str) -> Option<FeatureValue> {
    row.iter().find(|(name, _)| *name == column).map(|(_, value)| value)
  }

  #[test]
  fn feature_row_follows_column_order_with_null_tail() {
    let row = FeatureRow::from_survey(&completed_survey());
    let columns: Vec<_> = row.iter().map(|(name, _)| name).collect();
    assert_eq!(columns, FEATURE_COLUMNS.to_vec());

    assert_eq!(value(&row, "Age"), Some(FeatureValue::Number(22.0)));
    assert_eq!(value(&row, "Gender"), Some(FeatureValue::Category("Female")));
    assert_eq!(value(&row, "Course"), Some(FeatureValue::Category("Engineering")));
    assert_eq!(value(&row, "Semester_Credit_Load"), Some(FeatureValue::Number(22.0)));
    assert_eq!(value(&row, "Residence_Type"), Some(FeatureValue::Category("WithFamily")));
    assert_eq!(row.iter().filter(|(_, value)| *value == FeatureValue::Missing).count(), 10);
    assert_eq!(value(&row, "Nope"), None);
  }

  #[test]
  fn intercept_only_model_is_sigmoid_of_intercept() {
    let artifact = ModelArtifact::from_json(r#"{"model": {"intercept": 0.0}, "threshold": 0.5}"#).unwrap();
    let probability = artifact.model.predict_proba(&FeatureRow::from_survey(&completed_survey())).unwrap();
    assert!((probability - 0.5).abs() < 1e-12);
  }

  #[test]
  fn weights_apply_to_numbers_and_matching_categories() {
    let artifact = ModelArtifact::from_json(
      r#"{
        "model": {
          "intercept": -3.0,
          "numeric": {"Anxiety_Score": 1.0},
          "categorical": {"Gender": {"Female": 1.0, "Male": -5.0}}
        },
        "threshold": 0.3
      }"#,
    )
    .unwrap();
    // -3 + 2 (anxiety score) + 1 (female) = 0
    let probability = artifact.model.predict_proba(&FeatureRow::from_survey(&completed_survey())).unwrap();
    assert!((probability - 0.5).abs() < 1e-12);
  }

  #[test]
  fn mismatched_feature_names_fail_prediction() {
    let artifact = ModelArtifact::from_json(
      r#"{"model": {"intercept": 0.0, "feature_names": ["Age", "Gender"]}, "threshold": 0.5}"#,
    )
    .unwrap();
    let err = artifact
      .model
      .predict_proba(&FeatureRow::from_survey(&completed_survey()))
      .unwrap_err();
    assert_eq!(err, ScoringError::FeatureCount { expected: 2, found: 29 });
  }

  #[test]
  fn rejects_threshold_out_of_range_and_garbage() {
    assert!(matches!(
      ModelArtifact::from_json(r#"{"model": {"intercept": 0.0}, "threshold": 1.5}"#),
      Err(ArtifactError::Threshold(_))
    ));
    assert!(matches!(
      ModelArtifact::from_json("not json"),
      Err(ArtifactError::Parse(_))
    ));
  }

  #[test]
  fn bundled_artifact_scores_a_survey() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("model/depression_model.json");
    let artifact = ModelArtifact::load(&path).unwrap();
    let probability = artifact.model.predict_proba(&FeatureRow::from_survey(&completed_survey())).unwrap();
    assert!((0.0 ..= 1.0).contains(&probability));
  }

  #[test]
  fn missing_file_is_a_read_error() {
    let err = ModelArtifact::load(Path::new("/nonexistent/model.json")).unwrap_err();
    assert!(matches!(err, ArtifactError::Read { .. }));
  }
}
