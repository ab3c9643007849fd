use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use sqlx::FromRow;

use crate::survey::CompletedSurvey;
use crate::survey::answers::Canonical;

/// Fields the questionnaire does not ask about are stored with fixed values.
pub const STORED_COURSE: &str = "Business";
pub const STORED_EXTRACURRICULAR: &str = "Moderate";
pub const STORED_CREDIT_LOAD: i32 = 17;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct UserRow {
  pub id: i64, // tg id
  pub username: String,
  pub is_admin: bool,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct SurveyResponseRow {
  pub id: i64,
  pub user_id: i64,
  pub created_at: DateTime<Utc>,
  pub age: i32,
  pub gender: String,
  pub course: String,
  pub gpa: f64,
  pub stress_level: i32,
  pub anxiety_score: i32,
  pub sleep_quality: String,
  pub physical_activity: String,
  pub diet_quality: String,
  pub social_support: String,
  pub relationship_status: String,
  pub substance_use: String,
  pub counseling_service_use: String,
  pub family_history: String,
  pub chronic_illness: String,
  pub financial_stress: i32,
  pub extracurricular_involvement: String,
  pub semester_credit_load: i32,
  pub residence_type: String,
  pub bot_rating: i32,
}

/// Insert payload for `survey_responses`; `id` and `created_at` come from the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSurveyResponse {
  pub user_id: i64,
  pub age: i32,
  pub gender: &'static str,
  pub course: &'static str,
  pub gpa: f64,
  pub stress_level: i32,
  pub anxiety_score: i32,
  pub sleep_quality: &'static str,
  pub physical_activity: &'static str,
  pub diet_quality: &'static str,
  pub social_support: &'static str,
  pub relationship_status: &'static str,
  pub substance_use: &'static str,
  pub counseling_service_use: &'static str,
  pub family_history: &'static str,
  pub chronic_illness: &'static str,
  pub financial_stress: i32,
  pub extracurricular_involvement: &'static str,
  pub semester_credit_load: i32,
  pub residence_type: &'static str,
  pub bot_rating: i32,
}

impl NewSurveyResponse {
  pub fn from_survey(user_id: i64, survey: &CompletedSurvey) -> Self {
    Self {
      user_id,
      age: survey.age,
      gender: survey.gender.canonical(),
      course: STORED_COURSE,
      gpa: survey.gpa,
      stress_level: survey.stress_level,
      anxiety_score: survey.anxiety_score,
      sleep_quality: survey.sleep_quality.canonical(),
      physical_activity: survey.physical_activity.canonical(),
      diet_quality: survey.diet_quality.canonical(),
      social_support: survey.social_support.canonical(),
      relationship_status: survey.relationship_status.canonical(),
      substance_use: survey.substance_use.canonical(),
      counseling_service_use: survey.counseling_use.canonical(),
      family_history: survey.family_history.canonical(),
      chronic_illness: survey.chronic_illness.canonical(),
      financial_stress: survey.financial_stress,
      extracurricular_involvement: STORED_EXTRACURRICULAR,
      semester_credit_load: STORED_CREDIT_LOAD,
      residence_type: survey.residence.canonical(),
      bot_rating: survey.bot_rating,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::NewSurveyResponse;
  use crate::survey::flow::tests::completed_survey;

  #[test]
  fn new_response_carries_canonical_values_and_defaults() {
    let response = NewSurveyResponse::from_survey(7, &completed_survey());
    assert_eq!(response.user_id, 7);
    assert_eq!(response.gender, "Female");
    assert_eq!(response.relationship_status, "InaRelationship");
    assert_eq!(response.residence_type, "WithFamily");
    assert_eq!(response.diet_quality, "Good");
    assert_eq!(response.family_history, "Yes");
    assert_eq!(response.course, "Business");
    assert_eq!(response.semester_credit_load, 17);
  }
}
