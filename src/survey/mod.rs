use anyhow::Context;
use anyhow::Result;
use tracing::info;
use tracing::instrument;

use crate::models::NewSurveyResponse;
use crate::models::SurveyResponseRow;
use crate::repo::SurveyRepository;
use crate::scoring::Assessment;
use crate::scoring::Scorer;

pub mod answers;
pub mod flow;

pub use flow::CompletedSurvey;
pub use flow::Progress;
pub use flow::SurveyDraft;
pub use flow::SurveyError;
pub use flow::SurveyStep;

#[derive(Debug, Clone)]
pub struct Submission {
  pub response: SurveyResponseRow,
  pub assessment: Assessment,
}

/// Persists a finished survey and scores it. The response is stored before scoring so that a
/// classifier problem can never lose an answer set.
#[instrument(skip(repo, scorer, survey))]
pub async fn submit_survey<R: SurveyRepository>(
  repo: &R,
  scorer: &Scorer,
  user_id: i64,
  survey: &CompletedSurvey,
) -> Result<Submission> {
  let response = repo
    .create_response(&NewSurveyResponse::from_survey(user_id, survey))
    .await
    .context("failed to store survey response")?;
  info!(user_id, response_id = response.id, "stored survey response");

  let assessment = scorer.assess(survey);
  Ok(Submission { response, assessment })
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::submit_survey;
  use crate::repo::ResponseOrder;
  use crate::repo::SurveyRepository;
  use crate::repo::memory::MemoryRepository;
  use crate::scoring::AnxietyLevel;
  use crate::scoring::Assessment;
  use crate::scoring::Classifier;
  use crate::scoring::FeatureRow;
  use crate::scoring::Scorer;
  use crate::scoring::model::ScoringError;
  use crate::survey::flow::tests::completed_survey;

  struct Fixed(f64);

  impl Classifier for Fixed {
    fn predict_proba(&self, _row: &FeatureRow) -> Result<f64, ScoringError> {
      Ok(self.0)
    }
  }

  struct Failing;

  impl Classifier for Failing {
    fn predict_proba(&self, _row: &FeatureRow) -> Result<f64, ScoringError> {
      Err(ScoringError::NonFinite)
    }
  }

  #[tokio::test]
  async fn each_submission_creates_exactly_one_row() {
    let repo = MemoryRepository::default();
    repo.upsert_user(42, "student", false).await.unwrap();
    let scorer = Scorer::new(Arc::new(Fixed(0.2)), 0.5);

    let first = submit_survey(&repo, &scorer, 42, &completed_survey()).await.unwrap();
    assert_eq!(repo.response_count(), 1);
    let second = submit_survey(&repo, &scorer, 42, &completed_survey()).await.unwrap();
    assert_eq!(repo.response_count(), 2);

    assert_ne!(first.response.id, second.response.id);
    assert!(matches!(
      first.assessment,
      Assessment::Scored {
        level: AnxietyLevel::Low,
        ..
      }
    ));
    let stored = repo.list_responses(42, ResponseOrder::OldestFirst).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].bot_rating, 5);
  }

  #[tokio::test]
  async fn response_is_saved_even_when_scoring_fails() {
    let repo = MemoryRepository::default();
    repo.upsert_user(1, "u", false).await.unwrap();

    let failed = submit_survey(&repo, &Scorer::new(Arc::new(Failing), 0.5), 1, &completed_survey())
      .await
      .unwrap();
    let missing = submit_survey(&repo, &Scorer::unavailable(), 1, &completed_survey())
      .await
      .unwrap();

    assert_eq!(failed.assessment, Assessment::Failed);
    assert_eq!(missing.assessment, Assessment::Unavailable);
    assert_eq!(repo.response_count(), 2);
  }

  #[tokio::test]
  async fn unknown_user_fails_without_scoring() {
    let repo = MemoryRepository::default();
    let result = submit_survey(&repo, &Scorer::unavailable(), 99, &completed_survey()).await;
    assert!(result.is_err());
    assert_eq!(repo.response_count(), 0);
  }
}
