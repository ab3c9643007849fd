use anyhow::Result;

use crate::models::NewSurveyResponse;
use crate::models::SurveyResponseRow;
use crate::models::UserRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOrder {
  OldestFirst,
  NewestFirst,
}

impl ResponseOrder {
  pub fn sql(self) -> &'static str {
    match self {
      Self::OldestFirst => "ASC",
      Self::NewestFirst => "DESC",
    }
  }
}

/// Storage for users and their survey responses.
#[allow(async_fn_in_trait)]
pub trait SurveyRepository {
  /// Inserts the user or refreshes `username` and `is_admin` on an existing row.
  async fn upsert_user(&self, id: i64, username: &str, is_admin: bool) -> Result<UserRow>;

  async fn create_response(&self, response: &NewSurveyResponse) -> Result<SurveyResponseRow>;

  async fn list_responses(&self, user_id: i64, order: ResponseOrder) -> Result<Vec<SurveyResponseRow>>;

  async fn get_response(&self, response_id: i64) -> Result<Option<SurveyResponseRow>>;

  /// Deletes only when `owner_id` owns the response. Returns whether a row was removed.
  async fn delete_response(&self, response_id: i64, owner_id: i64) -> Result<bool>;
}
