use serde::Deserialize;
use serde::Serialize;

use crate::survey::SurveyDraft;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "snake_case", tag = "kind", content = "data")]
pub enum ConversationState {
  #[default]
  Idle,
  Survey(SurveyDraft),
}
