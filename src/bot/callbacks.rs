use once_cell::sync::Lazy;
use regex::Regex;

static SURVEY_ACTION_PATTERN: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^(view|delete)_survey_(\d+)$").expect("valid regex"));

const BACK_TO_SURVEYS: &str = "back_to_surveys";

/// Inline-button payloads for the saved-survey browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
  View(i64),
  Delete(i64),
  BackToList,
}

impl CallbackAction {
  pub fn parse(data: &str) -> Option<Self> {
    if data == BACK_TO_SURVEYS {
      return Some(Self::BackToList);
    }
    let captures = SURVEY_ACTION_PATTERN.captures(data)?;
    let id = captures[2].parse::<i64>().ok()?;
    match &captures[1] {
      "view" => Some(Self::View(id)),
      "delete" => Some(Self::Delete(id)),
      _ => None,
    }
  }

  pub fn data(self) -> String {
    match self {
      Self::View(id) => format!("view_survey_{id}"),
      Self::Delete(id) => format!("delete_survey_{id}"),
      Self::BackToList => BACK_TO_SURVEYS.to_string(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::CallbackAction;

  #[test]
  fn parses_known_actions() {
    assert_eq!(CallbackAction::parse("view_survey_12"), Some(CallbackAction::View(12)));
    assert_eq!(CallbackAction::parse("delete_survey_3"), Some(CallbackAction::Delete(3)));
    assert_eq!(CallbackAction::parse("back_to_surveys"), Some(CallbackAction::BackToList));
  }

  #[test]
  fn rejects_malformed_data() {
    assert_eq!(CallbackAction::parse("view_survey_"), None);
    assert_eq!(CallbackAction::parse("view_survey_-1"), None);
    assert_eq!(CallbackAction::parse("edit_survey_1"), None);
    assert_eq!(CallbackAction::parse("view_survey_99999999999999999999"), None);
    assert_eq!(CallbackAction::parse(""), None);
  }

  #[test]
  fn data_matches_parse() {
    for action in [CallbackAction::View(8), CallbackAction::Delete(8), CallbackAction::BackToList] {
      assert_eq!(CallbackAction::parse(&action.data()), Some(action));
    }
  }
}
