//! Button labels shown to the user and the canonical values they translate to.

use serde::Deserialize;
use serde::Serialize;

pub type Choices<T> = &'static [(&'static str, T)];

pub const AGE_CHOICES: Choices<i32> = &[("18–20", 19), ("21–23", 22), ("24–26", 25), ("27–29", 28), ("30+", 30)];

pub const GENDER_CHOICES: Choices<Gender> = &[("Мужской", Gender::Male), ("Женский", Gender::Female)];

pub const GPA_CHOICES: Choices<f64> = &[
  ("< 2.0", 1.0),
  ("2.0–2.5", 2.25),
  ("2.6–3.0", 2.8),
  ("3.1–3.5", 3.3),
  ("3.6–4.0", 3.8),
];

pub const RELATIONSHIP_CHOICES: Choices<RelationshipStatus> = &[
  ("Холост/не замужем", RelationshipStatus::Single),
  ("В отношениях", RelationshipStatus::InRelationship),
  ("Женат/замужем", RelationshipStatus::Married),
];

pub const RESIDENCE_CHOICES: Choices<Residence> = &[
  ("Да", Residence::Dormitory),
  ("Нет", Residence::OffCampus),
  ("Живу с семьей", Residence::WithFamily),
];

pub const FIVE_POINT_CHOICES: Choices<i32> = &[("1", 1), ("2", 2), ("3", 3), ("4", 4), ("5", 5)];

pub const ANXIETY_CHOICES: Choices<i32> = &[("0", 0), ("1", 1), ("2", 2), ("3", 3), ("4", 4), ("5", 5)];

pub const SUPPORT_CHOICES: Choices<SupportLevel> = &[
  ("Низкое", SupportLevel::Weak),
  ("Среднее", SupportLevel::Moderate),
  ("Хорошее", SupportLevel::Strong),
];

pub const SLEEP_CHOICES: Choices<Quality> =
  &[("Низкое", Quality::Poor), ("Среднее", Quality::Average), ("Хорошее", Quality::Good)];

pub const DIET_CHOICES: Choices<Quality> =
  &[("Плохо", Quality::Poor), ("Средне", Quality::Average), ("Хорошо", Quality::Good)];

pub const ACTIVITY_CHOICES: Choices<ActivityLevel> = &[
  ("Высокий", ActivityLevel::High),
  ("Средний", ActivityLevel::Medium),
  ("Низкий", ActivityLevel::Low),
];

pub const YES_NO_CHOICES: Choices<YesNo> = &[("Да", YesNo::Yes), ("Нет", YesNo::No)];

/// Looks up the canonical value behind a button label. Labels match exactly.
pub fn translate<T: Copy>(choices: &[(&str, T)], label: &str) -> Option<T> {
  choices
    .iter()
    .find(|(candidate, _)| *candidate == label)
    .map(|(_, value)| *value)
}

pub fn labels<T>(choices: &[(&'static str, T)]) -> Vec<&'static str> {
  choices.iter().map(|(label, _)| *label).collect()
}

/// The English keyword the classifier was trained on.
pub trait Canonical: Copy {
  fn canonical(self) -> &'static str;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Gender {
  Male,
  Female,
}

impl Canonical for Gender {
  fn canonical(self) -> &'static str {
    match self {
      Self::Male => "Male",
      Self::Female => "Female",
    }
  }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RelationshipStatus {
  Single,
  InRelationship,
  Married,
}

impl Canonical for RelationshipStatus {
  fn canonical(self) -> &'static str {
    match self {
      Self::Single => "Single",
      Self::InRelationship => "InaRelationship",
      Self::Married => "Married",
    }
  }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Residence {
  Dormitory,
  OffCampus,
  WithFamily,
}

impl Canonical for Residence {
  fn canonical(self) -> &'static str {
    match self {
      Self::Dormitory => "Yes",
      Self::OffCampus => "No",
      Self::WithFamily => "WithFamily",
    }
  }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SupportLevel {
  Weak,
  Moderate,
  Strong,
}

impl Canonical for SupportLevel {
  fn canonical(self) -> &'static str {
    match self {
      Self::Weak => "Weak",
      Self::Moderate => "Moderate",
      Self::Strong => "Strong",
    }
  }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Quality {
  Poor,
  Average,
  Good,
}

impl Canonical for Quality {
  fn canonical(self) -> &'static str {
    match self {
      Self::Poor => "Poor",
      Self::Average => "Average",
      Self::Good => "Good",
    }
  }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActivityLevel {
  High,
  Medium,
  Low,
}

impl Canonical for ActivityLevel {
  fn canonical(self) -> &'static str {
    match self {
      Self::High => "High",
      Self::Medium => "Medium",
      Self::Low => "Low",
    }
  }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum YesNo {
  Yes,
  No,
}

impl Canonical for YesNo {
  fn canonical(self) -> &'static str {
    match self {
      Self::Yes => "Yes",
      Self::No => "No",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn translates_known_labels() {
    assert_eq!(translate(AGE_CHOICES, "24–26"), Some(25));
    assert_eq!(translate(GENDER_CHOICES, "Мужской"), Some(Gender::Male));
    assert_eq!(translate(GPA_CHOICES, "2.0–2.5"), Some(2.25));
    assert_eq!(translate(RESIDENCE_CHOICES, "Живу с семьей"), Some(Residence::WithFamily));
  }

  #[test]
  fn rejects_unknown_and_near_miss_labels() {
    assert_eq!(translate(AGE_CHOICES, "18-20"), None);
    assert_eq!(translate(GENDER_CHOICES, "Мужчина"), None);
    assert_eq!(translate(YES_NO_CHOICES, "да"), None);
    assert_eq!(translate(FIVE_POINT_CHOICES, "0"), None);
  }

  #[test]
  fn sleep_and_diet_share_values_but_not_labels() {
    assert_eq!(translate(SLEEP_CHOICES, "Хорошее"), Some(Quality::Good));
    assert_eq!(translate(DIET_CHOICES, "Хорошее"), None);
    assert_eq!(translate(DIET_CHOICES, "Хорошо"), Some(Quality::Good));
  }

  #[test]
  fn canonical_keywords_match_training_vocabulary() {
    assert_eq!(RelationshipStatus::InRelationship.canonical(), "InaRelationship");
    assert_eq!(Residence::Dormitory.canonical(), "Yes");
    assert_eq!(SupportLevel::Moderate.canonical(), "Moderate");
    assert_eq!(ActivityLevel::Low.canonical(), "Low");
  }

  #[test]
  fn labels_preserve_declaration_order() {
    assert_eq!(labels(ACTIVITY_CHOICES), vec!["Высокий", "Средний", "Низкий"]);
  }
}
