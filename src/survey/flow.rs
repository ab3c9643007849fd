use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::survey::answers::ACTIVITY_CHOICES;
use crate::survey::answers::AGE_CHOICES;
use crate::survey::answers::ANXIETY_CHOICES;
use crate::survey::answers::ActivityLevel;
use crate::survey::answers::DIET_CHOICES;
use crate::survey::answers::FIVE_POINT_CHOICES;
use crate::survey::answers::GENDER_CHOICES;
use crate::survey::answers::GPA_CHOICES;
use crate::survey::answers::Gender;
use crate::survey::answers::Quality;
use crate::survey::answers::RELATIONSHIP_CHOICES;
use crate::survey::answers::RESIDENCE_CHOICES;
use crate::survey::answers::RelationshipStatus;
use crate::survey::answers::Residence;
use crate::survey::answers::SLEEP_CHOICES;
use crate::survey::answers::SUPPORT_CHOICES;
use crate::survey::answers::SupportLevel;
use crate::survey::answers::YES_NO_CHOICES;
use crate::survey::answers::YesNo;
use crate::survey::answers::labels;
use crate::survey::answers::translate;

const BUTTONS_HINT: &str = "Пожалуйста, выберите вариант используя кнопки ниже";
const SCALE_HINT: &str = "Пожалуйста, выберите число от 1 до 5";
const SUPPORT_HINT: &str = "Пожалуйста, выберите из: (Низкое, Среднее, Хорошее)";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SurveyStep {
  Age,
  Gender,
  Gpa,
  RelationshipStatus,
  Residence,
  StressLevel,
  FinancialStress,
  SocialSupport,
  CounselingUse,
  SleepQuality,
  DietQuality,
  PhysicalActivity,
  AnxietyScore,
  SubstanceUse,
  ChronicIllness,
  FamilyHistory,
  BotRating,
}

impl SurveyStep {
  pub const ORDER: [SurveyStep; 17] = [
    Self::Age,
    Self::Gender,
    Self::Gpa,
    Self::RelationshipStatus,
    Self::Residence,
    Self::StressLevel,
    Self::FinancialStress,
    Self::SocialSupport,
    Self::CounselingUse,
    Self::SleepQuality,
    Self::DietQuality,
    Self::PhysicalActivity,
    Self::AnxietyScore,
    Self::SubstanceUse,
    Self::ChronicIllness,
    Self::FamilyHistory,
    Self::BotRating,
  ];

  /// 1-based position in the questionnaire.
  pub fn number(self) -> usize {
    Self::ORDER.iter().position(|step| *step == self).map_or(0, |index| index + 1)
  }

  pub fn next(self) -> Option<Self> {
    Self::ORDER.get(self.number()).copied()
  }

  pub fn prompt(self) -> &'static str {
    match self {
      Self::Age => "Сколько вам лет?",
      Self::Gender => "Ваш пол:",
      Self::Gpa => "Ваш CGPA (успеваемость):",
      Self::RelationshipStatus => "Ваше семейное положение:",
      Self::Residence => "Вы проживаете в общежитии?",
      Self::StressLevel => {
        "Оцените ваш уровень стресса в данный момент времени (1: абсолютно спокоен, 5: претерпеваю высокий уровень \
         стресса):"
      },
      Self::FinancialStress => {
        "Насколько вы испытываете финансовый стресс? (1 — совсем не беспокоит, 5 — постоянный источник тревоги)"
      },
      Self::SocialSupport => "Как вы оцениваете уровень социальной поддержки в вашей жизни?",
      Self::CounselingUse => "Пользуетесь ли вы помощью психолога?",
      Self::SleepQuality => "Как вы оцениваете свое качество сна?",
      Self::DietQuality => "Как оцениваете свое питание?",
      Self::PhysicalActivity => "Оцените ваш уровень физической активности?",
      Self::AnxietyScore => "Как вы оцениваете уровень тревожности от 0 до 5?",
      Self::SubstanceUse => "Вы употребляете алкоголь/никотин?",
      Self::ChronicIllness => "Есть ли у вас хронические заболевания?",
      Self::FamilyHistory => "Есть ли в вашей семье психические заболевания?",
      Self::BotRating => "Оцените бота (1:плохо–5:восторг):",
    }
  }

  pub fn options(self) -> Vec<&'static str> {
    match self {
      Self::Age => labels(AGE_CHOICES),
      Self::Gender => labels(GENDER_CHOICES),
      Self::Gpa => labels(GPA_CHOICES),
      Self::RelationshipStatus => labels(RELATIONSHIP_CHOICES),
      Self::Residence => labels(RESIDENCE_CHOICES),
      Self::StressLevel | Self::FinancialStress | Self::BotRating => labels(FIVE_POINT_CHOICES),
      Self::SocialSupport => labels(SUPPORT_CHOICES),
      Self::SleepQuality => labels(SLEEP_CHOICES),
      Self::DietQuality => labels(DIET_CHOICES),
      Self::PhysicalActivity => labels(ACTIVITY_CHOICES),
      Self::AnxietyScore => labels(ANXIETY_CHOICES),
      Self::CounselingUse | Self::SubstanceUse | Self::ChronicIllness | Self::FamilyHistory => {
        labels(YES_NO_CHOICES)
      },
    }
  }

  pub fn invalid_hint(self) -> &'static str {
    match self {
      Self::StressLevel | Self::FinancialStress | Self::BotRating => SCALE_HINT,
      Self::SocialSupport => SUPPORT_HINT,
      _ => BUTTONS_HINT,
    }
  }
}

/// Answers collected so far, already in canonical form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SurveyAnswers {
  pub age: Option<i32>,
  pub gender: Option<Gender>,
  pub gpa: Option<f64>,
  pub relationship_status: Option<RelationshipStatus>,
  pub residence: Option<Residence>,
  pub stress_level: Option<i32>,
  pub financial_stress: Option<i32>,
  pub social_support: Option<SupportLevel>,
  pub counseling_use: Option<YesNo>,
  pub sleep_quality: Option<Quality>,
  pub diet_quality: Option<Quality>,
  pub physical_activity: Option<ActivityLevel>,
  pub anxiety_score: Option<i32>,
  pub substance_use: Option<YesNo>,
  pub chronic_illness: Option<YesNo>,
  pub family_history: Option<YesNo>,
  pub bot_rating: Option<i32>,
}

impl SurveyAnswers {
  /// Records `label` for `step`. Returns `None` when the label is not one of the step's options.
  fn record(&mut self, step: SurveyStep, label: &str) -> Option<()> {
    match step {
      SurveyStep::Age => self.age = Some(translate(AGE_CHOICES, label)?),
      SurveyStep::Gender => self.gender = Some(translate(GENDER_CHOICES, label)?),
      SurveyStep::Gpa => self.gpa = Some(translate(GPA_CHOICES, label)?),
      SurveyStep::RelationshipStatus => self.relationship_status = Some(translate(RELATIONSHIP_CHOICES, label)?),
      SurveyStep::Residence => self.residence = Some(translate(RESIDENCE_CHOICES, label)?),
      SurveyStep::StressLevel => self.stress_level = Some(translate(FIVE_POINT_CHOICES, label)?),
      SurveyStep::FinancialStress => self.financial_stress = Some(translate(FIVE_POINT_CHOICES, label)?),
      SurveyStep::SocialSupport => self.social_support = Some(translate(SUPPORT_CHOICES, label)?),
      SurveyStep::CounselingUse => self.counseling_use = Some(translate(YES_NO_CHOICES, label)?),
      SurveyStep::SleepQuality => self.sleep_quality = Some(translate(SLEEP_CHOICES, label)?),
      SurveyStep::DietQuality => self.diet_quality = Some(translate(DIET_CHOICES, label)?),
      SurveyStep::PhysicalActivity => self.physical_activity = Some(translate(ACTIVITY_CHOICES, label)?),
      SurveyStep::AnxietyScore => self.anxiety_score = Some(translate(ANXIETY_CHOICES, label)?),
      SurveyStep::SubstanceUse => self.substance_use = Some(translate(YES_NO_CHOICES, label)?),
      SurveyStep::ChronicIllness => self.chronic_illness = Some(translate(YES_NO_CHOICES, label)?),
      SurveyStep::FamilyHistory => self.family_history = Some(translate(YES_NO_CHOICES, label)?),
      SurveyStep::BotRating => self.bot_rating = Some(translate(FIVE_POINT_CHOICES, label)?),
    }
    Some(())
  }

  pub fn complete(self) -> Result<CompletedSurvey, SurveyError> {
    Ok(CompletedSurvey {
      age: self.age.ok_or(SurveyError::Incomplete(SurveyStep::Age))?,
      gender: self.gender.ok_or(SurveyError::Incomplete(SurveyStep::Gender))?,
      gpa: self.gpa.ok_or(SurveyError::Incomplete(SurveyStep::Gpa))?,
      relationship_status: self
        .relationship_status
        .ok_or(SurveyError::Incomplete(SurveyStep::RelationshipStatus))?,
      residence: self.residence.ok_or(SurveyError::Incomplete(SurveyStep::Residence))?,
      stress_level: self.stress_level.ok_or(SurveyError::Incomplete(SurveyStep::StressLevel))?,
      financial_stress: self
        .financial_stress
        .ok_or(SurveyError::Incomplete(SurveyStep::FinancialStress))?,
      social_support: self
        .social_support
        .ok_or(SurveyError::Incomplete(SurveyStep::SocialSupport))?,
      counseling_use: self
        .counseling_use
        .ok_or(SurveyError::Incomplete(SurveyStep::CounselingUse))?,
      sleep_quality: self.sleep_quality.ok_or(SurveyError::Incomplete(SurveyStep::SleepQuality))?,
      diet_quality: self.diet_quality.ok_or(SurveyError::Incomplete(SurveyStep::DietQuality))?,
      physical_activity: self
        .physical_activity
        .ok_or(SurveyError::Incomplete(SurveyStep::PhysicalActivity))?,
      anxiety_score: self.anxiety_score.ok_or(SurveyError::Incomplete(SurveyStep::AnxietyScore))?,
      substance_use: self.substance_use.ok_or(SurveyError::Incomplete(SurveyStep::SubstanceUse))?,
      chronic_illness: self
        .chronic_illness
        .ok_or(SurveyError::Incomplete(SurveyStep::ChronicIllness))?,
      family_history: self
        .family_history
        .ok_or(SurveyError::Incomplete(SurveyStep::FamilyHistory))?,
      bot_rating: self.bot_rating.ok_or(SurveyError::Incomplete(SurveyStep::BotRating))?,
    })
  }
}

/// A fully answered questionnaire.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedSurvey {
  pub age: i32,
  pub gender: Gender,
  pub gpa: f64,
  pub relationship_status: RelationshipStatus,
  pub residence: Residence,
  pub stress_level: i32,
  pub financial_stress: i32,
  pub social_support: SupportLevel,
  pub counseling_use: YesNo,
  pub sleep_quality: Quality,
  pub diet_quality: Quality,
  pub physical_activity: ActivityLevel,
  pub anxiety_score: i32,
  pub substance_use: YesNo,
  pub chronic_illness: YesNo,
  pub family_history: YesNo,
  pub bot_rating: i32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SurveyError {
  #[error("answer is not an option for step {0:?}")]
  InvalidAnswer(SurveyStep),
  #[error("survey finished without an answer for step {0:?}")]
  Incomplete(SurveyStep),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
  Next(SurveyDraft),
  Complete(CompletedSurvey),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SurveyDraft {
  pub step: SurveyStep,
  pub answers: SurveyAnswers,
}

impl Default for SurveyDraft {
  fn default() -> Self {
    Self::new()
  }
}

impl SurveyDraft {
  pub fn new() -> Self {
    Self {
      step: SurveyStep::Age,
      answers: SurveyAnswers::default(),
    }
  }

  /// Applies an answer to the current step. The draft itself is never modified; on success the
  /// caller receives the advanced draft or the finished survey.
  pub fn answer(&self, text: &str) -> Result<Progress, SurveyError> {
    let mut answers = self.answers.clone();
    answers
      .record(self.step, text)
      .ok_or(SurveyError::InvalidAnswer(self.step))?;

    match self.step.next() {
      Some(step) => Ok(Progress::Next(SurveyDraft { step, answers })),
      None => answers.complete().map(Progress::Complete),
    }
  }
}
