use std::path::Path;
use std::sync::Arc;

use tracing::error;
use tracing::info;
use tracing::warn;

use crate::survey::CompletedSurvey;

pub mod model;

pub use model::Classifier;
pub use model::FeatureRow;
pub use model::ModelArtifact;

/// Probability at or above which the high-anxiety message is shown.
pub const ANXIETY_THRESHOLD: f64 = 0.41;

const HIGH_ANXIETY_TEXT: &str = "
🔴 <b>Высокий уровень тревожности</b>

У тебя высокий уровень тревожности. Это может проявляться в:
• Навязчивых мыслях 🤯
• Постоянном напряжении 😣
• Проблемах со сном 🌙
• Ощущении усталости 😴

💡 <b>Рекомендации:</b>
→ Обратись за профессиональной поддержкой (психолог или консультант) 👩‍⚕️
→ Минимизируй источники стресса 🧘‍♀️
→ Начни с малого: дыхательные упражнения, режим сна, базовая физическая активность 🏃
→ Избегай стимуляторов (кофе, алкоголь, никотин) ☕🚭

<b>Помни:</b> Ты не один(а), и тревожность — это не слабость.
Это сигнал организма, который можно услышать и с ним работать 💪";

const LOW_ANXIETY_TEXT: &str = "
🟢 <b>Низкий уровень тревожности</b>

У тебя низкий уровень тревожности — это отличный результат! 🌟
Ты, вероятно, умеешь справляться со стрессом и сохраняешь внутреннее спокойствие даже в сложных ситуациях 😌

💡 <b>Советы для поддержания состояния:</b>
→ Поддерживай здоровые привычки (сон, питание, физическая активность) 🥗🏋️
→ Делай перерывы в учёбе/работе ⏸️
→ Развивай навыки саморегуляции и осознанности 🧠
→ Попробуй дыхательные практики или медитации для укрепления устойчивости к стрессу 🌬️

Продолжай в том же духе! 💫";

const PREDICTION_FAILED_TEXT: &str = "\n⚠️ <b>Не удалось проанализировать результаты</b>";
const MODEL_UNAVAILABLE_TEXT: &str = "\n⚠️ <b>Сервис анализа временно недоступен</b>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnxietyLevel {
  High,
  Low,
}

impl AnxietyLevel {
  pub fn from_probability(probability: f64) -> Self {
    if probability >= ANXIETY_THRESHOLD {
      Self::High
    } else {
      Self::Low
    }
  }

  fn template(self) -> &'static str {
    match self {
      Self::High => HIGH_ANXIETY_TEXT,
      Self::Low => LOW_ANXIETY_TEXT,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Assessment {
  Scored { probability: f64, level: AnxietyLevel },
  Failed,
  Unavailable,
}

impl Assessment {
  /// HTML fragment appended to the completion message.
  pub fn render(&self) -> String {
    match self {
      Self::Scored { probability, level } => format!(
        "\n🔍 <b>Результат анализа:</b>\nВероятность: {:.1}%\n{}",
        probability * 100.0,
        level.template()
      ),
      Self::Failed => PREDICTION_FAILED_TEXT.to_string(),
      Self::Unavailable => MODEL_UNAVAILABLE_TEXT.to_string(),
    }
  }
}

#[derive(Clone)]
struct LoadedModel {
  classifier: Arc<dyn Classifier>,
  artifact_threshold: f64,
}

/// Wraps the optional classifier. Scoring never fails outward; problems degrade to a notice.
#[derive(Clone)]
pub struct Scorer {
  model: Option<LoadedModel>,
}

impl Scorer {
  pub fn new(classifier: Arc<dyn Classifier>, artifact_threshold: f64) -> Self {
    Self {
      model: Some(LoadedModel {
        classifier,
        artifact_threshold,
      }),
    }
  }

  pub fn unavailable() -> Self {
    Self { model: None }
  }

  pub fn from_artifact(path: &Path) -> Self {
    match ModelArtifact::load(path) {
      Ok(artifact) => {
        info!(path = %path.display(), threshold = artifact.threshold, "loaded classifier artifact");
        Self::new(Arc::new(artifact.model), artifact.threshold)
      },
      Err(err) => {
        error!(path = %path.display(), error = %err, "failed to load classifier artifact");
        Self::unavailable()
      },
    }
  }

  pub fn is_available(&self) -> bool {
    self.model.is_some()
  }

  pub fn assess(&self, survey: &CompletedSurvey) -> Assessment {
    let Some(model) = &self.model else {
      return Assessment::Unavailable;
    };

    let row = FeatureRow::from_survey(survey);
    match model.classifier.predict_proba(&row) {
      Ok(probability) => {
        let level = AnxietyLevel::from_probability(probability);
        let prediction = u8::from(probability >= model.artifact_threshold);
        info!(probability, prediction, level = ?level, "scored survey");
        Assessment::Scored { probability, level }
      },
      Err(err) => {
        warn!(error = %err, "prediction failed");
        Assessment::Failed
      },
    }
  }
}
