use teloxide::types::InlineKeyboardButton;
use teloxide::types::InlineKeyboardMarkup;
use teloxide::types::KeyboardButton;
use teloxide::types::KeyboardMarkup;

use crate::bot::callbacks::CallbackAction;
use crate::models::SurveyResponseRow;
use crate::scoring::Assessment;
use crate::util::format_timestamp;
use crate::util::rating_stars;

pub const START_SURVEY_BUTTON: &str = "Пройти опрос";

pub const WELCOME_TEXT: &str = r#"👋 <b>Привет!</b>

Этот бот поможет тебе лучше понять свой уровень тревожности и получить <b>персональные рекомендации</b> 🌟

🔍 <b>Что такое тревожность?</b>
Это ощущение внутреннего напряжения, беспокойства или страха, которое возникает как реакция на стрессовые ситуации.
• Умеренная тревожность — это нормально 😌
• Но если тревога мешает учёбе, сну или общению — стоит обратить на это внимание ⚠️

🧠 <b>Как это работает?</b>
Мы используем модель машинного обучения, обученную на данных студентов (<a href="https://www.kaggle.com/datasets/sonia22222/students-mental-health-assessments/data">исходные данные</a>), чтобы:
✅ Оценить твой уровень тревожности
✅ Дать персонализированные советы
✅ Помочь улучшить эмоциональное состояние 💆‍♀️

❗ <b>Важно:</b>
Результаты не являются медицинским диагнозом.
Если ты ощущаешь <b>высокий уровень тревожности</b>, пожалуйста, обратись к специалисту 👩‍⚕️

⏳ Анкета займет всего <b>2-3 минуты</b> (17 вопросов)
📊 Результат получишь <b>мгновенно</b>

<b>Готов(а) начать?</b> 🚀"#;

pub const SURVEY_INTRO_TEXT: &str = "📝 Готовы пройти опрос? Нажмите кнопку ниже, чтобы начать.";
pub const NO_SURVEYS_TEXT: &str = "У вас нет сохраненных анкет.";
pub const SURVEY_LIST_TEXT: &str = "Ваши сохраненные анкеты:";

const OPTIONS_PER_ROW: usize = 2;

pub fn start_keyboard() -> KeyboardMarkup {
  KeyboardMarkup::new(vec![vec![KeyboardButton::new(START_SURVEY_BUTTON)]])
    .resize_keyboard()
    .one_time_keyboard()
}

pub fn options_keyboard(options: &[&str]) -> KeyboardMarkup {
  let rows: Vec<Vec<KeyboardButton>> = options
    .chunks(OPTIONS_PER_ROW)
    .map(|chunk| chunk.iter().map(|option| KeyboardButton::new(*option)).collect())
    .collect();
  KeyboardMarkup::new(rows).resize_keyboard().one_time_keyboard()
}

pub fn completion_text(assessment: &Assessment) -> String {
  format!("Спасибо за прохождение опроса! {}", assessment.render())
}

pub fn survey_list_keyboard(responses: &[SurveyResponseRow]) -> InlineKeyboardMarkup {
  let rows = responses
    .iter()
    .map(|response| {
      vec![InlineKeyboardButton::callback(
        format!("Анкета от {}", format_timestamp(response.created_at)),
        CallbackAction::View(response.id).data(),
      )]
    })
    .collect::<Vec<_>>();
  InlineKeyboardMarkup::new(rows)
}

pub fn survey_detail_keyboard(response_id: i64) -> InlineKeyboardMarkup {
  InlineKeyboardMarkup::new(vec![vec![
    InlineKeyboardButton::callback("❌ Удалить", CallbackAction::Delete(response_id).data()),
    InlineKeyboardButton::callback("⬅️ Назад", CallbackAction::BackToList.data()),
  ]])
}

fn localize<'a>(table: &[(&str, &'static str)], value: &'a str) -> &'a str {
  table
    .iter()
    .find(|(canonical, _)| *canonical == value)
    .map_or(value, |(_, label)| *label)
}

const GENDER_LABELS: &[(&str, &str)] = &[("Male", "Мужской"), ("Female", "Женский")];
const RESIDENCE_LABELS: &[(&str, &str)] = &[("Yes", "Да"), ("No", "Нет"), ("WithFamily", "С семьей")];
const ACTIVITY_LABELS: &[(&str, &str)] = &[("High", "Высокая"), ("Medium", "Средняя"), ("Low", "Низкая")];
const QUALITY_LABELS: &[(&str, &str)] = &[("Good", "Хорошее"), ("Average", "Среднее"), ("Poor", "Плохое")];
const SUPPORT_LABELS: &[(&str, &str)] = &[("Strong", "Сильная"), ("Moderate", "Средняя"), ("Weak", "Слабая")];

/// HTML detail card for one saved response. `ordinal` is its 1-based position among the
/// owner's responses, oldest first.
pub fn survey_detail_text(response: &SurveyResponseRow, ordinal: Option<usize>) -> String {
  let header = ordinal.map(|n| format!("📋 <b>Анкета №{n}</b>\n")).unwrap_or_default();
  format!(
    "{header}📅 <b>Дата заполнения:</b> {date}\n\
     👤 <b>Возраст:</b> {age}\n\
     🚻 <b>Пол:</b> {gender}\n\
     🎓 <b>Успеваемость (GPA):</b> {gpa:.1}\n\
     💍 <b>Семейное положение:</b> {relationship}\n\
     🏠 <b>Проживание:</b> {residence}\n\n\
     😔 <b>Уровень стресса:</b> {stress}/5\n\
     💰 <b>Финансовый стресс:</b> {financial}/5\n\
     👥 <b>Социальная поддержка:</b> {support}\n\
     🛌 <b>Качество сна:</b> {sleep}\n\
     🏃 <b>Физическая активность:</b> {activity}\n\
     🍎 <b>Качество питания:</b> {diet}\n\
     😟 <b>Уровень тревожности:</b> {anxiety}/5\n\n\
     ⭐ <b>Оценка бота:</b> {stars}",
    date = format_timestamp(response.created_at),
    age = response.age,
    gender = localize(GENDER_LABELS, &response.gender),
    gpa = response.gpa,
    relationship = response.relationship_status,
    residence = localize(RESIDENCE_LABELS, &response.residence_type),
    stress = response.stress_level,
    financial = response.financial_stress,
    support = localize(SUPPORT_LABELS, &response.social_support),
    sleep = localize(QUALITY_LABELS, &response.sleep_quality),
    activity = localize(ACTIVITY_LABELS, &response.physical_activity),
    diet = localize(QUALITY_LABELS, &response.diet_quality),
    anxiety = response.anxiety_score,
    stars = rating_stars(response.bot_rating),
  )
}
