use std::sync::Arc;

use anyhow::Context;
use anyhow::Result;
use anyhow::anyhow;
use teloxide::ApiError;
use teloxide::RequestError;
use teloxide::dispatching::UpdateHandler;
use teloxide::dispatching::dialogue::Dialogue;
use teloxide::dptree;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use teloxide::types::ChatId;
use teloxide::types::InlineKeyboardMarkup;
use teloxide::types::KeyboardRemove;
use teloxide::types::Message;
use teloxide::types::MessageId;
use teloxide::types::ParseMode;
use teloxide::types::User;
use teloxide::utils::command::BotCommands;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::instrument;
use tracing::warn;

use crate::bot::Command;
use crate::bot::DialogueStorage;
use crate::bot::HandlerResult;
use crate::bot::callbacks::CallbackAction;
use crate::bot::context::AppContext;
use crate::bot::render;
use crate::bot::state::ConversationState;
use crate::models::UserRow;
use crate::repo::ResponseOrder;
use crate::repo::SurveyRepository;
use crate::scoring::Scorer;
use crate::survey::CompletedSurvey;
use crate::survey::Progress;
use crate::survey::Submission;
use crate::survey::SurveyDraft;
use crate::survey::SurveyError;
use crate::survey::SurveyStep;
use crate::survey::submit_survey;

type SharedContext = Arc<AppContext>;
type BotDialogue = Dialogue<ConversationState, DialogueStorage>;

pub fn build_schema() -> UpdateHandler<anyhow::Error> {
  let message_handler = Update::filter_message()
    .filter_map(|msg: Message| msg.from.filter(|user| !is_service_account(user)))
    .filter_async(within_rate_limit)
    .filter_map_async(record_user)
    .map(user_dialogue)
    .filter_map_async(load_state)
    .branch(command_branch())
    .branch(dptree::case![ConversationState::Survey(draft)].endpoint(handle_survey_answer))
    .branch(dptree::endpoint(handle_idle_text));

  let callback_handler = Update::filter_callback_query()
    .filter_map(|query: CallbackQuery| Some(query.from).filter(|user| !is_service_account(user)))
    .filter_map_async(record_user)
    .endpoint(handle_callback_query);

  dptree::entry().branch(message_handler).branch(callback_handler)
}

fn command_branch() -> UpdateHandler<anyhow::Error> {
  dptree::entry()
    .filter_command::<Command>()
    .branch(dptree::case![Command::Start].endpoint(handle_start))
    .branch(dptree::case![Command::Help].endpoint(handle_help))
    .branch(dptree::case![Command::Survey].endpoint(handle_survey_command))
    .branch(dptree::case![Command::MySurveys].endpoint(handle_my_surveys))
    .branch(dptree::case![Command::BotInfo].endpoint(handle_bot_info))
}

/// Anonymous group admins and channel posts arrive with placeholder senders.
fn is_service_account(user: &User) -> bool {
  user.is_anonymous() || user.is_channel()
}

async fn within_rate_limit(ctx: SharedContext, user: User) -> bool {
  let allowed = ctx.throttle().try_acquire(user.id.0 as i64).await;
  if !allowed {
    debug!(user_id = user.id.0, "throttled message");
  }
  allowed
}

async fn record_user(ctx: SharedContext, user: User) -> Option<UserRow> {
  let is_admin = ctx.is_admin(user.id.0 as i64);
  match ensure_user_record(ctx.db(), &user, is_admin).await {
    Ok(row) => Some(row),
    Err(err) => {
      error!(user_id = user.id.0, error = %err, "dropping update without a user record");
      None
    },
  }
}

/// Conversation state belongs to the sender, so people sharing a group chat never see each
/// other's drafts.
fn user_dialogue(storage: Arc<DialogueStorage>, user: UserRow) -> BotDialogue {
  Dialogue::new(storage, ChatId(user.id))
}

async fn load_state(dialogue: BotDialogue) -> Option<ConversationState> {
  match dialogue.get_or_default().await {
    Ok(state) => Some(state),
    Err(err) => {
      error!(user_id = dialogue.chat_id().0, error = %err, "failed to load conversation state");
      None
    },
  }
}

#[instrument(skip(bot, dialogue, user, msg), fields(user_id = user.id))]
async fn handle_start(bot: Bot, dialogue: BotDialogue, user: UserRow, msg: Message) -> HandlerResult {
  reset_state(&dialogue).await?;
  info!(chat_id = %msg.chat.id, username = %user.username, "received /start command");
  bot
    .send_message(msg.chat.id, render::WELCOME_TEXT)
    .parse_mode(ParseMode::Html)
    .reply_markup(render::start_keyboard())
    .await?;
  Ok(())
}

#[instrument(skip(bot, msg))]
async fn handle_help(bot: Bot, msg: Message) -> HandlerResult {
  info!(chat_id = %msg.chat.id, "received /help command");
  let mut text = Command::descriptions().to_string();
  text.push_str("\n\n/survey запускает опрос, /my_surveys показывает сохраненные анкеты.");
  bot.send_message(msg.chat.id, text).await?;
  Ok(())
}

#[instrument(skip(bot, dialogue, user, msg), fields(user_id = user.id))]
async fn handle_survey_command(bot: Bot, dialogue: BotDialogue, user: UserRow, msg: Message) -> HandlerResult {
  reset_state(&dialogue).await?;
  info!(chat_id = %msg.chat.id, "received /survey command");
  bot
    .send_message(msg.chat.id, render::SURVEY_INTRO_TEXT)
    .reply_markup(render::start_keyboard())
    .await?;
  Ok(())
}

#[instrument(skip(bot, ctx, user, msg), fields(user_id = user.id))]
async fn handle_my_surveys(bot: Bot, ctx: SharedContext, user: UserRow, msg: Message) -> HandlerResult {
  info!(chat_id = %msg.chat.id, "received /my_surveys command");
  send_survey_list(&bot, &ctx, msg.chat.id, user.id).await
}

#[instrument(skip(bot, ctx, user, msg), fields(user_id = user.id))]
async fn handle_bot_info(bot: Bot, ctx: SharedContext, user: UserRow, msg: Message) -> HandlerResult {
  if !user.is_admin {
    info!("non-admin requested /botinfo");
    bot.send_message(msg.chat.id, "🛡️ Только для администраторов.").await?;
    return Ok(());
  }

  let users = ctx.db().count_users().await?;
  let responses = ctx.db().count_responses().await?;
  let model_status = if ctx.scorer().is_available() {
    "загружена"
  } else {
    "недоступна"
  };
  bot
    .send_message(
      msg.chat.id,
      format!("ℹ️ Bot Information\n\n👥 Пользователей: {users}\n📝 Анкет: {responses}\n🧠 Модель: {model_status}"),
    )
    .await?;
  Ok(())
}

#[instrument(skip(bot, dialogue, user, msg), fields(user_id = user.id))]
async fn handle_idle_text(bot: Bot, dialogue: BotDialogue, user: UserRow, msg: Message) -> HandlerResult {
  let Some(text) = msg.text() else {
    return Ok(());
  };

  if text == render::START_SURVEY_BUTTON {
    info!(chat_id = %msg.chat.id, "starting survey");
    let draft = SurveyDraft::new();
    let first_step = draft.step;
    set_state(&dialogue, ConversationState::Survey(draft)).await?;
    return ask(&bot, msg.chat.id, first_step).await;
  }

  // unknown commands are dropped silently
  if text.starts_with('/') {
    return Ok(());
  }

  info!(chat_id = %msg.chat.id, "idle state received unrecognized message");
  bot
    .send_message(msg.chat.id, "Я не понял сообщение. Используйте /survey, чтобы пройти опрос, или /help.")
    .await?;
  Ok(())
}

#[instrument(skip(bot, dialogue, ctx, user, msg, draft), fields(user_id = user.id, step = ?draft.step))]
async fn handle_survey_answer(
  bot: Bot,
  dialogue: BotDialogue,
  ctx: SharedContext,
  user: UserRow,
  msg: Message,
  draft: SurveyDraft,
) -> HandlerResult {
  let chat_id = msg.chat.id;
  let text = msg.text().unwrap_or_default();

  match draft.answer(text) {
    Ok(Progress::Next(next)) => {
      let step = next.step;
      set_state(&dialogue, ConversationState::Survey(next)).await?;
      info!(chat_id = %chat_id, step = step.number(), "survey advanced");
      ask(&bot, chat_id, step).await
    },
    Ok(Progress::Complete(survey)) => {
      let submission = finish_survey(ctx.db(), ctx.scorer(), &dialogue, user.id, &survey).await?;
      info!(chat_id = %chat_id, response_id = submission.response.id, "survey completed");
      bot
        .send_message(chat_id, render::completion_text(&submission.assessment))
        .parse_mode(ParseMode::Html)
        .reply_markup(KeyboardRemove::new())
        .await?;
      Ok(())
    },
    Err(SurveyError::InvalidAnswer(step)) => {
      info!(chat_id = %chat_id, step = step.number(), "rejected survey answer");
      bot.send_message(chat_id, step.invalid_hint()).await?;
      Ok(())
    },
    Err(err @ SurveyError::Incomplete(_)) => {
      warn!(chat_id = %chat_id, error = %err, "survey draft lost answers, restarting");
      reset_state(&dialogue).await?;
      bot
        .send_message(chat_id, "⚠️ Не удалось завершить опрос. Пожалуйста, начните заново.")
        .reply_markup(render::start_keyboard())
        .await?;
      Ok(())
    },
  }
}

/// Stores the survey and closes the dialogue before anything is sent back, so a failed reply
/// cannot leave a finished draft behind to be submitted a second time.
async fn finish_survey<R: SurveyRepository>(
  repo: &R,
  scorer: &Scorer,
  dialogue: &BotDialogue,
  user_id: i64,
  survey: &CompletedSurvey,
) -> Result<Submission> {
  let submission = submit_survey(repo, scorer, user_id, survey).await?;
  clear_state(dialogue).await?;
  Ok(submission)
}

async fn ask(bot: &Bot, chat: ChatId, step: SurveyStep) -> HandlerResult {
  bot
    .send_message(chat, step.prompt())
    .reply_markup(render::options_keyboard(&step.options()))
    .await?;
  Ok(())
}

#[instrument(skip(bot, ctx, user, query), fields(user_id = user.id))]
async fn handle_callback_query(bot: Bot, ctx: SharedContext, user: UserRow, query: CallbackQuery) -> HandlerResult {
  let message_ctx = query.message.as_ref().map(|message| (message.chat().id, message.id()));
  let callback_data = query.data.as_deref().unwrap_or("<empty>");
  info!(callback = callback_data, "handling callback query");

  let mut alert: Option<&str> = None;
  match CallbackAction::parse(callback_data) {
    Some(CallbackAction::View(response_id)) => {
      let response = ctx.db().get_response(response_id).await?;
      match (response, message_ctx) {
        (Some(response), Some((chat_id, message_id))) if response.user_id == user.id => {
          let ordinal = ctx
            .db()
            .list_responses(user.id, ResponseOrder::OldestFirst)
            .await?
            .iter()
            .position(|candidate| candidate.id == response.id)
            .map(|index| index + 1);
          let text = render::survey_detail_text(&response, ordinal);
          edit_or_ignore(
            &bot,
            chat_id,
            message_id,
            text,
            Some(render::survey_detail_keyboard(response.id)),
          )
          .await?;
        },
        (Some(_), None) => {},
        _ => {
          info!(response_id, "survey not found for viewer");
          alert = Some("⚠️ Анкета не найдена");
        },
      }
    },
    Some(CallbackAction::Delete(response_id)) => {
      if ctx.db().delete_response(response_id, user.id).await? {
        info!(response_id, "deleted survey response");
        alert = Some("✅ Анкета удалена");
        if let Some((chat_id, message_id)) = message_ctx {
          show_survey_list(&bot, &ctx, chat_id, message_id, user.id).await?;
        }
      } else {
        info!(response_id, "survey delete rejected");
        alert = Some("❌ Не удалось удалить анкету");
      }
    },
    Some(CallbackAction::BackToList) => {
      if let Some((chat_id, message_id)) = message_ctx {
        show_survey_list(&bot, &ctx, chat_id, message_id, user.id).await?;
      }
    },
    None => warn!(callback = callback_data, "unrecognized callback data"),
  }

  match alert {
    Some(text) => bot.answer_callback_query(query.id).text(text).show_alert(true).await?,
    None => bot.answer_callback_query(query.id).await?,
  };
  Ok(())
}

#[instrument(skip(bot, ctx))]
async fn send_survey_list(bot: &Bot, ctx: &SharedContext, chat: ChatId, user_id: i64) -> HandlerResult {
  let responses = ctx.db().list_responses(user_id, ResponseOrder::NewestFirst).await?;
  if responses.is_empty() {
    info!(user_id, chat_id = %chat, "no saved surveys to display");
    bot.send_message(chat, render::NO_SURVEYS_TEXT).await?;
    return Ok(());
  }

  info!(user_id, chat_id = %chat, count = responses.len(), "sending survey list");
  bot
    .send_message(chat, render::SURVEY_LIST_TEXT)
    .reply_markup(render::survey_list_keyboard(&responses))
    .await?;
  Ok(())
}

#[instrument(skip(bot, ctx))]
async fn show_survey_list(
  bot: &Bot,
  ctx: &SharedContext,
  chat: ChatId,
  message_id: MessageId,
  user_id: i64,
) -> HandlerResult {
  let responses = ctx.db().list_responses(user_id, ResponseOrder::NewestFirst).await?;
  if responses.is_empty() {
    return edit_or_ignore(bot, chat, message_id, render::NO_SURVEYS_TEXT.to_string(), None).await;
  }
  edit_or_ignore(
    bot,
    chat,
    message_id,
    render::SURVEY_LIST_TEXT.to_string(),
    Some(render::survey_list_keyboard(&responses)),
  )
  .await
}

async fn edit_or_ignore(
  bot: &Bot,
  chat: ChatId,
  message_id: MessageId,
  text: String,
  keyboard: Option<InlineKeyboardMarkup>,
) -> HandlerResult {
  let request = bot
    .edit_message_text(chat, message_id, text)
    .parse_mode(ParseMode::Html)
    .reply_markup(keyboard.unwrap_or_default());
  match request.await {
    Ok(_) => info!(chat_id = %chat, message_id = %message_id, "updated survey message"),
    Err(RequestError::Api(ApiError::MessageNotModified)) => {
      info!(chat_id = %chat, message_id = %message_id, "survey message already current");
    },
    Err(err) => return Err(err.into()),
  }
  Ok(())
}

/// Inserts or refreshes the sender's row. Users without a username are stored under their id.
async fn ensure_user_record<R: SurveyRepository>(repo: &R, user: &User, is_admin: bool) -> Result<UserRow> {
  let id = user.id.0 as i64;
  let username = user.username.clone().unwrap_or_else(|| id.to_string());
  repo
    .upsert_user(id, &username, is_admin)
    .await
    .context("failed to upsert user record")
}

async fn set_state(dialogue: &BotDialogue, state: ConversationState) -> Result<()> {
  dialogue.update(state).await.map_err(|err| anyhow!(err))
}

async fn reset_state(dialogue: &BotDialogue) -> Result<()> {
  dialogue.reset().await.map_err(|err| anyhow!(err))
}

async fn clear_state(dialogue: &BotDialogue) -> Result<()> {
  dialogue.exit().await.map_err(|err| anyhow!(err))
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use chrono::Utc;
  use serde_json::json;
  use teloxide::dispatching::dialogue::InMemStorage;
  use teloxide::dispatching::dialogue::Storage;
  use teloxide::types::User;

  use super::BotDialogue;
  use super::ensure_user_record;
  use super::finish_survey;
  use super::user_dialogue;
  use crate::bot::DialogueStorage;
  use crate::bot::state::ConversationState;
  use crate::models::UserRow;
  use crate::repo::SurveyRepository;
  use crate::repo::memory::MemoryRepository;
  use crate::scoring::Scorer;
  use crate::survey::Progress;
  use crate::survey::SurveyDraft;
  use crate::survey::flow::tests::completed_survey;

  fn storage() -> Arc<DialogueStorage> {
    InMemStorage::<ConversationState>::new().erase()
  }

  fn user_row(id: i64) -> UserRow {
    UserRow {
      id,
      username: format!("user{id}"),
      is_admin: false,
      created_at: Utc::now(),
    }
  }

  fn telegram_user(id: u64, username: Option<&str>) -> User {
    serde_json::from_value(json!({
      "id": id,
      "is_bot": false,
      "first_name": "Student",
      "username": username,
    }))
    .unwrap()
  }

  #[tokio::test]
  async fn group_members_do_not_share_a_draft() {
    let storage = storage();
    let owner: BotDialogue = user_dialogue(storage.clone(), user_row(111));
    let Ok(Progress::Next(draft)) = SurveyDraft::new().answer("21–23") else {
      panic!("expected next step");
    };
    owner.update(ConversationState::Survey(draft)).await.unwrap();

    let neighbour = user_dialogue(storage.clone(), user_row(222));
    assert_eq!(neighbour.get_or_default().await.unwrap(), ConversationState::Idle);
    assert!(matches!(owner.get().await.unwrap(), Some(ConversationState::Survey(_))));
  }

  #[tokio::test]
  async fn finishing_clears_the_draft_and_stores_one_row() {
    let repo = MemoryRepository::default();
    repo.upsert_user(111, "student", false).await.unwrap();
    let dialogue = user_dialogue(storage(), user_row(111));
    dialogue.update(ConversationState::Survey(SurveyDraft::new())).await.unwrap();

    let submission = finish_survey(&repo, &Scorer::unavailable(), &dialogue, 111, &completed_survey())
      .await
      .unwrap();

    assert_eq!(submission.response.user_id, 111);
    assert_eq!(repo.response_count(), 1);
    assert_eq!(dialogue.get().await.unwrap(), None);
  }

  #[tokio::test]
  async fn failed_store_keeps_the_draft() {
    let repo = MemoryRepository::default();
    let dialogue = user_dialogue(storage(), user_row(5));
    dialogue.update(ConversationState::Survey(SurveyDraft::new())).await.unwrap();

    let result = finish_survey(&repo, &Scorer::unavailable(), &dialogue, 5, &completed_survey()).await;

    assert!(result.is_err());
    assert!(matches!(dialogue.get().await.unwrap(), Some(ConversationState::Survey(_))));
  }

  #[tokio::test]
  async fn sender_record_is_created_then_refreshed() {
    let repo = MemoryRepository::default();

    let first = ensure_user_record(&repo, &telegram_user(42, None), false).await.unwrap();
    assert_eq!(first.username, "42");

    let second = ensure_user_record(&repo, &telegram_user(42, Some("alice")), true)
      .await
      .unwrap();
    assert_eq!(second.username, "alice");
    assert!(second.is_admin);
    assert_eq!(repo.user_count(), 1);
  }
}
