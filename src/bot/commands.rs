use teloxide::types::BotCommand;
use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "snake_case", description = "Доступные команды:")]
pub enum Command {
  /// Приветствие и начало работы
  Start,
  /// Список команд
  Help,
  /// Пройти опрос
  Survey,
  /// Мои анкеты
  MySurveys,
  #[command(rename = "botinfo", hide)]
  BotInfo,
}

/// Command menu shown to every user.
pub fn public_menu() -> Vec<BotCommand> {
  vec![
    BotCommand::new("start", "👋 Начать"),
    BotCommand::new("help", "❓ Помощь"),
    BotCommand::new("survey", "📝 Пройти опрос"),
    BotCommand::new("my_surveys", "📂 Мои анкеты"),
  ]
}

/// Command menu scoped to admin chats.
pub fn admin_menu() -> Vec<BotCommand> {
  let mut commands = vec![BotCommand::new("botinfo", "ℹ️ Bot Information")];
  commands.extend(public_menu());
  commands
}

#[cfg(test)]
mod tests {
  use teloxide::utils::command::BotCommands;

  use super::Command;
  use super::admin_menu;
  use super::public_menu;

  #[test]
  fn parses_snake_case_commands() {
    assert!(matches!(Command::parse("/my_surveys", "bot"), Ok(Command::MySurveys)));
    assert!(matches!(Command::parse("/survey", "bot"), Ok(Command::Survey)));
    assert!(matches!(Command::parse("/botinfo", "bot"), Ok(Command::BotInfo)));
  }

  #[test]
  fn admin_menu_extends_public_menu() {
    let public = public_menu();
    let admin = admin_menu();
    assert_eq!(admin.len(), public.len() + 1);
    assert_eq!(admin[0].command, "botinfo");
    assert!(public.iter().all(|command| command.command != "botinfo"));
  }

  #[test]
  fn hidden_command_is_not_described() {
    let descriptions = Command::descriptions().to_string();
    assert!(descriptions.contains("/my_surveys"));
    assert!(descriptions.contains("Мои анкеты"));
    assert!(descriptions.starts_with("Доступные команды:"));
    assert!(!descriptions.contains("/botinfo"));
  }
}
