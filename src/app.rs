use std::sync::Arc;

use anyhow::Context;
use futures::future::join_all;
use teloxide::dispatching::UpdateHandler;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::dispatching::dialogue::RedisStorage;
use teloxide::dispatching::dialogue::Storage;
use teloxide::dispatching::dialogue::serializer::Json;
use teloxide::dptree;
use teloxide::prelude::*;
use teloxide::types::BotCommandScope;
use teloxide::types::Recipient;
use tracing::info;
use tracing::warn;

use crate::bot;
use crate::bot::AppContext;
use crate::bot::DialogueStorage;
use crate::bot::commands::admin_menu;
use crate::bot::commands::public_menu;
use crate::bot::state::ConversationState;
use crate::bot::throttle::Throttle;
use crate::config::Config;
use crate::config::RedisConfig;
use crate::db::Db;
use crate::scoring::Scorer;

pub struct App {
  bot: Bot,
  context: Arc<AppContext>,
  handler: UpdateHandler<anyhow::Error>,
  admins: Vec<i64>,
  redis: Option<RedisConfig>,
  drop_pending_updates: bool,
}

impl App {
  pub fn new(bot: Bot, db: Db, scorer: Scorer, config: Config) -> Self {
    let throttle = Throttle::new(config.rate_limit);
    let context = Arc::new(AppContext::new(db, config.admins.clone(), scorer, throttle));
    let handler = bot::build_schema();
    Self {
      bot,
      context,
      handler,
      admins: config.admins,
      redis: config.redis,
      drop_pending_updates: config.drop_pending_updates,
    }
  }

  pub async fn run(self) -> anyhow::Result<()> {
    let storage = open_storage(self.redis.as_ref()).await?;

    if self.drop_pending_updates {
      self.bot.delete_webhook().drop_pending_updates(true).await?;
      info!("dropped pending updates");
    }
    register_commands(&self.bot, &self.admins).await;

    let me = self.bot.get_me().await?;

    Dispatcher::builder(self.bot.clone(), self.handler)
      .dependencies(dptree::deps![self.context.clone(), storage.clone(), me])
      .enable_ctrlc_handler()
      .build()
      .dispatch()
      .await;

    Ok(())
  }
}

async fn open_storage(redis: Option<&RedisConfig>) -> anyhow::Result<Arc<DialogueStorage>> {
  match redis {
    Some(redis) => {
      let storage = RedisStorage::open(&redis.url()?, Json)
        .await
        .context("failed to open redis dialogue storage")?;
      info!(host = %redis.ip, port = redis.port, "using redis dialogue storage");
      Ok(storage.erase())
    },
    None => {
      info!("using in-memory dialogue storage");
      Ok(InMemStorage::<ConversationState>::new().erase())
    },
  }
}

/// Command menus are cosmetic; failures are logged and startup continues.
async fn register_commands(bot: &Bot, admins: &[i64]) {
  if let Err(err) = bot.set_my_commands(public_menu()).await {
    warn!(error = %err, "failed to register default command menu");
  }

  let results = join_all(admins.iter().map(|admin_id| {
    bot
      .set_my_commands(admin_menu())
      .scope(BotCommandScope::Chat {
        chat_id: Recipient::Id(ChatId(*admin_id)),
      })
      .into_future()
  }))
  .await;

  for (admin_id, result) in admins.iter().zip(results) {
    if let Err(err) = result {
      warn!(admin_id, error = %err, "failed to register admin command menu");
    }
  }
}
