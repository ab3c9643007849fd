mod app;
mod bot;
mod config;
mod db;
mod models;
mod repo;
mod scoring;
mod survey;
mod telemetry;
mod util;

use anyhow::Result;
use teloxide::prelude::Bot;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
  telemetry::init()?;
  let config = config::Config::from_env()?;
  let admin_count = config.admins.len();
  info!(admin_count = admin_count, "starting bot");

  let scorer = scoring::Scorer::from_artifact(&config.model_path);
  if !scorer.is_available() {
    info!("survey results will be sent without a prediction");
  }

  let bot = Bot::new(config.bot_token.clone());
  let db = db::Db::connect(&config.database_url).await?;
  let app = app::App::new(bot, db, scorer, config);
  app.run().await
}
