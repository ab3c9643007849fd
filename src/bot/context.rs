use std::collections::HashSet;

use crate::bot::throttle::Throttle;
use crate::db::Db;
use crate::scoring::Scorer;

#[derive(Clone)]
pub struct AppContext {
  db: Db,
  admins: HashSet<i64>,
  scorer: Scorer,
  throttle: Throttle,
}

impl AppContext {
  pub fn new(db: Db, admins: Vec<i64>, scorer: Scorer, throttle: Throttle) -> Self {
    Self {
      db,
      admins: admins.into_iter().collect(),
      scorer,
      throttle,
    }
  }

  pub fn db(&self) -> &Db {
    &self.db
  }

  pub fn scorer(&self) -> &Scorer {
    &self.scorer
  }

  pub fn throttle(&self) -> &Throttle {
    &self.throttle
  }

  pub fn is_admin(&self, tg_id: i64) -> bool {
    self.admins.contains(&tg_id)
  }
}
