use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::Duration;
use tokio::time::Instant;

/// Per-user message throttle. A user is let through at most once per `interval`.
#[derive(Clone)]
pub struct Throttle {
  next_allowed: Arc<Mutex<HashMap<i64, Instant>>>,
  interval: Duration,
}

impl Throttle {
  pub fn new(interval: Duration) -> Self {
    Self {
      next_allowed: Arc::new(Mutex::new(HashMap::new())),
      interval,
    }
  }

  /// Returns `false` while the user is still inside their window. An accepted update opens a
  /// new window; rejected ones do not extend it.
  pub async fn try_acquire(&self, user_id: i64) -> bool {
    let now = Instant::now();
    let mut next_allowed = self.next_allowed.lock().await;
    if next_allowed.get(&user_id).is_some_and(|until| now < *until) {
      return false;
    }
    next_allowed.insert(user_id, now + self.interval);
    true
  }
}
