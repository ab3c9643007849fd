use anyhow::Result;
use sqlx::Pool;
use sqlx::Postgres;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use tracing::error;
use tracing::instrument;
use tracing::warn;

use crate::models::NewSurveyResponse;
use crate::models::SurveyResponseRow;
use crate::models::UserRow;
use crate::repo::ResponseOrder;
use crate::repo::SurveyRepository;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const RESPONSE_COLUMNS: &str = "id, user_id, created_at, age, gender, course, gpa, stress_level, anxiety_score, \
                                sleep_quality, physical_activity, diet_quality, social_support, relationship_status, \
                                substance_use, counseling_service_use, family_history, chronic_illness, \
                                financial_stress, extracurricular_involvement, semester_credit_load, residence_type, \
                                bot_rating";

#[derive(Clone)]
pub struct Db {
  pool: Pool<Postgres>,
}

impl Db {
  pub async fn connect(database_url: &str) -> Result<Self> {
    let pool = PgPoolOptions::new().max_connections(10).connect(database_url).await?;
    MIGRATOR.run(&pool).await?;
    Ok(Self { pool })
  }

  #[instrument(skip(self))]
  pub async fn count_users(&self) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
      .fetch_one(&self.pool)
      .await?;
    Ok(count)
  }

  #[instrument(skip(self))]
  pub async fn count_responses(&self) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM survey_responses")
      .fetch_one(&self.pool)
      .await?;
    Ok(count)
  }
}

impl SurveyRepository for Db {
  #[instrument(skip(self))]
  async fn upsert_user(&self, id: i64, username: &str, is_admin: bool) -> Result<UserRow> {
    let mut tx = self.pool.begin().await?;
    let result = sqlx::query_as::<_, UserRow>(
      r#"
      INSERT INTO users (id, username, is_admin)
      VALUES ($1, $2, $3)
      ON CONFLICT (id) DO UPDATE SET
        username = EXCLUDED.username,
        is_admin = EXCLUDED.is_admin
      RETURNING id, username, is_admin, created_at
      "#,
    )
    .bind(id)
    .bind(username)
    .bind(is_admin)
    .fetch_one(&mut *tx)
    .await;

    match result {
      Ok(user) => {
        tx.commit().await?;
        Ok(user)
      },
      Err(err) => {
        if let Err(rollback_err) = tx.rollback().await {
          warn!(user_id = id, error = %rollback_err, "failed to roll back user upsert");
        }
        error!(user_id = id, error = %err, "failed to upsert user");
        Err(err.into())
      },
    }
  }

  #[instrument(skip(self, response), fields(user_id = response.user_id))]
  async fn create_response(&self, response: &NewSurveyResponse) -> Result<SurveyResponseRow> {
    let sql = format!(
      r#"
      INSERT INTO survey_responses (
        user_id, age, gender, course, gpa, stress_level, anxiety_score, sleep_quality,
        physical_activity, diet_quality, social_support, relationship_status, substance_use,
        counseling_service_use, family_history, chronic_illness, financial_stress,
        extracurricular_involvement, semester_credit_load, residence_type, bot_rating
      )
      VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21)
      RETURNING {RESPONSE_COLUMNS}
      "#
    );
    let row = sqlx::query_as::<_, SurveyResponseRow>(&sql)
      .bind(response.user_id)
      .bind(response.age)
      .bind(response.gender)
      .bind(response.course)
      .bind(response.gpa)
      .bind(response.stress_level)
      .bind(response.anxiety_score)
      .bind(response.sleep_quality)
      .bind(response.physical_activity)
      .bind(response.diet_quality)
      .bind(response.social_support)
      .bind(response.relationship_status)
      .bind(response.substance_use)
      .bind(response.counseling_service_use)
      .bind(response.family_history)
      .bind(response.chronic_illness)
      .bind(response.financial_stress)
      .bind(response.extracurricular_involvement)
      .bind(response.semester_credit_load)
      .bind(response.residence_type)
      .bind(response.bot_rating)
      .fetch_one(&self.pool)
      .await?;
    Ok(row)
  }

  #[instrument(skip(self))]
  async fn list_responses(&self, user_id: i64, order: ResponseOrder) -> Result<Vec<SurveyResponseRow>> {
    let direction = order.sql();
    let sql = format!(
      "SELECT {RESPONSE_COLUMNS} FROM survey_responses WHERE user_id = $1 ORDER BY created_at {direction}, id \
       {direction}"
    );
    let rows = sqlx::query_as::<_, SurveyResponseRow>(&sql)
      .bind(user_id)
      .fetch_all(&self.pool)
      .await?;
    Ok(rows)
  }

  #[instrument(skip(self))]
  async fn get_response(&self, response_id: i64) -> Result<Option<SurveyResponseRow>> {
    let sql = format!("SELECT {RESPONSE_COLUMNS} FROM survey_responses WHERE id = $1");
    let row = sqlx::query_as::<_, SurveyResponseRow>(&sql)
      .bind(response_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(row)
  }

  #[instrument(skip(self))]
  async fn delete_response(&self, response_id: i64, owner_id: i64) -> Result<bool> {
    let deleted = sqlx::query_scalar::<_, i64>(
      "DELETE FROM survey_responses WHERE id = $1 AND user_id = $2 RETURNING id",
    )
    .bind(response_id)
    .bind(owner_id)
    .fetch_optional(&self.pool)
    .await?;
    Ok(deleted.is_some())
  }
}
