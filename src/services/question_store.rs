use std::time::Instant;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Durable storage of questions grouped by topic.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Stores `questions` under `topic`, keeping their order. No deduplication.
    async fn upload_questions(&self, questions: &[String], topic: &str) -> AppResult<()>;

    async fn is_healthy(&self) -> bool {
        true
    }
}

pub struct PgQuestionStore {
    pool: PgPool,
}

impl PgQuestionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Builds a lazily connecting pool; no connection is opened until first use.
    pub fn connect_lazy(config: &Config) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect_lazy(&config.database_url)?;
        Ok(Self::new(pool))
    }

    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        info!("Applying database migrations");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl QuestionStore for PgQuestionStore {
    async fn upload_questions(&self, questions: &[String], topic: &str) -> AppResult<()> {
        let start = Instant::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO topics (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(topic)
            .execute(&mut *tx)
            .await?;

        for (position, question) in questions.iter().enumerate() {
            let position = i32::try_from(position)
                .map_err(|_| AppError::persistence("Too many questions in one upload"))?;
            sqlx::query("INSERT INTO questions (topic, question, position) VALUES ($1, $2, $3)")
                .bind(topic)
                .bind(question)
                .bind(position)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        info!(
            topic = %topic,
            question_count = questions.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Questions stored"
        );
        Ok(())
    }

    async fn is_healthy(&self) -> bool {
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Database health check failed");
                false
            }
        }
    }
}
