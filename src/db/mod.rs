use crate::models::{RatingPoll, VoteLedger};
use log::warn;
use sqlx::{
    Row, Sqlite,
    migrate::MigrateDatabase,
    sqlite::{SqlitePool, SqlitePoolOptions},
};
use std::env;

/// Durable mirror of the poll registry. One row per poll; the votes
/// column holds the whole ledger as a JSON object and is always
/// replaced in full, never patched.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        // Get database URL from environment or use a default
        let db_url = env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:ratings.db".to_string());
        Self::connect(&db_url).await
    }

    pub async fn connect(db_url: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
            Sqlite::create_database(db_url).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await?;

        Self::init_schema(&pool).await?;

        Ok(Self { pool })
    }

    // Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn init_schema(pool: &SqlitePool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ratings (
                message_id TEXT PRIMARY KEY,
                item_name TEXT NOT NULL,
                votes TEXT
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Persist a freshly opened poll with an empty ledger.
    pub async fn create_rating(
        &self,
        message_id: &str,
        item_name: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            r#"
            INSERT INTO ratings (message_id, item_name, votes)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(message_id)
        .bind(item_name)
        .bind("{}")
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Overwrite the persisted ledger for a poll with its full current
    /// contents. Idempotent, so a lost or repeated write self-heals on
    /// the next mutation.
    pub async fn replace_votes(
        &self,
        message_id: &str,
        votes: &VoteLedger,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let votes_json = serde_json::to_string(votes)?;

        sqlx::query(
            r#"
            UPDATE ratings
            SET votes = ?
            WHERE message_id = ?
            "#,
        )
        .bind(votes_json)
        .bind(message_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Read every persisted poll for startup reconstruction. Rows whose
    /// ledger does not parse are skipped and counted rather than
    /// failing the whole load.
    pub async fn load_all(
        &self,
    ) -> Result<(Vec<(String, RatingPoll)>, usize), Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query(
            r#"
            SELECT message_id, item_name, votes
            FROM ratings
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut polls = Vec::with_capacity(rows.len());
        let mut skipped = 0usize;
        for row in rows {
            let message_id = row.get::<String, _>("message_id");
            let item_name = row.get::<String, _>("item_name");
            let votes_json = row.get::<Option<String>, _>("votes").unwrap_or_default();

            match serde_json::from_str::<VoteLedger>(&votes_json) {
                Ok(votes) => polls.push((message_id, RatingPoll { item_name, votes })),
                Err(e) => {
                    warn!("Skipping stored poll {}: votes column failed to parse: {}", message_id, e);
                    skipped += 1;
                }
            }
        }

        Ok((polls, skipped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_database() -> Database {
        Database::connect("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn create_replace_and_load_round_trip() {
        let db = test_database().await;
        db.create_rating("m1", "Pizza").await.unwrap();

        let mut votes = VoteLedger::new();
        votes.cast("u1".to_string(), 5);
        votes.cast("u2".to_string(), 3);
        db.replace_votes("m1", &votes).await.unwrap();

        let (polls, skipped) = db.load_all().await.unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(polls.len(), 1);
        let (message_id, poll) = &polls[0];
        assert_eq!(message_id, "m1");
        assert_eq!(poll.item_name, "Pizza");
        assert_eq!(poll.votes.rating_of("u1"), Some(5));
        assert_eq!(poll.votes.rating_of("u2"), Some(3));
    }

    #[tokio::test]
    async fn replace_votes_overwrites_the_whole_ledger() {
        let db = test_database().await;
        db.create_rating("m1", "Pizza").await.unwrap();

        let mut votes = VoteLedger::new();
        votes.cast("u1".to_string(), 1);
        db.replace_votes("m1", &votes).await.unwrap();

        votes.retract("u1");
        votes.cast("u2".to_string(), 4);
        db.replace_votes("m1", &votes).await.unwrap();

        let (polls, _) = db.load_all().await.unwrap();
        assert_eq!(polls[0].1.votes.rating_of("u1"), None);
        assert_eq!(polls[0].1.votes.rating_of("u2"), Some(4));
    }

    #[tokio::test]
    async fn unreadable_rows_are_skipped_and_counted() {
        let db = test_database().await;
        db.create_rating("m1", "Pizza").await.unwrap();
        let mut votes = VoteLedger::new();
        votes.cast("u1".to_string(), 5);
        db.replace_votes("m1", &votes).await.unwrap();

        sqlx::query("INSERT INTO ratings (message_id, item_name, votes) VALUES (?, ?, ?)")
            .bind("m2")
            .bind("Tacos")
            .bind("not json")
            .execute(db.pool())
            .await
            .unwrap();

        let (polls, skipped) = db.load_all().await.unwrap();
        assert_eq!(skipped, 1);
        assert_eq!(polls.len(), 1);
        assert_eq!(polls[0].0, "m1");
    }

    #[tokio::test]
    async fn null_votes_column_counts_as_unreadable() {
        let db = test_database().await;
        sqlx::query("INSERT INTO ratings (message_id, item_name) VALUES (?, ?)")
            .bind("m1")
            .bind("Pizza")
            .execute(db.pool())
            .await
            .unwrap();

        let (polls, skipped) = db.load_all().await.unwrap();
        assert!(polls.is_empty());
        assert_eq!(skipped, 1);
    }
}
