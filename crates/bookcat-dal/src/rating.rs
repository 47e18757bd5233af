use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::{Executor, Pool};
use tracing::debug;

use crate::{ChosenDB, Error, error::Result};

pub const MIN_STARS: i64 = 1;
pub const MAX_STARS: i64 = 5;

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct CreateRating {
    #[garde(range(min = 1))]
    pub book_id: i64,
    #[garde(range(min = 1))]
    pub user_id: i64,
    #[garde(range(min = 1, max = 5))]
    pub stars: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Rating {
    pub id: i64,
    pub book_id: i64,
    pub user_id: i64,
    pub stars: i64,
}

pub type RatingRepository = RatingRepositoryImpl<Pool<ChosenDB>>;

pub struct RatingRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> RatingRepositoryImpl<E>
where
    for<'a> &'a E: Executor<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// Creates user's rating of the book or overwrites stars of the existing one.
    /// Single statement, concurrent submissions are serialized by SQLite on the unique key.
    pub async fn upsert(&self, payload: CreateRating) -> Result<Rating> {
        payload.validate()?;
        let rating = sqlx::query_as::<_, Rating>(
            r#"INSERT INTO rating (book_id, user_id, stars) VALUES (?, ?, ?)
            ON CONFLICT(book_id, user_id) DO UPDATE SET stars = excluded.stars
            RETURNING id, book_id, user_id, stars"#,
        )
        .bind(payload.book_id)
        .bind(payload.user_id)
        .bind(payload.stars)
        .fetch_one(&self.executor)
        .await
        .map_err(|e| Error::on_write(e, "Rating"))?;

        debug!(
            "Rating {} of book {} by user {} stored",
            rating.id, rating.book_id, rating.user_id
        );
        Ok(rating)
    }

    pub async fn find(&self, book_id: i64, user_id: i64) -> Result<Option<Rating>> {
        let rating = sqlx::query_as::<_, Rating>(
            "SELECT id, book_id, user_id, stars FROM rating WHERE book_id = ? AND user_id = ?",
        )
        .bind(book_id)
        .bind(user_id)
        .fetch_optional(&self.executor)
        .await?;
        Ok(rating)
    }
}
