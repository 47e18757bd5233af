use std::fmt::Display;

use futures::TryStreamExt as _;
use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::Pool;

use crate::{Error, error::Result};

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct CreateAuthor {
    #[garde(length(chars, min = 1, max = 100))]
    pub first_name: String,
    #[garde(length(chars, min = 1, max = 100))]
    pub last_name: String,
    #[garde(length(chars, min = 1, max = 100))]
    pub country: Option<String>,
    #[garde(range(max = 3000))]
    pub birth_year: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Author {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub country: Option<String>,
    pub birth_year: Option<i32>,
}

impl Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

pub type AuthorRepository = AuthorRepositoryImpl<Pool<crate::ChosenDB>>;

pub struct AuthorRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> AuthorRepositoryImpl<E>
where
    for<'a> &'a E: sqlx::Executor<'c, Database = crate::ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn create(&self, payload: CreateAuthor) -> Result<Author> {
        payload.validate()?;
        let result = sqlx::query(
            "INSERT INTO author (first_name, last_name, country, birth_year) VALUES (?, ?, ?, ?)",
        )
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(&payload.country)
        .bind(payload.birth_year)
        .execute(&self.executor)
        .await
        .map_err(|e| Error::on_write(e, "Author"))?;

        let id = result.last_insert_rowid();
        self.get(id).await
    }

    /// All authors, for filter selection
    pub async fn list_all(&self) -> Result<Vec<Author>> {
        let records = sqlx::query_as::<_, Author>(
            "SELECT id, first_name, last_name, country, birth_year FROM author ORDER BY last_name, first_name",
        )
        .fetch(&self.executor)
        .try_collect::<Vec<_>>()
        .await?;
        Ok(records)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let res = sqlx::query("DELETE FROM author WHERE id = ?")
            .bind(id)
            .execute(&self.executor)
            .await?;

        if res.rows_affected() == 0 {
            Err(Error::RecordNotFound("Author".to_string()))
        } else {
            Ok(())
        }
    }

    pub async fn get(&self, id: i64) -> Result<Author> {
        let record = sqlx::query_as::<_, Author>(
            "SELECT id, first_name, last_name, country, birth_year FROM author WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&self.executor)
        .await
        .map_err(|e| Error::on_not_found(e, "Author"))?;
        Ok(record)
    }
}
