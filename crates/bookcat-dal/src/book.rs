use std::fmt::Display;

use futures::{StreamExt as _, TryStreamExt as _};
use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::{Acquire, Executor, Pool, QueryBuilder, Row};
use tracing::debug;

use crate::{
    Batch, ChosenDB, ChosenRow, Error, ListingParams, MAX_LIMIT, author::Author, error::Result,
    genre::Genre,
};

pub const VALID_ORDER_FIELDS: &[&str] = &["b.id", "b.title", "b.year"];

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct CreateBook {
    #[garde(length(chars, min = 1, max = 100))]
    pub title: String,
    #[garde(range(max = 3000))]
    pub year: Option<i32>,
    #[garde(length(chars, min = 1, max = 100))]
    pub isbn: String,
    #[garde(range(min = 1))]
    pub author_id: i64,
    #[garde(inner(range(min = 1)))]
    pub genres: Vec<i64>,
}

/// Book row in catalogue listing, annotated with average rating
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct BookShort {
    pub id: i64,
    pub title: String,
    pub year: Option<i32>,
    pub author_id: i64,
    pub author_name: String,
    pub avg_rating: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub year: Option<i32>,
    pub isbn: String,
    pub author: Author,
    pub genres: Vec<Genre>,
    pub avg_rating: Option<f64>,
    pub rating_count: i64,
}

impl sqlx::FromRow<'_, ChosenRow> for Book {
    fn from_row(row: &ChosenRow) -> Result<Self, sqlx::Error> {
        let author = Author {
            id: row.try_get("author_id")?,
            first_name: row.try_get("author_first_name")?,
            last_name: row.try_get("author_last_name")?,
            country: row.try_get("author_country")?,
            birth_year: row.try_get("author_birth_year")?,
        };
        Ok(Book {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            year: row.try_get("year")?,
            isbn: row.try_get("isbn")?,
            author,
            genres: Vec::new(),
            avg_rating: row.try_get("avg_rating")?,
            rating_count: row.try_get("rating_count")?,
        })
    }
}

impl Display for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.year {
            Some(year) => write!(f, "\"{}\". ({})", self.title, year),
            None => write!(f, "\"{}\".", self.title),
        }
    }
}

/// Conjunctive catalogue filter, `None` fields do not restrict the result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookFilter {
    pub author: Option<i64>,
    pub genre: Option<i64>,
    pub from_year: Option<i32>,
    pub to_year: Option<i32>,
}

fn push_filter(qb: &mut QueryBuilder<'_, ChosenDB>, filter: &BookFilter) {
    qb.push(" WHERE 1 = 1");
    if let Some(author) = filter.author {
        qb.push(" AND b.author_id = ").push_bind(author);
    }
    if let Some(genre) = filter.genre {
        qb.push(" AND EXISTS (SELECT 1 FROM book_genres bg WHERE bg.book_id = b.id AND bg.genre_id = ")
            .push_bind(genre)
            .push(")");
    }
    if let Some(from_year) = filter.from_year {
        qb.push(" AND b.year >= ").push_bind(from_year);
    }
    if let Some(to_year) = filter.to_year {
        qb.push(" AND b.year <= ").push_bind(to_year);
    }
}

const LIST_SELECT: &str = r#"
SELECT b.id, b.title, b.year, b.author_id,
a.first_name || ' ' || a.last_name AS author_name,
(SELECT AVG(r.stars) FROM rating r WHERE r.book_id = b.id) AS avg_rating
FROM book b
JOIN author a ON a.id = b.author_id"#;

pub type BookRepository = BookRepositoryImpl<Pool<ChosenDB>>;

pub struct BookRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> BookRepositoryImpl<E>
where
    for<'a> &'a E: Executor<'c, Database = ChosenDB> + Acquire<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn create(&self, payload: CreateBook) -> Result<Book> {
        payload.validate()?;
        let mut tx = self.executor.begin().await?;
        let result =
            sqlx::query("INSERT INTO book (title, year, isbn, author_id) VALUES (?, ?, ?, ?)")
                .bind(&payload.title)
                .bind(payload.year)
                .bind(&payload.isbn)
                .bind(payload.author_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| Error::on_write(e, "Book"))?;
        let id = result.last_insert_rowid();

        for genre_id in &payload.genres {
            sqlx::query("INSERT OR IGNORE INTO book_genres (book_id, genre_id) VALUES (?, ?)")
                .bind(id)
                .bind(genre_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| Error::on_write(e, "Book genre"))?;
        }
        tx.commit().await?;
        debug!("Created book {id}");

        self.get(id).await
    }

    pub async fn get(&self, id: i64) -> Result<Book> {
        const SQL: &str = r#"
        SELECT b.id, b.title, b.year, b.isbn, b.author_id,
        a.first_name AS author_first_name, a.last_name AS author_last_name,
        a.country AS author_country, a.birth_year AS author_birth_year,
        (SELECT AVG(r.stars) FROM rating r WHERE r.book_id = b.id) AS avg_rating,
        (SELECT COUNT(*) FROM rating r WHERE r.book_id = b.id) AS rating_count
        FROM book b
        JOIN author a ON a.id = b.author_id
        WHERE b.id = ?;
        "#;
        let mut record = sqlx::query_as::<_, Book>(SQL)
            .bind(id)
            .fetch_one(&self.executor)
            .await
            .map_err(|e| Error::on_not_found(e, "Book"))?;

        record.genres = sqlx::query_as::<_, Genre>(
            r#"SELECT g.id, g.name FROM genre g
            JOIN book_genres bg ON bg.genre_id = g.id
            WHERE bg.book_id = ?
            ORDER BY g.name"#,
        )
        .bind(id)
        .fetch_all(&self.executor)
        .await?;

        Ok(record)
    }

    pub async fn exists(&self, id: i64) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM book WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.executor)
            .await?;
        Ok(found.is_some())
    }

    pub async fn count(&self, filter: &BookFilter) -> Result<u64> {
        let mut qb = QueryBuilder::<ChosenDB>::new("SELECT count(*) FROM book b");
        push_filter(&mut qb, filter);
        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(&self.executor)
            .await?;
        Ok(count as u64)
    }

    pub async fn list(&self, filter: &BookFilter, params: ListingParams) -> Result<Batch<BookShort>> {
        let total = self.count(filter).await?;
        self.list_with_total(filter, params, total).await
    }

    /// Same as [`Self::list`] for caller which already counted matching books
    pub async fn list_with_total(
        &self,
        filter: &BookFilter,
        params: ListingParams,
        total: u64,
    ) -> Result<Batch<BookShort>> {
        let order = params.ordering(VALID_ORDER_FIELDS)?;
        // id as last key keeps pages stable for equal titles/years
        let order = if order.is_empty() {
            "b.id".to_string()
        } else {
            format!("{order}, b.id")
        };

        let mut qb = QueryBuilder::<ChosenDB>::new(LIST_SELECT);
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY ")
            .push(order)
            .push(" LIMIT ")
            .push_bind(params.limit)
            .push(" OFFSET ")
            .push_bind(params.offset);

        let rows = qb
            .build_query_as::<BookShort>()
            .fetch(&self.executor)
            .take(MAX_LIMIT)
            .try_collect::<Vec<_>>()
            .await?;

        Ok(Batch {
            offset: params.offset,
            limit: params.limit,
            total,
            rows,
        })
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let res = sqlx::query("DELETE FROM book WHERE id = ?")
            .bind(id)
            .execute(&self.executor)
            .await?;

        if res.rows_affected() == 0 {
            Err(Error::RecordNotFound("Book".to_string()))
        } else {
            Ok(())
        }
    }
}
