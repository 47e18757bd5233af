use std::str::FromStr;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
};
use bookcat_dal::{
    author::{Author, AuthorRepository},
    book::{BookFilter, BookRepository, BookShort},
    genre::{Genre, GenreRepository},
    ListingParams, Order,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    paging::{Page, PageRequest},
    repository_from_request,
    state::AppState,
    templates::View,
};

repository_from_request!(AuthorRepository);
repository_from_request!(GenreRepository);

/// Catalogue query string, all values kept raw so that empty fields can be ignored
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogueQuery {
    pub author: Option<String>,
    pub genre: Option<String>,
    pub from_year: Option<String>,
    pub to_year: Option<String>,
    pub ordering: Option<String>,
    pub page: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_param<T: FromStr>(value: &Option<String>, name: &'static str) -> AppResult<Option<T>> {
    non_empty(value)
        .map(|v| v.parse::<T>().map_err(|_| AppError::InvalidQuery(name)))
        .transpose()
}

impl CatalogueQuery {
    pub fn filter(&self) -> AppResult<BookFilter> {
        Ok(BookFilter {
            author: parse_param(&self.author, "author")?,
            genre: parse_param(&self.genre, "genre")?,
            from_year: parse_param(&self.from_year, "from_year")?,
            to_year: parse_param(&self.to_year, "to_year")?,
        })
    }

    /// Unknown ordering values fall back to default order by id
    pub fn order(&self) -> Option<Order> {
        match non_empty(&self.ordering)? {
            "title" => Some(Order("b.title".into())),
            "year" => Some(Order("b.year".into())),
            _ => None,
        }
    }

    /// Query string of active filters and ordering, used to build paging links
    pub fn filter_query(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        let fields = [
            ("author", &self.author),
            ("genre", &self.genre),
            ("from_year", &self.from_year),
            ("to_year", &self.to_year),
            ("ordering", &self.ordering),
        ];
        for (name, value) in fields {
            if let Some(value) = non_empty(value) {
                serializer.append_pair(name, value);
            }
        }
        serializer.finish()
    }

    fn page_prefix(&self) -> String {
        let query = self.filter_query();
        if query.is_empty() {
            "?page=".to_string()
        } else {
            format!("?{query}&page=")
        }
    }
}

#[derive(Serialize)]
struct CataloguePage {
    books: Page<BookShort>,
    authors: Vec<Author>,
    genres: Vec<Genre>,
    filter: BookFilter,
    ordering: Option<String>,
    page_prefix: String,
}

pub async fn catalogue(
    view: View,
    State(state): State<AppState>,
    books: BookRepository,
    authors: AuthorRepository,
    genres: GenreRepository,
    Query(query): Query<CatalogueQuery>,
) -> AppResult<impl IntoResponse> {
    let filter = query.filter()?;
    let page_size = state.config().page_size;
    let total = books.count(&filter).await?;
    let page = PageRequest::parse(query.page.as_deref())?.resolve(total, page_size)?;

    let offset = (page as i64 - 1) * page_size as i64;
    let mut params = ListingParams::new(offset, page_size as i64);
    if let Some(order) = query.order() {
        params = params.with_order(vec![order]);
    }
    let batch = books.list_with_total(&filter, params, total).await?;
    let books = Page::try_from_batch(batch, page_size)?;

    view.render(
        "catalogue.html",
        CataloguePage {
            books,
            authors: authors.list_all().await?,
            genres: genres.list_all().await?,
            filter,
            ordering: query
                .order()
                .map(|o| o.as_ref().trim_start_matches("b.").to_string()),
            page_prefix: query.page_prefix(),
        },
    )
    .await
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new().route("/catalogue/", get(catalogue))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> CatalogueQuery {
        let map: serde_json::Map<String, serde_json::Value> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect();
        serde_json::from_value(serde_json::Value::Object(map)).unwrap()
    }

    #[test]
    fn test_empty_filter() {
        let q = query(&[("author", ""), ("genre", " "), ("page", "")]);
        assert_eq!(q.filter().unwrap(), BookFilter::default());
        assert!(q.order().is_none());
        assert_eq!(q.filter_query(), "");
        assert_eq!(q.page_prefix(), "?page=");
    }

    #[test]
    fn test_filter() {
        let q = query(&[
            ("author", "2"),
            ("genre", "1"),
            ("from_year", "1950"),
            ("to_year", "1970"),
            ("ordering", "title"),
        ]);
        assert_eq!(
            q.filter().unwrap(),
            BookFilter {
                author: Some(2),
                genre: Some(1),
                from_year: Some(1950),
                to_year: Some(1970),
            }
        );
        assert_eq!(q.order().unwrap().as_ref(), "b.title");
        assert_eq!(
            q.page_prefix(),
            "?author=2&genre=1&from_year=1950&to_year=1970&ordering=title&page="
        );
    }

    #[test]
    fn test_invalid_filter() {
        let q = query(&[("author", "abc")]);
        assert!(matches!(q.filter(), Err(AppError::InvalidQuery("author"))));
        let q = query(&[("from_year", "19.5")]);
        assert!(matches!(q.filter(), Err(AppError::InvalidQuery("from_year"))));
    }

    #[test]
    fn test_unknown_ordering() {
        let q = query(&[("ordering", "isbn; DROP TABLE book")]);
        assert!(q.order().is_none());
        let q = query(&[("ordering", "year")]);
        assert_eq!(q.order().unwrap().as_ref(), "b.year");
    }
}
