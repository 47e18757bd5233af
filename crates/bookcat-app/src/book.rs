use axum::{
    extract::{rejection::FormRejection, Path},
    response::{IntoResponse, Redirect},
    routing::get,
    Form,
};
use bookcat_dal::{
    book::{Book, BookRepository},
    rating::{CreateRating, RatingRepository, MAX_STARS, MIN_STARS},
};
use garde::Validate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    auth::login_url,
    error::{AppError, AppResult},
    repository_from_request,
    state::AppState,
    templates::View,
};

pub const NO_RATING: &str = "No rating";
const RATING_SAVED: &str = "Your rating was successfully saved!";
const RATING_FAILED: &str = "Something went wrong! Please try again.";

repository_from_request!(BookRepository);
repository_from_request!(RatingRepository);

/// Average rating rounded to 2 decimal places, or [`NO_RATING`]
pub fn rating_label(avg: Option<f64>) -> String {
    match avg {
        Some(avg) => {
            let rounded = (avg * 100.0).round() / 100.0;
            if rounded.fract() == 0.0 {
                format!("{rounded:.1}")
            } else {
                format!("{rounded}")
            }
        }
        None => NO_RATING.to_string(),
    }
}

#[derive(Serialize)]
struct RatingForm {
    current: Option<i64>,
    choices: Vec<i64>,
}

#[derive(Serialize)]
struct BookPage {
    book: Book,
    average_rating: String,
    rating_count: i64,
    form: Option<RatingForm>,
}

pub async fn book_detail(
    Path(id): Path<i64>,
    view: View,
    books: BookRepository,
    ratings: RatingRepository,
) -> AppResult<impl IntoResponse> {
    let book = books.get(id).await?;
    let form = match view.user() {
        Some(user) => Some(RatingForm {
            current: ratings.find(id, user.id).await?.map(|r| r.stars),
            choices: (MIN_STARS..=MAX_STARS).collect(),
        }),
        None => None,
    };
    view.render(
        "book-detail.html",
        BookPage {
            average_rating: rating_label(book.avg_rating),
            rating_count: book.rating_count,
            book,
            form,
        },
    )
    .await
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RatingInput {
    stars: String,
}

impl RatingInput {
    fn stars(&self) -> Option<i64> {
        self.stars.trim().parse().ok()
    }
}

pub async fn rate_book(
    Path(id): Path<i64>,
    view: View,
    books: BookRepository,
    ratings: RatingRepository,
    input: Result<Form<RatingInput>, FormRejection>,
) -> AppResult<Redirect> {
    let book_url = format!("/book/{id}");
    let Some(user) = view.user() else {
        debug!("Anonymous rating attempt for book {id}");
        return Ok(Redirect::to(&login_url(&book_url)));
    };

    if !books.exists(id).await? {
        return Err(AppError::NotFound("Book".to_string()));
    }

    let payload = input
        .ok()
        .and_then(|Form(input)| input.stars())
        .map(|stars| CreateRating {
            book_id: id,
            user_id: user.id,
            stars,
        })
        .filter(|payload| payload.validate().is_ok());

    match payload {
        Some(payload) => {
            let rating = ratings.upsert(payload).await?;
            debug!(
                "User {} rated book {id} with {} stars",
                user.username, rating.stars
            );
            view.flash().success(RATING_SAVED).await?;
        }
        None => {
            debug!("Invalid rating of book {id} by {}", user.username);
            view.flash().error(RATING_FAILED).await?;
        }
    }

    Ok(Redirect::to(&book_url))
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new().route("/book/{id}", get(book_detail).post(rate_book))
}
