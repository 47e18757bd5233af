use std::collections::BTreeMap;

use axum::{
    extract::Query,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form,
};
use bookcat_dal::user::{CreateUser, UserRepository};
use bookcat_types::general::ValidUsername;
use garde::Validate;
use serde::{Deserialize, Serialize};
use time::Duration;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};
use tracing::{debug, info};

use crate::{
    error::AppResult, repository_from_request, state::AppState, templates::View,
};

pub const SESSION_COOKIE_NAME: &str = "bookcat";
pub(crate) const SESSION_USER_KEY: &str = "user";

const LOGIN_FAILED: &str = "Please enter a correct username and password.";
const USERNAME_TAKEN: &str = "A user with that username already exists.";
const REGISTERED: &str = "Successfully registered!";
const REGISTRATION_FAILED: &str = "Something goes wrong! Please try again.";
const LOGGED_OUT: &str = "You have been logged out.";
const PASSWORD_TOO_SIMILAR: &str = "The password is too similar to the username.";
const MAX_SIMILARITY: f64 = 0.7;

repository_from_request!(UserRepository);

/// Session layer used by all pages - keeps logged in user and flash messages
pub fn session_layer(expiry: Duration, secure: bool) -> SessionManagerLayer<MemoryStore> {
    let session_store = MemoryStore::default();
    SessionManagerLayer::new(session_store)
        .with_name(SESSION_COOKIE_NAME)
        .with_secure(secure)
        .with_expiry(Expiry::OnInactivity(expiry))
}

/// Accepts only local absolute paths as redirect target.
/// Browsers drop control characters from URLs, so `/\t/host` would become `//host`.
pub fn safe_next(next: Option<&str>) -> Option<String> {
    next.map(str::trim)
        .filter(|n| n.starts_with('/') && !n.starts_with("//"))
        .filter(|n| !n.contains('\\') && !n.chars().any(char::is_control))
        .map(|n| n.to_string())
}

/// URL of login page, returning to `next` after successful login
pub fn login_url(next: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("next", next)
        .finish();
    format!("/login/?{query}")
}

#[derive(Debug, Deserialize, Default)]
pub struct NextQuery {
    next: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct LoginForm {
    username: String,
    password: String,
    next: Option<String>,
}

#[derive(Serialize)]
struct LoginPage<'a> {
    next: Option<String>,
    username: &'a str,
    error: Option<&'static str>,
}

pub async fn login_page(view: View, Query(query): Query<NextQuery>) -> AppResult<impl IntoResponse> {
    view.render(
        "login.html",
        LoginPage {
            next: safe_next(query.next.as_deref()),
            username: "",
            error: None,
        },
    )
    .await
}

pub async fn login(
    view: View,
    user_registry: UserRepository,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let next = safe_next(form.next.as_deref());
    match user_registry
        .check_password(&form.username, &form.password)
        .await
    {
        Ok(user) => {
            let session = view.session();
            session.cycle_id().await?;
            info!("User {} logged in", user.username);
            session.insert(SESSION_USER_KEY, user).await?;
            Ok(Redirect::to(next.as_deref().unwrap_or("/")).into_response())
        }
        Err(bookcat_dal::Error::InvalidCredentials) => {
            debug!("Failed login for {}", form.username);
            let page = view
                .render(
                    "login.html",
                    LoginPage {
                        next,
                        username: &form.username,
                        error: Some(LOGIN_FAILED),
                    },
                )
                .await?;
            Ok(page.into_response())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn logout(view: View) -> AppResult<Redirect> {
    if let Some(user) = view.user() {
        info!("User {} logged out", user.username);
    }
    view.session().flush().await?;
    view.flash().push(crate::flash::Level::Info, LOGGED_OUT).await?;
    Ok(Redirect::to("/"))
}

fn not_numeric(value: &str, _ctx: &()) -> garde::Result {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        Err(garde::Error::new("This password is entirely numeric."))
    } else {
        Ok(())
    }
}

#[derive(Debug, Deserialize, Default, Validate)]
#[serde(default)]
pub struct RegisterForm {
    #[garde(dive)]
    pub username: ValidUsername,
    #[garde(length(chars, min = 8, max = 255), custom(not_numeric))]
    pub password1: String,
    #[garde(matches(password1))]
    pub password2: String,
}

pub type FieldErrors = BTreeMap<String, Vec<String>>;

impl RegisterForm {
    /// All problems of submitted form by field, empty when it can be accepted
    pub fn errors(&self) -> FieldErrors {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(report) => field_errors(&report),
        };
        if too_similar(&self.password1, self.username.as_ref()) {
            errors
                .entry("password1".to_string())
                .or_default()
                .push(PASSWORD_TOO_SIMILAR.to_string());
        }
        errors
    }
}

/// Count of matching characters by Ratcliff/Obershelp - longest common block, then recursively both sides
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (mut len, mut at_a, mut at_b) = (0, 0, 0);
    for i in 0..a.len() {
        for j in 0..b.len() {
            let k = a[i..]
                .iter()
                .zip(&b[j..])
                .take_while(|(x, y)| x == y)
                .count();
            if k > len {
                (len, at_a, at_b) = (k, i, j);
            }
        }
    }
    if len == 0 {
        return 0;
    }
    len + matching_chars(&a[..at_a], &b[..at_b])
        + matching_chars(&a[at_a + len..], &b[at_b + len..])
}

fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 0.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

/// Password is compared with whole username and with its parts split on non word characters
fn too_similar(password: &str, username: &str) -> bool {
    username
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .chain(std::iter::once(username))
        .filter(|part| !part.is_empty())
        .any(|part| similarity(password, part) >= MAX_SIMILARITY)
}

/// Groups validation report by form field, errors not bound to field go under `form`
pub fn field_errors(report: &garde::Report) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for (path, error) in report.iter() {
        let field = path.to_string();
        let field = if field.is_empty() {
            "form".to_string()
        } else {
            field
        };
        errors
            .entry(field)
            .or_default()
            .push(error.message().to_string());
    }
    errors
}

#[derive(Serialize)]
struct RegisterPage<'a> {
    username: &'a str,
    errors: FieldErrors,
}

pub async fn register_page(view: View) -> AppResult<impl IntoResponse> {
    view.render(
        "register.html",
        RegisterPage {
            username: "",
            errors: FieldErrors::new(),
        },
    )
    .await
}

pub async fn register(
    view: View,
    user_registry: UserRepository,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    let mut errors = form.errors();

    if errors.is_empty() {
        let new_user = CreateUser {
            username: form.username.clone(),
            password: form.password1.clone(),
        };
        match user_registry.create(new_user).await {
            Ok(user) => {
                info!("Registered user {}", user.username);
                view.flash().success(REGISTERED).await?;
                return Ok(Redirect::to("/login/").into_response());
            }
            Err(bookcat_dal::Error::AlreadyExists(_)) => {
                errors
                    .entry("username".to_string())
                    .or_default()
                    .push(USERNAME_TAKEN.to_string());
            }
            Err(e) => return Err(e.into()),
        }
    }

    debug!("Registration rejected: {errors:?}");
    view.flash().error(REGISTRATION_FAILED).await?;
    let page = view
        .render(
            "register.html",
            RegisterPage {
                username: form.username.as_ref(),
                errors,
            },
        )
        .await?;
    Ok(page.into_response())
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/register/", get(register_page).post(register))
        .route("/login/", get(login_page).post(login))
        .route("/logout/", get(logout).post(logout))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(username: &str, password1: &str, password2: &str) -> RegisterForm {
        RegisterForm {
            username: serde_json::from_value(serde_json::json!(username)).unwrap(),
            password1: password1.to_string(),
            password2: password2.to_string(),
        }
    }

    #[test]
    fn test_valid_registration() {
        assert!(form("ivan", "kocour123", "kocour123").validate().is_ok());
    }

    #[test]
    fn test_invalid_registration() {
        let report = form("ivan novak", "12345678", "12345679")
            .validate()
            .unwrap_err();
        let errors = field_errors(&report);
        assert!(errors.contains_key("username"));
        assert!(errors.contains_key("password1"));
        assert!(errors.contains_key("password2"));

        let report = form("ivan", "short", "short").validate().unwrap_err();
        let errors = field_errors(&report);
        assert_eq!(errors.keys().collect::<Vec<_>>(), vec!["password1"]);

        let report = form("", "", "").validate().unwrap_err();
        assert!(field_errors(&report).contains_key("username"));
    }

    #[test]
    fn test_password_similar_to_username() {
        let errors = form("ivan.novak", "ivannovak1", "ivannovak1").errors();
        assert_eq!(
            errors.get("password1"),
            Some(&vec![PASSWORD_TOO_SIMILAR.to_string()])
        );
        // part of username is enough
        assert!(too_similar("Novak2024", "ivan.novak"));
        assert!(!too_similar("kocour123", "ivan.novak"));
        assert!(form("ivan", "kocour123", "kocour123").errors().is_empty());
    }

    #[test]
    fn test_similarity() {
        assert_eq!(similarity("abcd", "abcd"), 1.0);
        assert_eq!(similarity("abcd", "wxyz"), 0.0);
        assert_eq!(similarity("abcd", "bcde"), 0.75);
        assert_eq!(similarity("ABCD", "abcd"), 1.0);
        assert_eq!(similarity("", ""), 0.0);
    }

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/book/1")), Some("/book/1".to_string()));
        assert_eq!(safe_next(Some("//evil.com")), None);
        assert_eq!(safe_next(Some("https://evil.com")), None);
        assert_eq!(safe_next(Some("/\\evil.com")), None);
        assert_eq!(safe_next(Some("/\t/evil.example.com")), None);
        assert_eq!(safe_next(Some("/\n/evil.example.com")), None);
        assert_eq!(safe_next(Some("/\u{7f}/evil.example.com")), None);
        assert_eq!(safe_next(Some(" /book/2 ")), Some("/book/2".to_string()));
        assert_eq!(safe_next(None), None);
    }

    #[test]
    fn test_login_url() {
        assert_eq!(login_url("/book/3"), "/login/?next=%2Fbook%2F3");
    }
}
