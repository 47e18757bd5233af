use axum::{extract::FromRequestParts, response::Html};
use bookcat_dal::user::User;
use http::request::Parts;
use minijinja::Environment;
use serde::Serialize;
use tower_sessions::Session;
use tracing::error;

use crate::{
    auth::SESSION_USER_KEY,
    book::rating_label,
    error::{AppError, AppResult},
    flash::{Flash, FlashMessage},
    state::AppState,
};

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("about.html", include_str!("../templates/about.html")),
    ("contacts.html", include_str!("../templates/contacts.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("register.html", include_str!("../templates/register.html")),
    ("catalogue.html", include_str!("../templates/catalogue.html")),
    ("book-detail.html", include_str!("../templates/book-detail.html")),
];

/// Page templates compiled into the binary
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        for (name, source) in TEMPLATES.iter().copied() {
            env.add_template(name, source)?;
        }
        env.add_filter("rating", |avg: Option<f64>| rating_label(avg));
        Ok(Self { env })
    }

    pub fn render<S: Serialize>(&self, name: &str, context: S) -> Result<String, minijinja::Error> {
        self.env.get_template(name)?.render(context)
    }
}

#[derive(Serialize)]
struct PageContext<'a, T> {
    user: Option<&'a User>,
    messages: Vec<FlashMessage>,
    page: T,
}

/// Renders pages for the current request - knows logged in user and pending flash messages
pub struct View {
    state: AppState,
    session: Session,
    user: Option<User>,
}

impl FromRequestParts<AppState> for View {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                error!("Missing session: {}", e.1);
                AppError::MissingSession
            })?;
        let user = session.get::<User>(SESSION_USER_KEY).await?;
        Ok(View {
            state: state.clone(),
            session,
            user,
        })
    }
}

impl View {
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn flash(&self) -> Flash {
        Flash::new(self.session.clone())
    }

    pub async fn render<T: Serialize>(&self, template: &str, page: T) -> AppResult<Html<String>> {
        let messages = self.flash().take().await?;
        let context = PageContext {
            user: self.user.as_ref(),
            messages,
            page,
        };
        let html = self.state.templates().render(template, context)?;
        Ok(Html(html))
    }
}
