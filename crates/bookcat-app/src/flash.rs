//! One-shot messages kept in session until next rendered page

use serde::{Deserialize, Serialize};
use tower_sessions::{session, Session};

const FLASH_KEY: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: Level,
    pub text: String,
}

#[derive(Clone)]
pub struct Flash {
    session: Session,
}

impl Flash {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub async fn push(&self, level: Level, text: impl Into<String>) -> Result<(), session::Error> {
        let mut messages: Vec<FlashMessage> =
            self.session.get(FLASH_KEY).await?.unwrap_or_default();
        messages.push(FlashMessage {
            level,
            text: text.into(),
        });
        self.session.insert(FLASH_KEY, messages).await
    }

    pub async fn success(&self, text: impl Into<String>) -> Result<(), session::Error> {
        self.push(Level::Success, text).await
    }

    pub async fn error(&self, text: impl Into<String>) -> Result<(), session::Error> {
        self.push(Level::Error, text).await
    }

    /// Removes and returns all pending messages
    pub async fn take(&self) -> Result<Vec<FlashMessage>, session::Error> {
        let messages = self
            .session
            .remove::<Vec<FlashMessage>>(FLASH_KEY)
            .await?
            .unwrap_or_default();
        Ok(messages)
    }
}
