use std::sync::Arc;

use bookcat_dal::Pool;

use crate::templates::Templates;

#[derive(Clone)]
pub struct AppState {
    state: Arc<AppStateInner>,
}

impl AppState {
    pub fn new(app_config: AppConfig, pool: Pool) -> Result<Self, minijinja::Error> {
        let templates = Templates::new()?;
        Ok(AppState {
            state: Arc::new(AppStateInner {
                app_config,
                pool,
                templates,
            }),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.state.app_config
    }

    pub fn pool(&self) -> &Pool {
        &self.state.pool
    }

    pub fn templates(&self) -> &Templates {
        &self.state.templates
    }
}

struct AppStateInner {
    pool: Pool,
    app_config: AppConfig,
    templates: Templates,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Books per catalogue page
    pub page_size: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { page_size: 6 }
    }
}
