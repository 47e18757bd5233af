use bookcat_dal::Pool;
use bookcat_types::config::BackendConfig;
use tracing::debug;

pub mod create_author;
pub mod create_book;
pub mod create_genre;
pub mod create_user;
pub mod delete_book;
pub mod list_books;

#[allow(async_fn_in_trait)]
pub trait Executor {
    async fn run(self) -> anyhow::Result<()>;
}

/// Opens database and brings schema up to date
pub(crate) async fn open_db(backend: &BackendConfig) -> anyhow::Result<Pool> {
    let db_url = backend.database_url();
    let pool = bookcat_dal::new_pool(&db_url).await?;
    bookcat_dal::migrate(&pool).await?;
    debug!("Using database {db_url}");
    Ok(pool)
}
