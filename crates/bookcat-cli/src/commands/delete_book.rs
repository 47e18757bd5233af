use bookcat_dal::book::BookRepository;
use bookcat_types::config::BackendConfig;
use clap::Parser;

use crate::commands::{open_db, Executor};

#[derive(Parser, Debug)]
pub struct DeleteBookCmd {
    #[command(flatten)]
    backend: BackendConfig,
    #[arg(long, help = "Id of book to delete, its ratings are deleted too")]
    id: i64,
}

impl Executor for DeleteBookCmd {
    async fn run(self) -> anyhow::Result<()> {
        let pool = open_db(&self.backend).await?;
        BookRepository::new(pool).delete(self.id).await?;
        println!("Deleted book {}", self.id);
        Ok(())
    }
}
