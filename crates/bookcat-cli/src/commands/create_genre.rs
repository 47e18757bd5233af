use bookcat_dal::genre::{CreateGenre, GenreRepository};
use bookcat_types::config::BackendConfig;
use clap::Parser;

use crate::commands::{open_db, Executor};

#[derive(Parser, Debug)]
pub struct CreateGenreCmd {
    #[command(flatten)]
    backend: BackendConfig,
    #[arg(short, long, help = "Genre name, must be unique")]
    name: String,
}

impl Executor for CreateGenreCmd {
    async fn run(self) -> anyhow::Result<()> {
        let pool = open_db(&self.backend).await?;
        let genre = GenreRepository::new(pool)
            .create(CreateGenre { name: self.name })
            .await?;
        println!("Created genre {} (id {})", genre.name, genre.id);
        Ok(())
    }
}
