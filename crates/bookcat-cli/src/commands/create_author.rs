use bookcat_dal::author::{AuthorRepository, CreateAuthor};
use bookcat_types::config::BackendConfig;
use clap::Parser;

use crate::commands::{open_db, Executor};

#[derive(Parser, Debug)]
pub struct CreateAuthorCmd {
    #[command(flatten)]
    backend: BackendConfig,
    #[arg(short, long, help = "First name")]
    first_name: String,
    #[arg(short, long, help = "Last name")]
    last_name: String,
    #[arg(short, long, help = "Country of origin")]
    country: Option<String>,
    #[arg(short, long, help = "Year of birth")]
    birth_year: Option<i32>,
}

impl Executor for CreateAuthorCmd {
    async fn run(self) -> anyhow::Result<()> {
        let pool = open_db(&self.backend).await?;
        let author = AuthorRepository::new(pool)
            .create(CreateAuthor {
                first_name: self.first_name,
                last_name: self.last_name,
                country: self.country,
                birth_year: self.birth_year,
            })
            .await?;
        println!("Created author {author} (id {})", author.id);
        Ok(())
    }
}
