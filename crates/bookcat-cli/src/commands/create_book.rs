use bookcat_dal::book::{BookRepository, CreateBook};
use bookcat_types::config::BackendConfig;
use clap::Parser;

use crate::commands::{open_db, Executor};

#[derive(Parser, Debug)]
pub struct CreateBookCmd {
    #[command(flatten)]
    backend: BackendConfig,
    #[arg(short, long, help = "Book title")]
    title: String,
    #[arg(short, long, help = "ISBN, must be unique")]
    isbn: String,
    #[arg(short, long, help = "Id of book author")]
    author_id: i64,
    #[arg(short, long, help = "Year of publication")]
    year: Option<i32>,
    #[arg(short, long = "genre", num_args = 0.., value_delimiter = ',', help = "Genre ids, comma separated or used multiple times")]
    genres: Vec<i64>,
}

impl Executor for CreateBookCmd {
    async fn run(self) -> anyhow::Result<()> {
        let pool = open_db(&self.backend).await?;
        let book = BookRepository::new(pool)
            .create(CreateBook {
                title: self.title,
                year: self.year,
                isbn: self.isbn,
                author_id: self.author_id,
                genres: self.genres,
            })
            .await?;
        println!("Created book {book} by {} (id {})", book.author, book.id);
        Ok(())
    }
}
