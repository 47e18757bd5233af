use bookcat_app::book::rating_label;
use bookcat_dal::{
    book::{BookFilter, BookRepository},
    ListingParams,
};
use bookcat_types::config::BackendConfig;
use clap::Parser;

use crate::commands::{open_db, Executor};

#[derive(Parser, Debug)]
pub struct ListBooksCmd {
    #[command(flatten)]
    backend: BackendConfig,
}

impl Executor for ListBooksCmd {
    async fn run(self) -> anyhow::Result<()> {
        let pool = open_db(&self.backend).await?;
        let batch = BookRepository::new(pool)
            .list(&BookFilter::default(), ListingParams::default())
            .await?;
        for book in &batch.rows {
            let year = book.year.map(|y| y.to_string()).unwrap_or_default();
            println!(
                "{:>5}  {:<40} {:>4}  {:<30} {}",
                book.id,
                book.title,
                year,
                book.author_name,
                rating_label(book.avg_rating)
            );
        }
        println!("{} books", batch.total);
        Ok(())
    }
}
