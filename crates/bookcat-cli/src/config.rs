use clap::{Parser, Subcommand};

use crate::commands::{
    create_author::CreateAuthorCmd, create_book::CreateBookCmd, create_genre::CreateGenreCmd,
    create_user::CreateUserCmd, delete_book::DeleteBookCmd, list_books::ListBooksCmd,
};

#[derive(Parser)]
#[command(
    version,
    about,
    long_about = "CLI for bookcat - manages users, authors, genres and books directly in the database."
)]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    CreateUser(CreateUserCmd),
    CreateAuthor(CreateAuthorCmd),
    CreateGenre(CreateGenreCmd),
    CreateBook(CreateBookCmd),
    DeleteBook(DeleteBookCmd),
    ListBooks(ListBooksCmd),
}

impl crate::commands::Executor for Command {
    async fn run(self) -> anyhow::Result<()> {
        match self {
            Command::CreateUser(cmd) => cmd.run().await,
            Command::CreateAuthor(cmd) => cmd.run().await,
            Command::CreateGenre(cmd) => cmd.run().await,
            Command::CreateBook(cmd) => cmd.run().await,
            Command::DeleteBook(cmd) => cmd.run().await,
            Command::ListBooks(cmd) => cmd.run().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create_book() {
        let config = CliConfig::try_parse_from([
            "bookcat-cli",
            "create-book",
            "--data-dir",
            "/tmp/bookcat",
            "--title",
            "Solaris",
            "--isbn",
            "978-0-15-602760-1",
            "--author-id",
            "1",
            "--year",
            "1961",
            "--genre",
            "1",
            "--genre",
            "2",
        ])
        .unwrap();
        assert!(matches!(config.command, Command::CreateBook(_)));
    }

    #[test]
    fn test_invalid_username() {
        let res = CliConfig::try_parse_from([
            "bookcat-cli",
            "create-user",
            "--data-dir",
            "/tmp/bookcat",
            "--username",
            "no spaces allowed",
            "--password",
            "secret123",
        ]);
        assert!(res.is_err());
    }
}
