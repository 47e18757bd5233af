use bookcat_dal::user::{CreateUser, UserRepository};
use bookcat_types::{config::BackendConfig, general::ValidUsername};
use clap::Parser;

use crate::commands::{open_db, Executor};

#[derive(Parser, Debug)]
pub struct CreateUserCmd {
    #[command(flatten)]
    backend: BackendConfig,
    #[arg(short, long, help = "User name, letters, digits and @.+-_ only")]
    pub username: ValidUsername,
    #[arg(short, long, help = "User password")]
    pub password: String,
}

impl Executor for CreateUserCmd {
    async fn run(self) -> anyhow::Result<()> {
        let pool = open_db(&self.backend).await?;
        let repository = UserRepository::new(pool);
        let new_user = CreateUser {
            username: self.username,
            password: self.password,
        };
        let user = repository.create(new_user).await?;
        println!("Created user {} (id {})", user.username, user.id);

        Ok(())
    }
}
