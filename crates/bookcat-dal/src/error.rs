pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("User password error: {0}")]
    UserPasswordError(#[from] argon2::password_hash::Error),

    #[error("Invalid data: {0}")]
    ValidationError(#[from] garde::Report),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Record already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid order by field: {0}")]
    InvalidOrderByField(String),
}

impl Error {
    /// Maps constraint violations on insert/update: unique to [`Error::AlreadyExists`] for `entity`,
    /// foreign key to [`Error::RecordNotFound`] for referenced record
    pub(crate) fn on_write(e: sqlx::Error, entity: &str) -> Self {
        match e {
            sqlx::Error::Database(ref db_error) if db_error.is_unique_violation() => {
                Error::AlreadyExists(entity.to_string())
            }
            sqlx::Error::Database(ref db_error) if db_error.is_foreign_key_violation() => {
                Error::RecordNotFound(format!("Record referenced by {entity}"))
            }
            e => Error::DatabaseError(e),
        }
    }

    pub(crate) fn on_not_found(e: sqlx::Error, entity: &str) -> Self {
        match e {
            sqlx::Error::RowNotFound => Error::RecordNotFound(entity.to_string()),
            e => Error::DatabaseError(e),
        }
    }
}
