use thiserror::Error;

/// mapper 层错误，原样交给上层
#[derive(Error, Debug)]
pub enum MapperError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
