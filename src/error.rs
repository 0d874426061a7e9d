use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum UserProductError {
    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("configuration error:{0}")]
    ConfigError(String),

    #[error("Server error: {0}")]
    ServerError(String),
}

impl From<std::io::Error> for UserProductError {
    fn from(err: std::io::Error) -> Self {
        UserProductError::InternalError(err.to_string())
    }
}

impl From<config::ConfigError> for UserProductError {
    fn from(err: config::ConfigError) -> Self {
        UserProductError::ConfigError(err.to_string())
    }
}
