pub mod biz;
pub mod config;
pub mod data;
pub mod error;
pub mod metric;
pub mod server;
pub mod service;

use dotenvy::dotenv;

use anyhow::Result as AnyResult;
pub use error::UserProductError;

pub type Result<T> = AnyResult<T, UserProductError>;

impl From<anyhow::Error> for UserProductError {
    fn from(err: anyhow::Error) -> Self {
        UserProductError::InternalError(err.to_string())
    }
}

/// 初始化环境变量
pub fn init_env() {
    if let Err(e) = dotenv() {
        eprintln!("Warning: Could not load .env file: {}", e);
    }
}
