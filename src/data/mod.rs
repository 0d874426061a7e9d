pub mod db;
mod error;
pub mod memory;
pub mod user;

pub use db::Database;
pub use error::MapperError;
pub use memory::InMemoryUserMapper;
pub use user::SqlUserMapper;
