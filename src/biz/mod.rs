pub mod delay;
pub mod user;

pub use delay::LookupDelay;
pub use user::{User, UserId, UserMapper, UserUseCase};
