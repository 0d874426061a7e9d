pub mod response;
pub mod user;

pub use response::{ErrCode, Response};
pub use user::{GetUserResp, UserServiceImpl};
