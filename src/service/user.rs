use std::sync::Arc;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::response::{ErrCode, Response};
use crate::biz::{User, UserId, UserMapper, UserUseCase};
use crate::metric::AppMetrics;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct GetUserResp {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub age: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<User> for GetUserResp {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            age: user.age,
            created_at: user.created_at.timestamp(),
            updated_at: user.updated_at.timestamp(),
        }
    }
}

pub type UserReply = (StatusCode, Json<Response<GetUserResp>>);

#[derive(Debug)]
pub struct UserServiceImpl<M: UserMapper> {
    uuc: Arc<UserUseCase<M>>,
    metrics: Arc<AppMetrics>,
}

impl<M: UserMapper> UserServiceImpl<M> {
    pub fn new(uuc: Arc<UserUseCase<M>>, metrics: Arc<AppMetrics>) -> Self {
        Self { uuc, metrics }
    }

    pub fn metrics(&self) -> &Arc<AppMetrics> {
        &self.metrics
    }

    /// 获取用户信息
    #[tracing::instrument(skip_all, fields(operation = "get_user", user_id = %id))]
    pub async fn get_user(&self, Path(id): Path<UserId>) -> UserReply {
        match self.uuc.get_user_by_id(id).await {
            Ok(Some(user)) => {
                self.metrics.record_found();
                info!("Get user: {}", user.id);
                (StatusCode::OK, Json(Response::success(user.into())))
            }
            Ok(None) => {
                self.metrics.record_not_found();
                let code = ErrCode::NotFound;
                (
                    code.http_status(),
                    Json(Response::failed(code, Some(format!("user {} not found", id)))),
                )
            }
            Err(e) => {
                self.metrics.record_failed();
                error!("get user failed: {}", e);
                let code = ErrCode::DatabaseError;
                (
                    code.http_status(),
                    Json(Response::failed(code, Some("query user failed"))),
                )
            }
        }
    }
}
