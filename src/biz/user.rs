use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::delay::LookupDelay;

/// 用户主键
pub type UserId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub age: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: UserId, name: impl Into<String>, email: impl Into<String>, age: i32) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            email: email.into(),
            age,
            created_at: now,
            updated_at: now,
        }
    }
}

/// 持久层访问接口（mapper）
///
/// 记录不存在时返回 `Ok(None)`，查询失败时返回实现方自己的错误类型。
pub trait UserMapper: Send + Sync + std::fmt::Debug {
    type Error: std::error::Error + Send + Sync + 'static;

    fn select_by_primary_key(
        &self,
        id: UserId,
    ) -> impl std::future::Future<Output = Result<Option<User>, Self::Error>> + Send;
}

/// 按主键查询用户的用例
///
/// 不持有可变状态，mapper 的结果和错误原样返回。
#[derive(Debug)]
pub struct UserUseCase<M: UserMapper> {
    mapper: Arc<M>,
    delay: LookupDelay,
}

impl<M: UserMapper> UserUseCase<M> {
    pub fn new(mapper: Arc<M>) -> Self {
        Self::with_delay(mapper, LookupDelay::None)
    }

    pub fn with_delay(mapper: Arc<M>, delay: LookupDelay) -> Self {
        Self { mapper, delay }
    }

    #[instrument(skip(self))]
    pub async fn get_user_by_id(&self, id: UserId) -> Result<Option<User>, M::Error> {
        self.delay.apply().await;
        self.mapper.select_by_primary_key(id).await
    }
}

impl<M: UserMapper> Clone for UserUseCase<M> {
    fn clone(&self) -> Self {
        Self {
            mapper: Arc::clone(&self.mapper),
            delay: self.delay,
        }
    }
}
