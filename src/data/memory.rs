use std::collections::HashMap;
use std::sync::RwLock;

use tracing::instrument;

use super::error::MapperError;
use crate::biz::{User, UserId, UserMapper};

/// 内存版 UserMapper，本地调试和测试用
#[derive(Debug, Default)]
pub struct InMemoryUserMapper {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let users = users.into_iter().map(|u| (u.id, u)).collect();
        Self {
            users: RwLock::new(users),
        }
    }

    /// 同 id 覆盖，返回旧值
    pub fn insert(&self, user: User) -> Result<Option<User>, MapperError> {
        let mut users = self
            .users
            .write()
            .map_err(|e| MapperError::Unavailable(e.to_string()))?;
        Ok(users.insert(user.id, user))
    }

    pub fn len(&self) -> usize {
        self.users.read().map(|u| u.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl UserMapper for InMemoryUserMapper {
    type Error = MapperError;

    #[instrument(skip(self))]
    async fn select_by_primary_key(&self, id: UserId) -> Result<Option<User>, MapperError> {
        let users = self
            .users
            .read()
            .map_err(|e| MapperError::Unavailable(e.to_string()))?;
        Ok(users.get(&id).cloned())
    }
}
