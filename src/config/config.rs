use std::path::Path;

use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::biz::{LookupDelay, User, UserId};
use crate::Result;

/// 环境变量前缀，例如 USER_PRODUCT__SERVER__PORT=9000
pub const ENV_PREFIX: &str = "USER_PRODUCT";
/// 默认配置文件（不带扩展名，config 会自动识别格式）
pub const DEFAULT_CONFIG_PATH: &str = "config/server";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: HttpConfig,
    pub database: DatabaseConfig,
    pub lookup: LookupConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub addr: String,
    pub port: u16,
    /// 单个请求超时（秒）
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 5,
            acquire_timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapperBackend {
    #[default]
    Sql,
    Memory,
}

/// memory 后端启动时装入的用户
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub age: i32,
}

impl From<SeedUser> for User {
    fn from(seed: SeedUser) -> Self {
        User::new(seed.id, seed.name, seed.email, seed.age)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// 查询前的人为延迟（毫秒），0 为关闭
    pub delay_ms: u64,
    pub backend: MapperBackend,
    pub seed_users: Vec<SeedUser>,
}

impl LookupConfig {
    pub fn delay(&self) -> LookupDelay {
        LookupDelay::from_millis(self.delay_ms)
    }

    pub fn seed_users(&self) -> Vec<User> {
        self.seed_users.iter().cloned().map(User::from).collect()
    }
}

impl ServerConfig {
    pub fn new(addr: String, port: u16) -> Self {
        Self {
            server: HttpConfig {
                addr,
                port,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn default_for_test() -> Self {
        Self::new("127.0.0.1".to_string(), 0)
    }

    /// 加载配置：字段默认值 -> 配置文件（可选）-> 环境变量
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
        info!("Loading config from {}", path.display());

        let cfg = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<ServerConfig>()?;

        Ok(cfg)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.addr, self.server.port)
    }
}
