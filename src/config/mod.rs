mod config;

pub use config::{
    DatabaseConfig, HttpConfig, LookupConfig, MapperBackend, SeedUser, ServerConfig,
    DEFAULT_CONFIG_PATH, ENV_PREFIX,
};
