use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tracing::instrument;

use super::db::Database;
use super::error::MapperError;
use crate::biz::{User, UserId, UserMapper};

/// 基于 SQLite 的 UserMapper
#[derive(Debug, Clone)]
pub struct SqlUserMapper {
    pool: SqlitePool,
}

impl SqlUserMapper {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    pub async fn insert(&self, user: &User) -> Result<(), MapperError> {
        sqlx::query(
            r#"INSERT INTO users (id, name, email, age, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.age)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn row_to_user(r: &SqliteRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: r.try_get("id")?,
        name: r.try_get("name")?,
        email: r.try_get("email")?,
        age: r.try_get("age")?,
        created_at: r.try_get("created_at")?,
        updated_at: r.try_get("updated_at")?,
    })
}

impl UserMapper for SqlUserMapper {
    type Error = MapperError;

    #[instrument(skip(self))]
    async fn select_by_primary_key(&self, id: UserId) -> Result<Option<User>, MapperError> {
        let row = sqlx::query(
            r#"SELECT id, name, email, age, created_at, updated_at
               FROM users WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(row_to_user(&r)?)),
            None => Ok(None),
        }
    }
}
