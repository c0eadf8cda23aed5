use std::str::FromStr;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions, PgSslMode},
    PgPool,
};
use tracing::debug;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::{
    announcements::repo_types::{Announcement, NewAnnouncement},
    auth::repo_types::{Admin, NewUser, User},
    config::AppConfig,
};

const USER_COLUMNS: &str =
    "id, full_name, student_id, email, phone, password_hash, role, created_at";

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let mut options =
            PgConnectOptions::from_str(&config.database_url).context("parse DATABASE_URL")?;
        if config.production {
            // encrypted, certificate not verified
            options = options.ssl_mode(PgSslMode::Require);
        }
        let db = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect_with(options)
            .await
            .context("connect to database")?;
        Ok(Self { db })
    }
}

pub(super) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ensure_schema(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("run migrations")?;
        debug!("schema ready");
        Ok(())
    }

    async fn find_user_by_student_id_or_email(
        &self,
        student_id: &str,
        email: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE student_id = $1 OR email = $2 LIMIT 1"
        ))
        .bind(student_id)
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by student id or email")?;
        Ok(user)
    }

    async fn find_user_by_login(&self, identifier: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE student_id = $1 OR email = lower($1)
            ORDER BY (student_id = $1) DESC
            LIMIT 1
            "#
        ))
        .bind(identifier)
        .fetch_optional(&self.db)
        .await
        .context("find user by login")?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let res = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, full_name, student_id, email, phone, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&user.full_name)
        .bind(&user.student_id)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .fetch_one(&self.db)
        .await;

        match res {
            Ok(u) => Ok(u),
            Err(e) if is_unique_violation(&e) => Err(StoreError::UniqueViolation),
            Err(e) => Err(anyhow::Error::new(e).context("insert user").into()),
        }
    }

    async fn list_users(&self) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
        ))
        .fetch_all(&self.db)
        .await
        .context("list users")?;
        Ok(users)
    }

    async fn count_users(&self) -> anyhow::Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.db)
            .await
            .context("count users")?;
        Ok(count)
    }

    async fn find_admin_by_username(&self, username: &str) -> anyhow::Result<Option<Admin>> {
        let admin = sqlx::query_as::<_, Admin>(
            r#"
            SELECT id, username, password_hash
            FROM admins
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await
        .context("find admin by username")?;
        Ok(admin)
    }

    async fn insert_admin_if_absent(
        &self,
        username: &str,
        password_hash: &str,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            INSERT INTO admins (id, username, password_hash)
            VALUES ($1, $2, $3)
            ON CONFLICT (username) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .execute(&self.db)
        .await
        .context("insert admin")?;
        Ok(res.rows_affected() == 1)
    }

    async fn insert_announcement(
        &self,
        announcement: NewAnnouncement,
    ) -> anyhow::Result<Announcement> {
        let row = sqlx::query_as::<_, Announcement>(
            r#"
            INSERT INTO announcements (id, title, message, type, posted_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, message, type, posted_by, timestamp
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&announcement.title)
        .bind(&announcement.message)
        .bind(&announcement.kind)
        .bind(&announcement.posted_by)
        .fetch_one(&self.db)
        .await
        .context("insert announcement")?;
        Ok(row)
    }

    async fn list_announcements(&self) -> anyhow::Result<Vec<Announcement>> {
        let rows = sqlx::query_as::<_, Announcement>(
            r#"
            SELECT id, title, message, type, posted_by, timestamp
            FROM announcements
            ORDER BY timestamp DESC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list announcements")?;
        Ok(rows)
    }
}
