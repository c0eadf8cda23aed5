use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::{
    announcements::repo_types::{Announcement, NewAnnouncement},
    auth::{
        claims::ROLE_STUDENT,
        repo_types::{Admin, NewUser, User},
    },
};

/// In-process store with the same uniqueness and ordering rules as the
/// Postgres schema. `failing()` makes every call error out.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail: AtomicBool,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    admins: Vec<Admin>,
    announcements: Vec<Announcement>,
}

impl MemoryStore {
    pub fn failing() -> Self {
        let store = Self::default();
        store.set_failing(true);
        store
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("connection refused (memory store in failing mode)");
        }
        Ok(())
    }

    fn tables(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Newest first; among equal timestamps the later insert comes first.
fn newest_first<T: Clone>(rows: &[T], at: impl Fn(&T) -> OffsetDateTime) -> Vec<T> {
    let mut out: Vec<T> = rows.iter().rev().cloned().collect();
    out.sort_by(|a, b| at(b).cmp(&at(a)));
    out
}

#[async_trait]
impl Store for MemoryStore {
    async fn ensure_schema(&self) -> anyhow::Result<()> {
        self.check()
    }

    async fn find_user_by_student_id_or_email(
        &self,
        student_id: &str,
        email: &str,
    ) -> anyhow::Result<Option<User>> {
        self.check()?;
        Ok(self
            .tables()
            .users
            .iter()
            .find(|u| u.student_id == student_id || u.email == email)
            .cloned())
    }

    async fn find_user_by_login(&self, identifier: &str) -> anyhow::Result<Option<User>> {
        self.check()?;
        let tables = self.tables();
        let email = identifier.to_lowercase();
        let by_student_id = tables.users.iter().find(|u| u.student_id == identifier);
        Ok(by_student_id
            .or_else(|| tables.users.iter().find(|u| u.email == email))
            .cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        self.check()?;
        Ok(self.tables().users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        self.check()?;
        let mut tables = self.tables();
        if tables
            .users
            .iter()
            .any(|u| u.student_id == user.student_id || u.email == user.email)
        {
            return Err(StoreError::UniqueViolation);
        }
        let row = User {
            id: Uuid::new_v4(),
            full_name: user.full_name,
            student_id: user.student_id,
            email: user.email,
            phone: user.phone,
            password_hash: user.password_hash,
            role: ROLE_STUDENT.into(),
            created_at: OffsetDateTime::now_utc(),
        };
        tables.users.push(row.clone());
        Ok(row)
    }

    async fn list_users(&self) -> anyhow::Result<Vec<User>> {
        self.check()?;
        Ok(newest_first(&self.tables().users, |u| u.created_at))
    }

    async fn count_users(&self) -> anyhow::Result<i64> {
        self.check()?;
        Ok(self.tables().users.len() as i64)
    }

    async fn find_admin_by_username(&self, username: &str) -> anyhow::Result<Option<Admin>> {
        self.check()?;
        Ok(self
            .tables()
            .admins
            .iter()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn insert_admin_if_absent(
        &self,
        username: &str,
        password_hash: &str,
    ) -> anyhow::Result<bool> {
        self.check()?;
        let mut tables = self.tables();
        if tables.admins.iter().any(|a| a.username == username) {
            return Ok(false);
        }
        tables.admins.push(Admin {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        });
        Ok(true)
    }

    async fn insert_announcement(
        &self,
        announcement: NewAnnouncement,
    ) -> anyhow::Result<Announcement> {
        self.check()?;
        let row = Announcement {
            id: Uuid::new_v4(),
            title: announcement.title,
            message: announcement.message,
            kind: announcement.kind,
            posted_by: announcement.posted_by,
            timestamp: OffsetDateTime::now_utc(),
        };
        self.tables().announcements.push(row.clone());
        Ok(row)
    }

    async fn list_announcements(&self) -> anyhow::Result<Vec<Announcement>> {
        self.check()?;
        Ok(newest_first(&self.tables().announcements, |a| a.timestamp))
    }
}
