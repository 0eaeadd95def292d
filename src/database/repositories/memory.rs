use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use crate::database::StoreError;
use crate::database::models::user::{NewUser, UserEntity};
use crate::database::repositories::user::UserRepository;

#[derive(Default)]
struct Table {
    next_id: i64,
    rows: BTreeMap<i64, UserEntity>,
}

impl Table {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.rows
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

/// 内存中的用户存储，唯一约束与数据库一致，用于测试和本地开发
#[derive(Default)]
pub struct InMemoryUserRepository {
    table: Mutex<Table>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<UserEntity, StoreError> {
        let mut table = self.lock();
        if table.email_taken(&user.email, None) {
            return Err(StoreError::DuplicateEmail);
        }

        table.next_id += 1;
        let now = Utc::now();
        let entity = UserEntity {
            id: table.next_id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserEntity>, StoreError> {
        Ok(self.lock().rows.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, StoreError> {
        Ok(self.lock().rows.values().find(|u| u.email == email).cloned())
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<(Vec<UserEntity>, i64), StoreError> {
        let table = self.lock();
        let users = table
            .rows
            .values()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok((users, table.rows.len() as i64))
    }

    async fn update(&self, user: &UserEntity) -> Result<UserEntity, StoreError> {
        let mut table = self.lock();
        if !table.rows.contains_key(&user.id) {
            return Err(StoreError::NotFound);
        }
        if table.email_taken(&user.email, Some(user.id)) {
            return Err(StoreError::DuplicateEmail);
        }

        let mut updated = user.clone();
        updated.updated_at = Utc::now();
        table.rows.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        match self.lock().rows.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }
}
