use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::cache::store::{CacheError, CacheStore};

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// 进程内缓存，语义与 Redis 子集一致；可切换为“不可用”以模拟故障
#[derive(Default)]
pub struct InMemoryCacheStore {
    entries: Mutex<HashMap<String, Entry>>,
    unavailable: AtomicBool,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 打开后所有操作都返回 `CacheError::Unavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// 清空全部条目
    pub fn flush(&self) {
        self.lock().clear();
    }

    /// 当前存活的键数
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.lock().values().filter(|e| e.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check(&self) -> Result<(), CacheError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("connection refused".into()));
        }
        Ok(())
    }

    /// 取锁并顺带清理已过期的条目
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        entries.retain(|_, e| e.is_live(now));
        entries
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.check()?;
        self.lock().insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.check()?;
        Ok(self.lock().get(key).map(|e| e.value.clone()))
    }

    async fn delete(&self, keys: &[&str]) -> Result<u64, CacheError> {
        self.check()?;
        let mut entries = self.lock();
        let removed = keys.iter().filter(|k| entries.remove(**k).is_some()).count();
        Ok(removed as u64)
    }

    async fn exists(&self, keys: &[&str]) -> Result<u64, CacheError> {
        self.check()?;
        let entries = self.lock();
        Ok(keys.iter().filter(|k| entries.contains_key(**k)).count() as u64)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, CacheError> {
        self.check()?;
        let now = Instant::now();
        Ok(self
            .lock()
            .get(key)
            .and_then(|e| e.expires_at)
            .map(|at| at.saturating_duration_since(now)))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, CacheError> {
        self.check()?;
        match self.lock().get_mut(key) {
            Some(entry) => {
                entry.expires_at = Some(Instant::now() + ttl);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn increment(&self, key: &str) -> Result<i64, CacheError> {
        self.check()?;
        let mut entries = self.lock();
        let entry = entries.entry(key.to_string()).or_insert_with(|| Entry {
            value: "0".into(),
            expires_at: None,
        });
        let next = entry
            .value
            .parse::<i64>()
            .map_err(|_| CacheError::Unavailable("value is not an integer".into()))?
            + 1;
        entry.value = next.to_string();
        Ok(next)
    }
}
