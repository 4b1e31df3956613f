use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use strata_schema::{EntitySchema, FieldDescriptor};

/// (tenant, entity, column) tuple identifying one cached schema. Entity-level
/// schemas carry no column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub tenant: String,
    pub entity: String,
    pub column: Option<String>,
}

impl CacheKey {
    pub fn dynamic(tenant: &str, entity: &str, column: &str) -> Self {
        Self {
            tenant: tenant.to_string(),
            entity: entity.to_string(),
            column: Some(column.to_string()),
        }
    }

    pub fn entity(tenant: &str, entity: &str) -> Self {
        Self {
            tenant: tenant.to_string(),
            entity: entity.to_string(),
            column: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CachedSchema {
    Fields(Vec<FieldDescriptor>),
    Entity(EntitySchema),
}

struct Entry {
    value: CachedSchema,
    fetched_at: Instant,
}

/// Time-bounded schema cache. Expiry is checked lazily on `get`; a stale hit
/// removes the entry so memory stays bounded without a sweeper.
#[derive(Default)]
pub struct SchemaCache {
    entries: Mutex<HashMap<CacheKey, Entry>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, Entry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, key: &CacheKey, ttl: Duration) -> Option<CachedSchema> {
        let mut entries = self.entries();
        match entries.get(key) {
            Some(entry) if entry.fetched_at.elapsed() < ttl => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn set(&self, key: CacheKey, value: CachedSchema) {
        self.entries().insert(
            key,
            Entry {
                value,
                fetched_at: Instant::now(),
            },
        );
    }

    pub fn invalidate_all(&self) {
        self.entries().clear();
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}
