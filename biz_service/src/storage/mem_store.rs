use async_trait::async_trait;
use common::errors::AppError;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

use super::object_store::ObjectStore;

/// 测试用内存存储，语义对齐 Redis 的 hash / zset / set
#[derive(Debug, Default)]
pub struct MemObjectStore {
    pub hashes: RwLock<HashMap<String, HashMap<String, String>>>,
    pub zsets: RwLock<HashMap<String, HashMap<String, f64>>>,
    pub sets: RwLock<HashMap<String, HashSet<String>>>,
}

impl MemObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn zset_members(&self, key: &str) -> Vec<String> {
        self.zsets
            .read()
            .await
            .get(key)
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ObjectStore for MemObjectStore {
    async fn set_object(&self, key: &str, fields: &HashMap<String, String>) -> Result<(), AppError> {
        let mut hashes = self.hashes.write().await;
        hashes.entry(key.to_string()).or_default().extend(fields.clone());
        Ok(())
    }

    async fn set_object_field(&self, key: &str, field: &str, value: &str) -> Result<(), AppError> {
        let mut hashes = self.hashes.write().await;
        hashes
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn get_object_fields(&self, key: &str, fields: &[&str]) -> Result<Vec<Option<String>>, AppError> {
        let hashes = self.hashes.read().await;
        let map = hashes.get(key);
        Ok(fields
            .iter()
            .map(|f| map.and_then(|m| m.get(*f).cloned()))
            .collect())
    }

    async fn delete_object_fields(&self, key: &str, fields: &[&str]) -> Result<(), AppError> {
        let mut hashes = self.hashes.write().await;
        if let Some(map) = hashes.get_mut(key) {
            for field in fields {
                map.remove(*field);
            }
        }
        Ok(())
    }

    async fn object_exists(&self, key: &str) -> Result<bool, AppError> {
        let hashes = self.hashes.read().await;
        Ok(hashes.get(key).map(|m| !m.is_empty()).unwrap_or(false))
    }

    async fn sorted_set_add(&self, key: &str, score: f64, member: &str) -> Result<(), AppError> {
        let mut zsets = self.zsets.write().await;
        zsets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string(), score);
        Ok(())
    }

    async fn sorted_set_add_bulk(&self, entries: &[(String, f64, String)]) -> Result<(), AppError> {
        let mut zsets = self.zsets.write().await;
        for (key, score, member) in entries {
            zsets.entry(key.clone()).or_default().insert(member.clone(), *score);
        }
        Ok(())
    }

    async fn sorted_set_score(&self, key: &str, member: &str) -> Result<Option<f64>, AppError> {
        let zsets = self.zsets.read().await;
        Ok(zsets.get(key).and_then(|m| m.get(member).copied()))
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<(), AppError> {
        let mut sets = self.sets.write().await;
        sets.entry(key.to_string()).or_default().insert(member.to_string());
        Ok(())
    }

    async fn set_is_member(&self, key: &str, member: &str) -> Result<bool, AppError> {
        let sets = self.sets.read().await;
        Ok(sets.get(key).map(|s| s.contains(member)).unwrap_or(false))
    }
}
