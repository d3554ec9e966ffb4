use async_trait::async_trait;
use common::errors::AppError;
use common::redis::RedisTemplate;
use std::collections::HashMap;

/// 业务核心对底层存储引擎的最小依赖面
///
/// 生产环境由 Redis 实现；测试使用内存实现。
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn set_object(&self, key: &str, fields: &HashMap<String, String>) -> Result<(), AppError>;

    async fn set_object_field(&self, key: &str, field: &str, value: &str) -> Result<(), AppError>;

    /// 按字段批量读取，返回值与请求字段一一对应
    async fn get_object_fields(&self, key: &str, fields: &[&str]) -> Result<Vec<Option<String>>, AppError>;

    async fn delete_object_fields(&self, key: &str, fields: &[&str]) -> Result<(), AppError>;

    async fn object_exists(&self, key: &str) -> Result<bool, AppError>;

    async fn sorted_set_add(&self, key: &str, score: f64, member: &str) -> Result<(), AppError>;

    /// 一次写入多个 (索引键, 分值, 成员)
    async fn sorted_set_add_bulk(&self, entries: &[(String, f64, String)]) -> Result<(), AppError>;

    async fn sorted_set_score(&self, key: &str, member: &str) -> Result<Option<f64>, AppError>;

    async fn set_add(&self, key: &str, member: &str) -> Result<(), AppError>;

    async fn set_is_member(&self, key: &str, member: &str) -> Result<bool, AppError>;
}

#[derive(Debug, Clone)]
pub struct RedisObjectStore {
    template: RedisTemplate,
}

impl RedisObjectStore {
    pub fn new(template: RedisTemplate) -> Self {
        Self { template }
    }
}

#[async_trait]
impl ObjectStore for RedisObjectStore {
    async fn set_object(&self, key: &str, fields: &HashMap<String, String>) -> Result<(), AppError> {
        self.template.hset_all(key, fields).await
    }

    async fn set_object_field(&self, key: &str, field: &str, value: &str) -> Result<(), AppError> {
        self.template.hset(key, field, value).await
    }

    async fn get_object_fields(&self, key: &str, fields: &[&str]) -> Result<Vec<Option<String>>, AppError> {
        self.template.hmget(key, fields).await
    }

    async fn delete_object_fields(&self, key: &str, fields: &[&str]) -> Result<(), AppError> {
        self.template.hdel(key, fields).await
    }

    async fn object_exists(&self, key: &str) -> Result<bool, AppError> {
        self.template.exists(key).await
    }

    async fn sorted_set_add(&self, key: &str, score: f64, member: &str) -> Result<(), AppError> {
        self.template.zadd(key, score, member).await
    }

    async fn sorted_set_add_bulk(&self, entries: &[(String, f64, String)]) -> Result<(), AppError> {
        self.template.zadd_bulk(entries).await
    }

    async fn sorted_set_score(&self, key: &str, member: &str) -> Result<Option<f64>, AppError> {
        self.template.zscore(key, member).await
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<(), AppError> {
        self.template.sadd(key, member).await
    }

    async fn set_is_member(&self, key: &str, member: &str) -> Result<bool, AppError> {
        self.template.sismember(key, member).await
    }
}
