use crate::errors::AppError;
use deadpool_redis::Pool;
use deadpool_redis::redis::cmd;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct RedisTemplate {
    pub pool: Pool,
}

impl RedisTemplate {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// 批量设置哈希字段（HSET key f1 v1 f2 v2 ...）
    pub async fn hset_all(&self, key: &str, entries: &HashMap<String, String>) -> Result<(), AppError> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut conn = self.pool.get().await?;
        let mut builder = cmd("HSET");
        builder.arg(key);
        for (field, val) in entries {
            builder.arg(field).arg(val);
        }
        let _: () = builder.query_async(&mut conn).await?;
        Ok(())
    }

    /// 设置单个哈希字段（HSET）
    pub async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), AppError> {
        let mut conn = self.pool.get().await?;
        let _: () = cmd("HSET").arg(key).arg(field).arg(value).query_async(&mut conn).await?;
        Ok(())
    }

    /// 获取单个哈希字段（HGET）
    pub async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, AppError> {
        let mut conn = self.pool.get().await?;
        let val: Option<String> = cmd("HGET").arg(key).arg(field).query_async(&mut conn).await?;
        Ok(val)
    }

    /// 批量获取哈希字段（HMGET）
    pub async fn hmget(&self, key: &str, fields: &[&str]) -> Result<Vec<Option<String>>, AppError> {
        let mut conn = self.pool.get().await?;
        let vals: Vec<Option<String>> = cmd("HMGET").arg(key).arg(fields).query_async(&mut conn).await?;
        Ok(vals)
    }

    /// 删除哈希字段（HDEL）
    pub async fn hdel(&self, key: &str, fields: &[&str]) -> Result<(), AppError> {
        let mut conn = self.pool.get().await?;
        let _: i64 = cmd("HDEL").arg(key).arg(fields).query_async(&mut conn).await?;
        Ok(())
    }

    /// 有序集合添加成员（ZADD）
    pub async fn zadd(&self, key: &str, score: f64, member: &str) -> Result<(), AppError> {
        let mut conn = self.pool.get().await?;
        let _: () = cmd("ZADD").arg(key).arg(score).arg(member).query_async(&mut conn).await?;
        Ok(())
    }

    /// 多个有序集合各添加一个成员，一次管道发出
    pub async fn zadd_bulk(&self, entries: &[(String, f64, String)]) -> Result<(), AppError> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut conn = self.pool.get().await?;
        let mut pipe = deadpool_redis::redis::pipe();
        for (key, score, member) in entries {
            pipe.cmd("ZADD").arg(key).arg(*score).arg(member).ignore();
        }
        let _: () = pipe.query_async(&mut conn).await?;
        Ok(())
    }

    /// 获取有序集合成员分值（ZSCORE）
    pub async fn zscore(&self, key: &str, member: &str) -> Result<Option<f64>, AppError> {
        let mut conn = self.pool.get().await?;
        let score: Option<f64> = cmd("ZSCORE").arg(key).arg(member).query_async(&mut conn).await?;
        Ok(score)
    }

    /// 集合添加成员（SADD）
    pub async fn sadd(&self, key: &str, member: &str) -> Result<(), AppError> {
        let mut conn = self.pool.get().await?;
        let _: () = cmd("SADD").arg(key).arg(member).query_async(&mut conn).await?;
        Ok(())
    }

    /// 判断集合成员是否存在（SISMEMBER）
    pub async fn sismember(&self, key: &str, member: &str) -> Result<bool, AppError> {
        let mut conn = self.pool.get().await?;
        let exists: i64 = cmd("SISMEMBER").arg(key).arg(member).query_async(&mut conn).await?;
        Ok(exists == 1)
    }

    /// 判断键是否存在（EXISTS）
    pub async fn exists(&self, key: &str) -> Result<bool, AppError> {
        let mut conn = self.pool.get().await?;
        let exists: i64 = cmd("EXISTS").arg(key).query_async(&mut conn).await?;
        Ok(exists == 1)
    }
}
