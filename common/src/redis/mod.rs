pub mod redis_pool;
pub mod redis_template;

pub use redis_template::RedisTemplate;

pub type RedisPool = deadpool_redis::Pool;
