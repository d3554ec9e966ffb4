use config::Config;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::sync::Arc;
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    pub redis: Option<RedisConfig>,
    pub server: Option<ServerConfig>,
    pub sys: Option<SysConfig>,
    pub group: Option<GroupConfig>,
}
impl AppConfig {
    pub fn new(file: &String) -> Self {
        let config = Config::builder()
            .add_source(config::File::with_name(file).required(true))
            .add_source(config::Environment::with_prefix("APP").separator("_"))
            .build()
            .expect("Failed to build configuration");
        let cfg = config.try_deserialize::<AppConfig>().expect("Failed to deserialize configuration");
        return cfg;
    }
    pub fn init(file: &String) {
        let instance = Self::new(&file);
        INSTANCE.set(Arc::new(instance)).expect("INSTANCE already initialized");
    }

    pub fn get_redis(&self) -> RedisConfig {
        self.redis.clone().unwrap_or_default()
    }
    pub fn get_server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }
    pub fn get_sys(&self) -> SysConfig {
        self.sys.clone().unwrap_or_default()
    }
    pub fn get_group(&self) -> GroupConfig {
        self.group.clone().unwrap_or_default()
    }
    /// 获取单例
    pub fn get() -> Arc<Self> {
        INSTANCE.get().expect("INSTANCE is not initialized").clone()
    }
}
static INSTANCE: OnceCell<Arc<AppConfig>> = OnceCell::new();

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RedisConfig {
    pub url: String,
}
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SysConfig {
    //全局日志级别
    pub log_level: String,
    //上传文件落盘根目录
    pub upload_path: String,
    //上传文件对外 URL 前缀
    pub upload_url_base: String,
}
impl Default for SysConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            upload_path: "./data/uploads".to_string(),
            upload_url_base: "/assets/uploads".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GroupConfig {
    //群组名最大长度
    pub max_name_length: usize,
    //系统群组（不进可见索引）
    pub system_groups: Vec<String>,
}
impl Default for GroupConfig {
    fn default() -> Self {
        Self { max_name_length: 255, system_groups: default_system_groups() }
    }
}

pub fn default_system_groups() -> Vec<String> {
    [
        "registered-users",
        "verified-users",
        "unverified-users",
        "administrators",
        "Global Moderators",
        "banned-users",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
