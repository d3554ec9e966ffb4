pub mod group_cover_service;
pub mod group_create_service;
pub mod group_index_service;

use common::config::AppConfig;
use common::redis::RedisTemplate;
use common::redis::redis_pool::get_redis_pool;
use std::sync::Arc;

use crate::asset::{DiskUploadService, ImageService};
use crate::hooks::GroupHooks;
use crate::storage::{GroupStore, RedisObjectStore};

/// 基于 Redis 连接池装配群组服务单例
pub fn init_service(cfg: &AppConfig, hooks: Arc<dyn GroupHooks>, images: Arc<dyn ImageService>) {
    let template = RedisTemplate::new(get_redis_pool().as_ref().clone());
    let store = GroupStore::new(Arc::new(RedisObjectStore::new(template)));
    let sys = cfg.get_sys();
    let uploader = Arc::new(DiskUploadService::new(sys.upload_path.clone(), sys.upload_url_base.clone()));
    group_create_service::GroupCreateService::init(store.clone(), hooks, cfg);
    group_cover_service::GroupCoverService::init(store, uploader, images, cfg);
}
