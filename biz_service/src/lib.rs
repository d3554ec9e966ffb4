use common::config::AppConfig;
use std::sync::Arc;

pub mod asset;
pub mod biz_service;
pub mod entitys;
pub mod hooks;
pub mod storage;
pub mod util;

use asset::ImageService;
use hooks::GroupHooks;

pub fn init_service(cfg: &AppConfig, hooks: Arc<dyn GroupHooks>, images: Arc<dyn ImageService>) {
    biz_service::init_service(cfg, hooks, images);
}
