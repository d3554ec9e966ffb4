use common::errors::AppError;

use crate::entitys::group_entity::GroupInfo;
use crate::storage::GroupStore;
use crate::storage::group_store::{
    KEY_GROUPS_CREATETIME, KEY_VISIBLE_CREATETIME, KEY_VISIBLE_MEMBER_COUNT, KEY_VISIBLE_NAME,
};

/// 群组二级索引维护
///
/// 可见索引只收录既非隐藏也非系统的群组，收录与否由创建流程判定。
#[derive(Clone)]
pub struct GroupIndexService {
    store: GroupStore,
}

impl GroupIndexService {
    pub fn new(store: GroupStore) -> Self {
        Self { store }
    }

    pub async fn add_to_creation_index(&self, name: &str, createtime: i64) -> Result<(), AppError> {
        self.store.inner().sorted_set_add(KEY_GROUPS_CREATETIME, createtime as f64, name).await
    }

    /// 三个可见索引在同一逻辑步骤内批量写入
    pub async fn add_to_visible_indexes(&self, group: &GroupInfo) -> Result<(), AppError> {
        let entries = vec![
            (KEY_VISIBLE_CREATETIME.to_string(), group.createtime as f64, group.name.clone()),
            (KEY_VISIBLE_MEMBER_COUNT.to_string(), group.member_count as f64, group.name.clone()),
            (KEY_VISIBLE_NAME.to_string(), 0.0, format!("{}:{}", group.name.to_lowercase(), group.name)),
        ];
        self.store.inner().sorted_set_add_bulk(&entries).await
    }
}
