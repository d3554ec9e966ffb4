use common::errors::AppError;
use std::collections::HashMap;
use std::sync::Arc;

use crate::entitys::group_entity::GroupInfo;
use super::object_store::ObjectStore;

// 索引键布局
pub const KEY_GROUPS_CREATETIME: &str = "groups:createtime";
pub const KEY_VISIBLE_CREATETIME: &str = "groups:visible:createtime";
pub const KEY_VISIBLE_MEMBER_COUNT: &str = "groups:visible:memberCount";
pub const KEY_VISIBLE_NAME: &str = "groups:visible:name";
pub const KEY_SLUG_TO_NAME: &str = "groupslug:groupname";
pub const KEY_USER_SLUGS: &str = "userslug:uid";

pub fn group_key(name: &str) -> String {
    format!("group:{}", name)
}
pub fn owners_key(name: &str) -> String {
    format!("group:{}:owners", name)
}
pub fn members_key(name: &str) -> String {
    format!("group:{}:members", name)
}

/// 群组记录与关联集合的存储门面
#[derive(Clone)]
pub struct GroupStore {
    store: Arc<dyn ObjectStore>,
}

impl GroupStore {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    pub fn inner(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    pub async fn write_group(&self, group: &GroupInfo) -> Result<(), AppError> {
        self.store.set_object(&group_key(&group.name), &group.to_field_map()).await
    }

    pub async fn get_group(&self, name: &str) -> Result<Option<GroupInfo>, AppError> {
        const FIELDS: [&str; 15] = [
            "name",
            "slug",
            "createtime",
            "userTitle",
            "userTitleEnabled",
            "description",
            "memberCount",
            "hidden",
            "system",
            "private",
            "disableJoinRequests",
            "disableLeave",
            "cover:url",
            "cover:thumb:url",
            "cover:position",
        ];
        let values = self.store.get_object_fields(&group_key(name), &FIELDS).await?;
        let mut map = HashMap::new();
        for (field, value) in FIELDS.iter().zip(values) {
            if let Some(v) = value {
                map.insert(field.to_string(), v);
            }
        }
        if map.is_empty() {
            return Ok(None);
        }
        Ok(Some(GroupInfo::from_field_map(&map)?))
    }

    pub async fn get_group_fields(&self, name: &str, fields: &[&str]) -> Result<Vec<Option<String>>, AppError> {
        self.store.get_object_fields(&group_key(name), fields).await
    }

    pub async fn set_group_field(&self, name: &str, field: &str, value: &str) -> Result<(), AppError> {
        self.store.set_object_field(&group_key(name), field, value).await
    }

    pub async fn delete_group_fields(&self, name: &str, fields: &[&str]) -> Result<(), AppError> {
        self.store.delete_object_fields(&group_key(name), fields).await
    }

    pub async fn group_exists(&self, name: &str) -> Result<bool, AppError> {
        self.store.object_exists(&group_key(name)).await
    }

    /// 用户 slug 是否已被占用（与群组名共用命名空间）
    pub async fn user_exists(&self, slug: &str) -> Result<bool, AppError> {
        Ok(self.store.sorted_set_score(KEY_USER_SLUGS, slug).await?.is_some())
    }

    pub async fn add_owner(&self, name: &str, uid: &str, timestamp: i64) -> Result<(), AppError> {
        self.store.set_add(&owners_key(name), uid).await?;
        self.store.sorted_set_add(&members_key(name), timestamp as f64, uid).await
    }

    pub async fn is_owner(&self, name: &str, uid: &str) -> Result<bool, AppError> {
        self.store.set_is_member(&owners_key(name), uid).await
    }

    pub async fn register_slug(&self, slug: &str, name: &str) -> Result<(), AppError> {
        self.store.set_object_field(KEY_SLUG_TO_NAME, slug, name).await
    }

    pub async fn name_by_slug(&self, slug: &str) -> Result<Option<String>, AppError> {
        let values = self.store.get_object_fields(KEY_SLUG_TO_NAME, &[slug]).await?;
        Ok(values.into_iter().next().flatten())
    }
}
