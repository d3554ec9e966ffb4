use common::config::AppConfig;
use common::errors::AppError;
use common::util::date_util::now_millis;
use common::util::slug_util::slugify;
use log::info;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::biz_service::group_index_service::GroupIndexService;
use crate::entitys::group_entity::GroupInfo;
use crate::hooks::GroupHooks;
use crate::storage::GroupStore;
use crate::util::group_name::{is_privilege_group, validate_name, validate_name_value};

/// 建群入参
///
/// 布尔开关保留请求原始形态（"1" / 1 / true 均为真），入库前统一收敛。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCreateData {
    pub name: String,
    pub timestamp: Option<i64>,
    pub user_title: Option<String>,
    pub description: Option<String>,
    pub owner_uid: Option<String>,
    #[serde(default)]
    pub system: Option<Value>,
    #[serde(default)]
    pub private: Option<Value>,
    #[serde(default)]
    pub hidden: Option<Value>,
    #[serde(default)]
    pub disable_join_requests: Option<Value>,
    #[serde(default)]
    pub disable_leave: Option<Value>,
    #[serde(default)]
    pub user_title_enabled: Option<Value>,
}

impl GroupCreateData {
    /// 未定型请求体入口，name 的缺失/类型错误在这里定性
    pub fn from_value(value: Value, max_name_length: usize) -> Result<Self, AppError> {
        let obj = match &value {
            Value::Object(map) => map,
            _ => return Err(AppError::InvalidData("payload must be an object".to_string())),
        };
        validate_name_value(obj.get("name"), max_name_length)?;
        let data: GroupCreateData = serde_json::from_value(value)?;
        Ok(data)
    }
}

/// "1" / 1 / true 视为开
fn coerce_flag(value: &Option<Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok() == Some(1),
        _ => false,
    }
}

/// 群组创建编排
pub struct GroupCreateService {
    store: GroupStore,
    indexes: GroupIndexService,
    hooks: Arc<dyn GroupHooks>,
    system_groups: Vec<String>,
    max_name_length: usize,
}

impl std::fmt::Debug for GroupCreateService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupCreateService").finish_non_exhaustive()
    }
}

impl GroupCreateService {
    pub fn new(
        store: GroupStore,
        hooks: Arc<dyn GroupHooks>,
        system_groups: Vec<String>,
        max_name_length: usize,
    ) -> Self {
        let indexes = GroupIndexService::new(store.clone());
        Self { store, indexes, hooks, system_groups, max_name_length }
    }

    pub fn init(store: GroupStore, hooks: Arc<dyn GroupHooks>, cfg: &AppConfig) {
        let group_cfg = cfg.get_group();
        let instance = Self::new(store, hooks, group_cfg.system_groups, group_cfg.max_name_length);
        INSTANCE.set(Arc::new(instance)).expect("INSTANCE already initialized");
    }

    /// 获取单例
    pub fn get() -> Arc<Self> {
        INSTANCE.get().expect("INSTANCE is not initialized").clone()
    }

    fn is_system_group(&self, data: &GroupCreateData) -> bool {
        coerce_flag(&data.system)
            || self.system_groups.iter().any(|g| g == &data.name)
            || is_privilege_group(&data.name)
    }

    pub async fn create(&self, data: GroupCreateData) -> Result<GroupInfo, AppError> {
        let is_system = self.is_system_group(&data);
        let timestamp = data.timestamp.unwrap_or_else(now_millis);
        let mut disable_join_requests = coerce_flag(&data.disable_join_requests);
        if data.name == "administrators" {
            // 管理员组永远不接受加入申请
            disable_join_requests = true;
        }
        let disable_leave = coerce_flag(&data.disable_leave);
        let is_hidden = coerce_flag(&data.hidden);

        validate_name(&data.name, self.max_name_length)?;

        let slug = slugify(&data.name);
        if self.store.group_exists(&data.name).await? || self.store.user_exists(&slug).await? {
            return Err(AppError::GroupAlreadyExists(data.name.clone()));
        }

        let member_count = if data.owner_uid.is_some() { 1 } else { 0 };
        let is_private = match &data.private {
            Some(v) if !v.is_null() => coerce_flag(&data.private),
            _ => true,
        };

        let group = GroupInfo {
            name: data.name.clone(),
            slug,
            createtime: timestamp,
            user_title: data.user_title.clone().filter(|t| !t.is_empty()).unwrap_or_else(|| data.name.clone()),
            user_title_enabled: coerce_flag(&data.user_title_enabled) as u8,
            description: data.description.clone().unwrap_or_default(),
            member_count,
            hidden: is_hidden as u8,
            system: is_system as u8,
            private: is_private as u8,
            disable_join_requests: disable_join_requests as u8,
            disable_leave: disable_leave as u8,
            cover_url: None,
            cover_thumb_url: None,
            cover_position: None,
        };

        // filter 钩子的返回值才是落库数据
        let group = self.hooks.filter_group_create(group, &data).await?;

        self.indexes.add_to_creation_index(&group.name, group.createtime).await?;
        self.store.write_group(&group).await?;
        if let Some(uid) = &data.owner_uid {
            self.store.add_owner(&group.name, uid, timestamp).await?;
        }
        if group.is_visible() {
            self.indexes.add_to_visible_indexes(&group).await?;
        }
        self.store.register_slug(&group.slug, &group.name).await?;

        let created = self
            .store
            .get_group(&group.name)
            .await?
            .ok_or_else(|| AppError::Internal(format!("group {} missing after create", group.name)))?;
        info!("group created: {} (system={})", created.name, created.system);

        let hooks = self.hooks.clone();
        let notified = created.clone();
        tokio::spawn(async move {
            hooks.on_group_created(notified).await;
        });
        Ok(created)
    }
}
static INSTANCE: OnceCell<Arc<GroupCreateService>> = OnceCell::new();
