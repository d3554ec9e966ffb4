use async_trait::async_trait;
use common::errors::AppError;

use crate::biz_service::group_create_service::GroupCreateData;
use crate::entitys::group_entity::GroupInfo;

/// 群组生命周期扩展点
///
/// filter 钩子在持久化前同步执行，返回值即最终落库数据；
/// action 钩子只做通知，由调用方异步派发，不参与正确性。
#[async_trait]
pub trait GroupHooks: Send + Sync {
    async fn filter_group_create(&self, group: GroupInfo, data: &GroupCreateData) -> Result<GroupInfo, AppError>;

    async fn on_group_created(&self, group: GroupInfo);
}

#[derive(Debug, Default)]
pub struct NoopHooks;

#[async_trait]
impl GroupHooks for NoopHooks {
    async fn filter_group_create(&self, group: GroupInfo, _data: &GroupCreateData) -> Result<GroupInfo, AppError> {
        Ok(group)
    }

    async fn on_group_created(&self, _group: GroupInfo) {}
}
