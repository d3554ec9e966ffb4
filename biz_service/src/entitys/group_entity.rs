use common::errors::AppError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct GroupInfo {
    pub name: String,                       // 群组唯一名称（创建后不可变）
    pub slug: String,                       // 由名称派生的 slug
    pub createtime: i64,                    // 创建时间（毫秒时间戳）
    pub user_title: String,                 // 成员头衔展示文案
    pub user_title_enabled: u8,             // 头衔是否启用：1 / 0
    pub description: String,                // 群组描述
    pub member_count: i64,                  // 成员数量
    pub hidden: u8,                         // 是否隐藏：1 / 0
    pub system: u8,                         // 是否系统群组：1 / 0
    pub private: u8,                        // 是否私有：1 / 0
    pub disable_join_requests: u8,          // 禁止申请加入：1 / 0
    pub disable_leave: u8,                  // 禁止退出：1 / 0
    pub cover_url: Option<String>,          // 封面原图 URL（上传后才有）
    pub cover_thumb_url: Option<String>,    // 封面缩略图 URL（与原图同批写入）
    pub cover_position: Option<String>,     // 封面展示位置
}

// 哈希字段名采用对外存储布局，与结构体字段名解耦
pub const FIELD_COVER_URL: &str = "cover:url";
pub const FIELD_COVER_THUMB_URL: &str = "cover:thumb:url";
pub const FIELD_COVER_POSITION: &str = "cover:position";

impl GroupInfo {
    pub fn is_visible(&self) -> bool {
        self.hidden == 0 && self.system == 0
    }

    /// 展开为存储层的平面哈希字段
    pub fn to_field_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("name".to_string(), self.name.clone());
        map.insert("slug".to_string(), self.slug.clone());
        map.insert("createtime".to_string(), self.createtime.to_string());
        map.insert("userTitle".to_string(), self.user_title.clone());
        map.insert("userTitleEnabled".to_string(), self.user_title_enabled.to_string());
        map.insert("description".to_string(), self.description.clone());
        map.insert("memberCount".to_string(), self.member_count.to_string());
        map.insert("hidden".to_string(), self.hidden.to_string());
        map.insert("system".to_string(), self.system.to_string());
        map.insert("private".to_string(), self.private.to_string());
        map.insert("disableJoinRequests".to_string(), self.disable_join_requests.to_string());
        map.insert("disableLeave".to_string(), self.disable_leave.to_string());
        if let Some(url) = &self.cover_url {
            map.insert(FIELD_COVER_URL.to_string(), url.clone());
        }
        if let Some(url) = &self.cover_thumb_url {
            map.insert(FIELD_COVER_THUMB_URL.to_string(), url.clone());
        }
        if let Some(pos) = &self.cover_position {
            map.insert(FIELD_COVER_POSITION.to_string(), pos.clone());
        }
        map
    }

    /// 由存储层哈希字段还原实体
    pub fn from_field_map(map: &HashMap<String, String>) -> Result<Self, AppError> {
        let name = map
            .get("name")
            .cloned()
            .ok_or_else(|| AppError::InvalidData("group record has no name field".to_string()))?;
        Ok(Self {
            name,
            slug: map.get("slug").cloned().unwrap_or_default(),
            createtime: parse_i64(map, "createtime")?,
            user_title: map.get("userTitle").cloned().unwrap_or_default(),
            user_title_enabled: parse_flag(map, "userTitleEnabled")?,
            description: map.get("description").cloned().unwrap_or_default(),
            member_count: parse_i64(map, "memberCount")?,
            hidden: parse_flag(map, "hidden")?,
            system: parse_flag(map, "system")?,
            private: parse_flag(map, "private")?,
            disable_join_requests: parse_flag(map, "disableJoinRequests")?,
            disable_leave: parse_flag(map, "disableLeave")?,
            cover_url: map.get(FIELD_COVER_URL).cloned(),
            cover_thumb_url: map.get(FIELD_COVER_THUMB_URL).cloned(),
            cover_position: map.get(FIELD_COVER_POSITION).cloned(),
        })
    }
}

fn parse_i64(map: &HashMap<String, String>, field: &str) -> Result<i64, AppError> {
    match map.get(field) {
        Some(v) => v
            .parse::<i64>()
            .map_err(|_| AppError::InvalidData(format!("field {} is not a number: {}", field, v))),
        None => Ok(0),
    }
}

fn parse_flag(map: &HashMap<String, String>, field: &str) -> Result<u8, AppError> {
    Ok(if map.get(field).map(|v| v == "1").unwrap_or(false) { 1 } else { 0 })
}
