use common::errors::AppError;
use common::util::slug_util::slugify;
use once_cell::sync::Lazy;
use regex::Regex;

/// 特权组命名约定：cid:<数字|admin>:privileges:<动作>
static PRIVILEGE_GROUP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^cid:(\d+|admin):privileges:[\w\-:]+$").expect("invalid privilege group regex"));

pub fn is_privilege_group(name: &str) -> bool {
    PRIVILEGE_GROUP_RE.is_match(name)
}

/// 校验群组名，纯函数，无 I/O
///
/// 特权组豁免长度与冒号限制，其余规则一视同仁。
pub fn validate_name(name: &str, max_len: usize) -> Result<(), AppError> {
    if name.is_empty() {
        return Err(AppError::EmptyName);
    }
    if !is_privilege_group(name) && name.chars().count() > max_len {
        return Err(AppError::NameTooLong);
    }
    if name == "guests" {
        return Err(AppError::InvalidName("reserved name".to_string()));
    }
    if !is_privilege_group(name) && name.contains(':') {
        return Err(AppError::InvalidName("name may not contain ':'".to_string()));
    }
    if name.contains('/') {
        return Err(AppError::InvalidName("name may not contain '/'".to_string()));
    }
    if slugify(name).is_empty() {
        return Err(AppError::InvalidName("name has no slug".to_string()));
    }
    Ok(())
}

/// 未定型入参的校验入口：字段缺失与类型错误在这里定性
pub fn validate_name_value(name: Option<&serde_json::Value>, max_len: usize) -> Result<(), AppError> {
    match name {
        None | Some(serde_json::Value::Null) => Err(AppError::EmptyName),
        Some(serde_json::Value::String(s)) => validate_name(s, max_len),
        Some(other) => Err(AppError::InvalidType(format!("group name must be a string, got {}", other))),
    }
}
