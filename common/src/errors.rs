use actix_web::{HttpResponse, ResponseError};
use deadpool_redis::PoolError;
use deadpool_redis::redis::RedisError;
use log::error;
use serde::Serialize;
use std::io;
use thiserror::Error;
/// HTTP 错误响应结构
#[derive(Serialize)]
struct ErrorResponse {
    code: u16,
    message: String,
}

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    // ==== 群组名校验错误 ====
    #[error("group name is required")]
    EmptyName,

    #[error("invalid field type: {0}")]
    InvalidType(String),

    #[error("group name too long")]
    NameTooLong,

    #[error("invalid group name: {0}")]
    InvalidName(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    // ==== 冲突 ====
    #[error("group already exists: {0}")]
    GroupAlreadyExists(String),

    // ==== 封面资源错误 ====
    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("file upload failed: {0}")]
    FileUpload(String),

    // ==== 系统错误 ====
    #[error("Redis pool error: {0}")]
    RedisPoolError(#[from] PoolError),
    #[error("Redis error: {0}")]
    Redis(#[from] RedisError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Internal server error")]
    Internal(String),
}
impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status, msg) = match self {
            AppError::EmptyName
            | AppError::InvalidType(_)
            | AppError::NameTooLong
            | AppError::InvalidName(_)
            | AppError::InvalidData(_)
            | AppError::InvalidImage(_) => (actix_web::http::StatusCode::BAD_REQUEST, self.to_string()),
            AppError::GroupAlreadyExists(_) => (actix_web::http::StatusCode::CONFLICT, self.to_string()),
            AppError::FileUpload(_) => (actix_web::http::StatusCode::BAD_GATEWAY, self.to_string()),
            AppError::RedisPoolError(e) => {
                error!("{:?}", e);
                (actix_web::http::StatusCode::INTERNAL_SERVER_ERROR, "Service error".to_string())
            }
            AppError::Redis(e) => {
                error!("{:?}", e);
                (actix_web::http::StatusCode::INTERNAL_SERVER_ERROR, "Service error".to_string())
            }
            AppError::Json(e) => {
                error!("{:?}", e);
                (actix_web::http::StatusCode::INTERNAL_SERVER_ERROR, "Service error".to_string())
            }
            AppError::Io(e) => {
                error!("{:?}", e);
                (actix_web::http::StatusCode::INTERNAL_SERVER_ERROR, "Service error".to_string())
            }
            AppError::Internal(e) => {
                error!("{:?}", e);
                (actix_web::http::StatusCode::INTERNAL_SERVER_ERROR, "Service error".to_string())
            }
        };

        HttpResponse::build(status).json(ErrorResponse { code: status.as_u16(), message: msg })
    }
}
