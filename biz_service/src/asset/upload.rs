use async_trait::async_trait;
use common::errors::AppError;
use log::warn;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub path: PathBuf,      // 待上传的本地文件
    pub uid: String,        // 操作人
    pub name: String,       // 资源逻辑名（如 groupCover）
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub url: String,
}

/// 文件上传协作方
#[async_trait]
pub trait UploadService: Send + Sync {
    async fn upload(&self, filename: &str, bucket: &str, request: UploadRequest) -> Result<UploadedFile, AppError>;

    /// 幂等删除：目标不存在不算错误
    async fn delete(&self, path: &Path) -> Result<(), AppError>;
}

/// 本地磁盘上传实现：拷贝到上传根目录并返回对外 URL
#[derive(Debug, Clone)]
pub struct DiskUploadService {
    upload_path: PathBuf,
    upload_url_base: String,
}

impl DiskUploadService {
    pub fn new(upload_path: impl Into<PathBuf>, upload_url_base: impl Into<String>) -> Self {
        Self { upload_path: upload_path.into(), upload_url_base: upload_url_base.into() }
    }
}

#[async_trait]
impl UploadService for DiskUploadService {
    async fn upload(&self, filename: &str, bucket: &str, request: UploadRequest) -> Result<UploadedFile, AppError> {
        let dir = self.upload_path.join(bucket);
        tokio::fs::create_dir_all(&dir).await?;
        let dest = dir.join(filename);
        tokio::fs::copy(&request.path, &dest)
            .await
            .map_err(|e| AppError::FileUpload(format!("{}: {}", filename, e)))?;
        Ok(UploadedFile { url: format!("{}/{}/{}", self.upload_url_base, bucket, filename) })
    }

    async fn delete(&self, path: &Path) -> Result<(), AppError> {
        match tokio::fs::remove_file(path).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                warn!("failed to delete upload {}: {}", path.display(), e);
                Err(AppError::Io(e))
            }
        }
    }
}
