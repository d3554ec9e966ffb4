use common::config::AppConfig;
use common::errors::AppError;
use log::warn;
use once_cell::sync::OnceCell;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempPath;

use crate::asset::image::extension_for_mime;
use crate::asset::{ImageService, UploadRequest, UploadService, UploadedFile, mime_from_bytes};
use crate::entitys::group_entity::{FIELD_COVER_POSITION, FIELD_COVER_THUMB_URL, FIELD_COVER_URL};
use crate::storage::GroupStore;

const ALLOWED_COVER_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/bmp"];
const COVER_THUMB_WIDTH: u32 = 358;
const COVER_BUCKET: &str = "files";
const COVER_ASSET_NAME: &str = "groupCover";

/// 封面更新入参：三种请求形态在边界处一次定型
#[derive(Debug)]
pub struct CoverUpdate {
    pub group_name: String,
    pub position: Option<String>,
    pub payload: Option<CoverPayload>,
}

#[derive(Debug)]
pub enum CoverPayload {
    /// 原始图片字节
    ImageData(Vec<u8>),
    /// 已落盘的上传文件与声明的类型
    File { path: PathBuf, mime: String },
}

/// 封面资源编排：上传、缩放、字段维护与删除
pub struct GroupCoverService {
    store: GroupStore,
    uploader: Arc<dyn UploadService>,
    images: Arc<dyn ImageService>,
    upload_path: PathBuf,
    upload_url_base: String,
}

impl std::fmt::Debug for GroupCoverService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupCoverService").finish_non_exhaustive()
    }
}

impl GroupCoverService {
    pub fn new(
        store: GroupStore,
        uploader: Arc<dyn UploadService>,
        images: Arc<dyn ImageService>,
        upload_path: impl Into<PathBuf>,
        upload_url_base: impl Into<String>,
    ) -> Self {
        Self {
            store,
            uploader,
            images,
            upload_path: upload_path.into(),
            upload_url_base: upload_url_base.into(),
        }
    }

    pub fn init(store: GroupStore, uploader: Arc<dyn UploadService>, images: Arc<dyn ImageService>, cfg: &AppConfig) {
        let sys = cfg.get_sys();
        let instance = Self::new(store, uploader, images, sys.upload_path, sys.upload_url_base);
        INSTANCE.set(Arc::new(instance)).expect("INSTANCE already initialized");
    }

    /// 获取单例
    pub fn get() -> Arc<Self> {
        INSTANCE.get().expect("INSTANCE is not initialized").clone()
    }

    /// 更新封面；仅携带 position 时退化为位置更新，返回 None
    ///
    /// 管道用到的临时文件由 `TempPath` 持有，任何一步出错都会在
    /// 返回前删除，成功路径亦然。
    pub async fn update_cover(&self, uid: &str, data: CoverUpdate) -> Result<Option<UploadedFile>, AppError> {
        let payload = match data.payload {
            Some(payload) => payload,
            None => {
                if let Some(position) = &data.position {
                    self.update_cover_position(&data.group_name, position).await?;
                    return Ok(None);
                }
                return Err(AppError::InvalidImage("no image supplied".to_string()));
            }
        };

        // 调用方提供的落盘文件同样纳入清理范围
        let (temp, mime, bytes) = match payload {
            CoverPayload::File { path, mime } => (Some(TempPath::from_path(path)), Some(mime), Vec::new()),
            CoverPayload::ImageData(bytes) => {
                let mime = mime_from_bytes(&bytes).map(|m| m.to_string());
                (None, mime, bytes)
            }
        };
        let mime = match mime {
            Some(m) if ALLOWED_COVER_TYPES.contains(&m.as_str()) => m,
            Some(m) => return Err(AppError::InvalidImage(m)),
            None => return Err(AppError::InvalidImage("unrecognized image type".to_string())),
        };

        let temp = match temp {
            Some(temp) => temp,
            None => {
                let ext = extension_for_mime(&mime).unwrap_or(".img");
                let mut file = tempfile::Builder::new().prefix("group-cover-").suffix(ext).tempfile()?;
                file.write_all(&bytes)?;
                file.into_temp_path()
            }
        };

        let ext = temp
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();

        let uploaded = self
            .uploader
            .upload(
                &format!("group-cover-{}{}", data.group_name, ext),
                COVER_BUCKET,
                UploadRequest { path: temp.to_path_buf(), uid: uid.to_string(), name: COVER_ASSET_NAME.to_string() },
            )
            .await?;
        self.store.set_group_field(&data.group_name, FIELD_COVER_URL, &uploaded.url).await?;

        self.images.resize(&temp, COVER_THUMB_WIDTH).await?;

        let thumb = self
            .uploader
            .upload(
                &format!("group-cover-thumb-{}{}", data.group_name, ext),
                COVER_BUCKET,
                UploadRequest { path: temp.to_path_buf(), uid: uid.to_string(), name: COVER_ASSET_NAME.to_string() },
            )
            .await?;
        self.store.set_group_field(&data.group_name, FIELD_COVER_THUMB_URL, &thumb.url).await?;

        if let Some(position) = &data.position {
            self.update_cover_position(&data.group_name, position).await?;
        }
        Ok(Some(uploaded))
    }

    pub async fn update_cover_position(&self, group_name: &str, position: &str) -> Result<(), AppError> {
        if group_name.is_empty() {
            return Err(AppError::InvalidData("group name is required".to_string()));
        }
        self.store.set_group_field(group_name, FIELD_COVER_POSITION, position).await
    }

    /// 删除封面资源并清空相关字段
    ///
    /// 只删除托管上传前缀下的文件；两次删除并发执行，互不阻塞，
    /// 字段清理无论删除结果如何都会执行。
    pub async fn remove_cover(&self, group_name: &str) -> Result<(), AppError> {
        let values = self.store.get_group_fields(group_name, &[FIELD_COVER_URL, FIELD_COVER_THUMB_URL]).await?;
        let prefix = format!("{}/{}/", self.upload_url_base, COVER_BUCKET);
        let (original, thumb) = futures_util::join!(
            self.delete_managed_asset(values.first().cloned().flatten(), &prefix),
            self.delete_managed_asset(values.get(1).cloned().flatten(), &prefix),
        );
        for result in [original, thumb] {
            if let Err(e) = result {
                warn!("failed to delete cover asset of group {}: {}", group_name, e);
            }
        }
        self.store
            .delete_group_fields(group_name, &[FIELD_COVER_URL, FIELD_COVER_THUMB_URL, FIELD_COVER_POSITION])
            .await
    }

    async fn delete_managed_asset(&self, url: Option<String>, prefix: &str) -> Result<(), AppError> {
        let url = match url {
            Some(u) if !u.is_empty() => u,
            _ => return Ok(()),
        };
        // 外链封面不归本服务管理，绝不删除
        if !url.starts_with(prefix) {
            return Ok(());
        }
        let filename = url.rsplit('/').next().unwrap_or("");
        if filename.is_empty() {
            return Ok(());
        }
        let path = self.upload_path.join(COVER_BUCKET).join(filename);
        self.uploader.delete(&path).await
    }
}
static INSTANCE: OnceCell<Arc<GroupCoverService>> = OnceCell::new();

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entitys::group_entity::GroupInfo;
    use crate::storage::mem_store::MemObjectStore;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Mutex;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    const GIF_MAGIC: &[u8] = b"GIF89a";

    #[derive(Default)]
    struct RecordingUploader {
        uploads: Mutex<Vec<(String, String, PathBuf)>>,
        deletes: Mutex<Vec<PathBuf>>,
        fail_delete: bool,
    }

    #[async_trait]
    impl UploadService for RecordingUploader {
        async fn upload(&self, filename: &str, bucket: &str, request: UploadRequest) -> Result<UploadedFile, AppError> {
            self.uploads
                .lock()
                .unwrap()
                .push((filename.to_string(), bucket.to_string(), request.path.clone()));
            Ok(UploadedFile { url: format!("/assets/uploads/{}/{}", bucket, filename) })
        }

        async fn delete(&self, path: &Path) -> Result<(), AppError> {
            self.deletes.lock().unwrap().push(path.to_path_buf());
            if self.fail_delete {
                return Err(AppError::FileUpload("delete refused".to_string()));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingImages {
        resizes: Mutex<Vec<(PathBuf, u32)>>,
        fail: bool,
    }

    #[async_trait]
    impl ImageService for RecordingImages {
        async fn resize(&self, path: &Path, width: u32) -> Result<(), AppError> {
            self.resizes.lock().unwrap().push((path.to_path_buf(), width));
            if self.fail {
                return Err(AppError::Internal("resize failed".to_string()));
            }
            Ok(())
        }
    }

    struct Fixture {
        mem: Arc<MemObjectStore>,
        uploader: Arc<RecordingUploader>,
        images: Arc<RecordingImages>,
        service: GroupCoverService,
    }

    fn fixture_with(uploader: RecordingUploader, images: RecordingImages) -> Fixture {
        let mem = Arc::new(MemObjectStore::new());
        let uploader = Arc::new(uploader);
        let images = Arc::new(images);
        let service = GroupCoverService::new(
            GroupStore::new(mem.clone()),
            uploader.clone(),
            images.clone(),
            "/srv/uploads",
            "/assets/uploads",
        );
        Fixture { mem, uploader, images, service }
    }

    fn fixture() -> Fixture {
        fixture_with(RecordingUploader::default(), RecordingImages::default())
    }

    async fn seed_group(mem: &Arc<MemObjectStore>, name: &str) {
        let group = GroupInfo {
            name: name.to_string(),
            slug: name.to_lowercase(),
            createtime: 1,
            private: 1,
            ..Default::default()
        };
        GroupStore::new(mem.clone()).write_group(&group).await.unwrap();
    }

    fn image_update(name: &str, bytes: Vec<u8>) -> CoverUpdate {
        CoverUpdate { group_name: name.to_string(), position: None, payload: Some(CoverPayload::ImageData(bytes)) }
    }

    #[tokio::test]
    async fn test_success_path_sets_both_urls_and_cleans_temp() {
        let f = fixture();
        seed_group(&f.mem, "devs").await;

        let uploaded = f.service.update_cover("7", image_update("devs", PNG_MAGIC.to_vec())).await.unwrap().unwrap();
        assert_eq!(uploaded.url, "/assets/uploads/files/group-cover-devs.png");

        let store = GroupStore::new(f.mem.clone());
        let fields = store.get_group_fields("devs", &[FIELD_COVER_URL, FIELD_COVER_THUMB_URL]).await.unwrap();
        assert_eq!(fields[0].as_deref(), Some("/assets/uploads/files/group-cover-devs.png"));
        assert_eq!(fields[1].as_deref(), Some("/assets/uploads/files/group-cover-thumb-devs.png"));
        assert_ne!(fields[0], fields[1]);

        let resizes = f.images.resizes.lock().unwrap();
        assert_eq!(resizes.len(), 1);
        assert_eq!(resizes[0].1, COVER_THUMB_WIDTH);

        // 原图先上传，缩略图后上传，共用同一临时文件
        let uploads = f.uploader.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 2);
        assert_eq!(uploads[0].0, "group-cover-devs.png");
        assert_eq!(uploads[1].0, "group-cover-thumb-devs.png");
        assert_eq!(uploads[0].2, uploads[1].2);
        assert!(!uploads[0].2.exists());
    }

    #[tokio::test]
    async fn test_disallowed_type_fails_without_upload() {
        let f = fixture();
        let err = f.service.update_cover("7", image_update("devs", GIF_MAGIC.to_vec())).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidImage(_)));
        assert!(f.uploader.uploads.lock().unwrap().is_empty());
        assert!(f.mem.hashes.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_disallowed_file_handle_is_deleted() {
        let f = fixture();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pending.gif");
        std::fs::write(&path, GIF_MAGIC).unwrap();

        let update = CoverUpdate {
            group_name: "devs".to_string(),
            position: None,
            payload: Some(CoverPayload::File { path: path.clone(), mime: "image/gif".to_string() }),
        };
        let err = f.service.update_cover("7", update).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidImage(_)));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_resize_failure_cleans_temp_and_leaves_thumb_unset() {
        let f = fixture_with(RecordingUploader::default(), RecordingImages { fail: true, ..Default::default() });
        seed_group(&f.mem, "devs").await;

        let err = f.service.update_cover("7", image_update("devs", PNG_MAGIC.to_vec())).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));

        // 原图 URL 已写入（可接受的瞬态），缩略图字段不存在
        let store = GroupStore::new(f.mem.clone());
        let fields = store.get_group_fields("devs", &[FIELD_COVER_URL, FIELD_COVER_THUMB_URL]).await.unwrap();
        assert!(fields[0].is_some());
        assert!(fields[1].is_none());

        let uploads = f.uploader.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 1);
        assert!(!uploads[0].2.exists());
    }

    #[tokio::test]
    async fn test_position_only_update() {
        let f = fixture();
        seed_group(&f.mem, "devs").await;
        let before = GroupStore::new(f.mem.clone()).get_group("devs").await.unwrap().unwrap();

        let update = CoverUpdate { group_name: "devs".to_string(), position: Some("50%".to_string()), payload: None };
        let result = f.service.update_cover("7", update).await.unwrap();
        assert!(result.is_none());
        assert!(f.uploader.uploads.lock().unwrap().is_empty());

        let after = GroupStore::new(f.mem.clone()).get_group("devs").await.unwrap().unwrap();
        assert_eq!(after.cover_position.as_deref(), Some("50%"));
        assert_eq!(GroupInfo { cover_position: None, ..after }, before);
    }

    #[tokio::test]
    async fn test_position_applied_after_upload() {
        let f = fixture();
        seed_group(&f.mem, "devs").await;
        let update = CoverUpdate {
            group_name: "devs".to_string(),
            position: Some("10% 20%".to_string()),
            payload: Some(CoverPayload::ImageData(PNG_MAGIC.to_vec())),
        };
        f.service.update_cover("7", update).await.unwrap();
        let group = GroupStore::new(f.mem.clone()).get_group("devs").await.unwrap().unwrap();
        assert!(group.cover_url.is_some());
        assert_eq!(group.cover_position.as_deref(), Some("10% 20%"));
    }

    #[tokio::test]
    async fn test_position_update_requires_group_name() {
        let f = fixture();
        let err = f.service.update_cover_position("", "50%").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidData(_)));
    }

    #[tokio::test]
    async fn test_no_image_and_no_position_is_invalid() {
        let f = fixture();
        let update = CoverUpdate { group_name: "devs".to_string(), position: None, payload: None };
        let err = f.service.update_cover("7", update).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidImage(_)));
    }

    #[tokio::test]
    async fn test_remove_cover_deletes_managed_assets_and_clears_fields() {
        let f = fixture();
        seed_group(&f.mem, "devs").await;
        let store = GroupStore::new(f.mem.clone());
        store.set_group_field("devs", FIELD_COVER_URL, "/assets/uploads/files/group-cover-devs.png").await.unwrap();
        store
            .set_group_field("devs", FIELD_COVER_THUMB_URL, "/assets/uploads/files/group-cover-thumb-devs.png")
            .await
            .unwrap();
        store.set_group_field("devs", FIELD_COVER_POSITION, "50%").await.unwrap();

        f.service.remove_cover("devs").await.unwrap();

        let mut deletes = f.uploader.deletes.lock().unwrap().clone();
        deletes.sort();
        assert_eq!(
            deletes,
            vec![
                PathBuf::from("/srv/uploads/files/group-cover-devs.png"),
                PathBuf::from("/srv/uploads/files/group-cover-thumb-devs.png"),
            ]
        );
        let fields = store
            .get_group_fields("devs", &[FIELD_COVER_URL, FIELD_COVER_THUMB_URL, FIELD_COVER_POSITION])
            .await
            .unwrap();
        assert!(fields.iter().all(|f| f.is_none()));
    }

    #[tokio::test]
    async fn test_remove_cover_skips_external_urls() {
        let f = fixture();
        seed_group(&f.mem, "devs").await;
        let store = GroupStore::new(f.mem.clone());
        store.set_group_field("devs", FIELD_COVER_URL, "https://cdn.example.com/cover.png").await.unwrap();

        f.service.remove_cover("devs").await.unwrap();

        assert!(f.uploader.deletes.lock().unwrap().is_empty());
        let fields = store.get_group_fields("devs", &[FIELD_COVER_URL]).await.unwrap();
        assert!(fields[0].is_none());
    }

    #[tokio::test]
    async fn test_remove_cover_clears_fields_even_when_delete_fails() {
        let f = fixture_with(RecordingUploader { fail_delete: true, ..Default::default() }, RecordingImages::default());
        seed_group(&f.mem, "devs").await;
        let store = GroupStore::new(f.mem.clone());
        store.set_group_field("devs", FIELD_COVER_URL, "/assets/uploads/files/group-cover-devs.png").await.unwrap();
        store
            .set_group_field("devs", FIELD_COVER_THUMB_URL, "/assets/uploads/files/group-cover-thumb-devs.png")
            .await
            .unwrap();

        f.service.remove_cover("devs").await.unwrap();

        // 两个删除都被尝试过
        assert_eq!(f.uploader.deletes.lock().unwrap().len(), 2);
        let fields = store.get_group_fields("devs", &[FIELD_COVER_URL, FIELD_COVER_THUMB_URL]).await.unwrap();
        assert!(fields.iter().all(|f| f.is_none()));
    }
}
