use crate::error::{Error, Result};
use crate::models::question::{Attachment, AttachmentKind};
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// Top-level partition for question media, kept from the old storage bucket.
pub const BUCKET: &str = "questions";

const IMAGE_EXTS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "svg"];
const VIDEO_EXTS: &[&str] = &["mp4", "webm", "mov"];
const FILE_EXTS: &[&str] = &["pdf", "doc", "docx", "txt", "rtf", "csv", "zip"];

/// Local-filesystem object store. Uploaded objects land under
/// `<root>/questions/<kind>s/<uuid>.<ext>` and are served back at
/// `<public_base_url>/uploads/...`.
#[derive(Clone)]
pub struct StorageService {
    root: PathBuf,
    public_base_url: String,
}

impl StorageService {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }

    pub async fn store(
        &self,
        kind: AttachmentKind,
        original_name: &str,
        data: &Bytes,
    ) -> Result<Attachment> {
        let ext = validated_extension(kind, original_name)?;
        check_magic_bytes(&ext, data)?;

        let key = object_key(kind, &ext);
        let disk_path = self.root.join(&key);
        if let Some(parent) = disk_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Internal(e.to_string()))?;
        }
        fs::write(&disk_path, data).await.map_err(|e| {
            tracing::error!(error = %e, key, "failed to write uploaded object");
            Error::Internal(format!("Failed to save file: {}", e))
        })?;

        Ok(Attachment {
            kind,
            url: self.public_url(&key),
            name: original_name.to_string(),
        })
    }

    pub fn public_url(&self, key: &str) -> String {
        format!(
            "{}/uploads/{}",
            self.public_base_url.trim_end_matches('/'),
            key
        )
    }
}

fn object_key(kind: AttachmentKind, ext: &str) -> String {
    format!("{}/{}/{}.{}", BUCKET, kind.dir_segment(), Uuid::new_v4(), ext)
}

fn validated_extension(kind: AttachmentKind, original_name: &str) -> Result<String> {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let allowed = match kind {
        AttachmentKind::Image => IMAGE_EXTS,
        AttachmentKind::Video => VIDEO_EXTS,
        AttachmentKind::File => FILE_EXTS,
    };
    if !allowed.contains(&ext.as_str()) {
        return Err(Error::BadRequest(format!(
            "File type .{} is not allowed for {} uploads",
            ext,
            kind.dir_segment()
        )));
    }

    Ok(ext)
}

fn check_magic_bytes(ext: &str, data: &Bytes) -> Result<()> {
    let valid = match ext {
        "pdf" => data.starts_with(b"%PDF"),
        "jpg" | "jpeg" => data.starts_with(&[0xFF, 0xD8]),
        "png" => data.starts_with(&[0x89, 0x50, 0x4E, 0x47]),
        _ => true,
    };
    if !valid {
        return Err(Error::BadRequest(format!(
            "File content does not match .{} extension",
            ext
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_keys_are_type_partitioned() {
        let key = object_key(AttachmentKind::Image, "png");
        assert!(key.starts_with("questions/images/"));
        assert!(key.ends_with(".png"));

        let key = object_key(AttachmentKind::Video, "mp4");
        assert!(key.starts_with("questions/videos/"));
    }

    #[test]
    fn extension_whitelist_is_per_kind() {
        assert!(validated_extension(AttachmentKind::Image, "diagram.PNG").is_ok());
        assert!(validated_extension(AttachmentKind::Image, "clip.mp4").is_err());
        assert!(validated_extension(AttachmentKind::File, "notes.pdf").is_ok());
        assert!(validated_extension(AttachmentKind::File, "payload.exe").is_err());
        assert!(validated_extension(AttachmentKind::Video, "no_extension").is_err());
    }

    #[test]
    fn magic_bytes_guard_common_types() {
        assert!(check_magic_bytes("png", &Bytes::from_static(&[0x89, 0x50, 0x4E, 0x47, 1])).is_ok());
        assert!(check_magic_bytes("png", &Bytes::from_static(b"not a png")).is_err());
        assert!(check_magic_bytes("pdf", &Bytes::from_static(b"%PDF-1.7")).is_ok());
        assert!(check_magic_bytes("txt", &Bytes::from_static(b"anything")).is_ok());
    }

    #[tokio::test]
    async fn store_writes_object_and_issues_public_url() {
        let root = std::env::temp_dir().join(format!("examstudio-store-{}", Uuid::new_v4()));
        let service = StorageService::new(&root, "http://localhost:8080/");

        let attachment = service
            .store(
                AttachmentKind::Image,
                "figure.png",
                &Bytes::from_static(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A]),
            )
            .await
            .unwrap();

        assert_eq!(attachment.name, "figure.png");
        assert!(attachment
            .url
            .starts_with("http://localhost:8080/uploads/questions/images/"));

        let key = attachment
            .url
            .strip_prefix("http://localhost:8080/uploads/")
            .unwrap();
        assert!(root.join(key).exists());

        tokio::fs::remove_dir_all(&root).await.ok();
    }
}
