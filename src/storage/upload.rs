use chrono::Utc;
use thiserror::Error;

use crate::config::UploadConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadRejection {
    #[error("Only image files are allowed ({0})")]
    UnsupportedType(String),

    #[error("File exceeds the {limit} byte limit")]
    TooLarge { limit: usize },

    #[error("Folder may only contain letters, digits, '-', '_' and '/'")]
    InvalidFolder,
}

/// MIME allow-list, size ceiling and key layout for uploaded images
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    max_bytes: usize,
    allowed_types: Vec<String>,
    default_folder: String,
}

impl UploadPolicy {
    pub fn from_config(config: &UploadConfig) -> Self {
        Self {
            max_bytes: config.max_bytes,
            allowed_types: config.allowed_types.clone(),
            default_folder: config.default_folder.clone(),
        }
    }

    pub fn check_content_type(&self, content_type: Option<&str>) -> Result<String, UploadRejection> {
        let raw = content_type.unwrap_or_default();
        // Drop parameters such as "; charset=binary"
        let essence = raw.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        if self.allowed_types.iter().any(|t| t == &essence) {
            Ok(essence)
        } else {
            Err(UploadRejection::UnsupportedType(if raw.is_empty() {
                "missing content type".to_string()
            } else {
                raw.to_string()
            }))
        }
    }

    pub fn check_size(&self, received: usize) -> Result<(), UploadRejection> {
        if received > self.max_bytes {
            return Err(UploadRejection::TooLarge { limit: self.max_bytes });
        }
        Ok(())
    }

    /// Blank means the default folder; otherwise `[A-Za-z0-9_-]` segments joined by '/'
    pub fn resolve_folder(&self, folder: Option<&str>) -> Result<String, UploadRejection> {
        let folder = match folder.map(|f| f.trim().trim_matches('/')) {
            None | Some("") => return Ok(self.default_folder.clone()),
            Some(f) => f,
        };
        let valid = folder.split('/').all(|segment| {
            !segment.is_empty() && segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        });
        if valid {
            Ok(folder.to_string())
        } else {
            Err(UploadRejection::InvalidFolder)
        }
    }

    /// `<folder>/<unix-ms>_<8 hex>_<sanitized name>`
    pub fn object_key(&self, folder: &str, file_name: &str) -> String {
        format!(
            "{}/{}_{:08x}_{}",
            folder,
            Utc::now().timestamp_millis(),
            rand::random::<u32>(),
            sanitize_file_name(file_name)
        )
    }
}

/// Every character outside `[A-Za-z0-9.-]` becomes '_'
pub fn sanitize_file_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    if sanitized.is_empty() {
        "file".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> UploadPolicy {
        UploadPolicy::from_config(&UploadConfig::default())
    }

    #[test]
    fn only_images_pass() {
        let p = policy();
        assert_eq!(p.check_content_type(Some("image/png")).unwrap(), "image/png");
        assert_eq!(p.check_content_type(Some("IMAGE/JPEG; q=1")).unwrap(), "image/jpeg");
        assert!(p.check_content_type(Some("text/plain")).is_err());
        assert!(p.check_content_type(Some("image/svg+xml")).is_err());
        assert!(p.check_content_type(None).is_err());
    }

    #[test]
    fn size_ceiling_is_inclusive() {
        let p = policy();
        assert!(p.check_size(5 * 1024 * 1024).is_ok());
        assert_eq!(
            p.check_size(5 * 1024 * 1024 + 1),
            Err(UploadRejection::TooLarge { limit: 5 * 1024 * 1024 })
        );
    }

    #[test]
    fn folders_are_restricted() {
        let p = policy();
        assert_eq!(p.resolve_folder(None).unwrap(), "uploads");
        assert_eq!(p.resolve_folder(Some("  ")).unwrap(), "uploads");
        assert_eq!(p.resolve_folder(Some("avatars/2024")).unwrap(), "avatars/2024");
        assert!(p.resolve_folder(Some("../etc")).is_err());
        assert!(p.resolve_folder(Some("a//b")).is_err());
    }

    #[test]
    fn keys_embed_sanitized_names() {
        assert_eq!(sanitize_file_name("my photo (1).png"), "my_photo__1_.png");
        assert_eq!(sanitize_file_name(""), "file");

        let key = policy().object_key("uploads", "a b.png");
        let (folder, rest) = key.split_once('/').unwrap();
        assert_eq!(folder, "uploads");
        let parts: Vec<_> = rest.splitn(3, '_').collect();
        assert!(parts[0].parse::<i64>().is_ok());
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2], "a_b.png");
    }
}
