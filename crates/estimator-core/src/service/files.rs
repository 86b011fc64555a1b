//! Photo and drawing attachments for estimates.
//!
//! Only metadata is stored here. The bytes live in external storage under
//! `storage_path`; drafting turns those paths into URLs for the generator.

use tracing::{debug, info};
use uuid::Uuid;

use super::{required, EstimateService};
use crate::auth::Session;
use crate::error::{EstimatorError, Result};
use crate::invalidation::Invalidation;
use crate::storage::{EstimateFile, NewEstimateFile, StorageEngine};

/// Used when the uploader did not report a content type.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// User-supplied attachment metadata.
#[derive(Debug, Clone, Default)]
pub struct FileInput {
    pub storage_path: String,
    pub file_name: String,
    pub file_size: i64,
    pub mime_type: Option<String>,
}

impl FileInput {
    pub fn new(storage_path: impl Into<String>, file_name: impl Into<String>, size: i64) -> Self {
        Self {
            storage_path: storage_path.into(),
            file_name: file_name.into(),
            file_size: size,
            mime_type: None,
        }
    }

    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// Storage key for a new upload: `{project}/{estimate}/{random}.{ext}`.
///
/// The extension is taken from `file_name`, lowercased, and falls back to
/// `jpg`.
pub fn storage_path_for(project_id: &Uuid, estimate_id: &Uuid, file_name: &str) -> String {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.trim().to_lowercase())
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| "jpg".to_string());
    format!("{}/{}/{}.{}", project_id, estimate_id, Uuid::new_v4(), ext)
}

/// Resolve a stored path to a fetchable URL. Paths that are already URLs pass
/// through; others are joined onto `base_url`. Returns `None` when there is
/// no base to join onto.
pub fn file_url(storage_path: &str, base_url: Option<&str>) -> Option<String> {
    let path = storage_path.trim();
    if path.starts_with("http://") || path.starts_with("https://") {
        return Some(path.to_string());
    }
    let base = base_url.map(str::trim).filter(|base| !base.is_empty())?;
    Some(format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    ))
}

impl<S: StorageEngine> EstimateService<S> {
    /// Record an uploaded file against an estimate.
    pub fn attach_estimate_file(
        &mut self,
        session: &Session,
        estimate_id: &Uuid,
        input: &FileInput,
    ) -> Result<Uuid> {
        let actor = session.require_actor()?;
        let storage_path = required(&input.storage_path, "Storage path")?;
        let file_name = required(&input.file_name, "File name")?;
        if input.file_size < 0 {
            return Err(EstimatorError::Validation(
                "File size cannot be negative".to_string(),
            ));
        }
        let mime_type = input
            .mime_type
            .as_deref()
            .map(str::trim)
            .filter(|mime| !mime.is_empty())
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();
        let estimate = self.require_estimate(estimate_id)?;

        let id = self.storage.insert_estimate_file(&NewEstimateFile {
            estimate_id: *estimate_id,
            storage_path,
            file_name,
            file_size: input.file_size,
            mime_type,
            uploaded_by: actor.id,
        })?;

        info!(%id, %estimate_id, "attached estimate file");
        self.emit(&Invalidation::for_estimate(
            estimate.project_id,
            Some(*estimate_id),
        ));
        Ok(id)
    }

    /// An estimate's attachments, oldest first.
    pub fn list_estimate_files(&self, estimate_id: &Uuid) -> Result<Vec<EstimateFile>> {
        self.require_estimate(estimate_id)?;
        self.storage.list_estimate_files(estimate_id)
    }

    /// Fetch an attachment, failing unless it belongs to `estimate_id`.
    pub fn get_estimate_file(&self, estimate_id: &Uuid, id: &Uuid) -> Result<EstimateFile> {
        match self.storage.get_estimate_file(id)? {
            Some(file) if file.estimate_id == *estimate_id => Ok(file),
            _ => Err(EstimatorError::NotFound(format!(
                "File {} not found in estimate {}",
                id, estimate_id
            ))),
        }
    }

    /// Remove an attachment's record. Returns it so the caller can remove
    /// the stored bytes.
    pub fn delete_estimate_file(
        &mut self,
        session: &Session,
        estimate_id: &Uuid,
        id: &Uuid,
    ) -> Result<EstimateFile> {
        session.require_actor()?;
        let estimate = self.require_estimate(estimate_id)?;
        let file = self.get_estimate_file(estimate_id, id)?;

        self.storage.delete_estimate_file(id)?;

        info!(%id, %estimate_id, "deleted estimate file");
        self.emit(&Invalidation::for_estimate(
            estimate.project_id,
            Some(*estimate_id),
        ));
        Ok(file)
    }

    /// URLs of an estimate's attachments, in upload order. Files whose path
    /// cannot be resolved are skipped.
    pub fn attachment_urls(
        &self,
        estimate_id: &Uuid,
        base_url: Option<&str>,
    ) -> Result<Vec<String>> {
        let files = self.list_estimate_files(estimate_id)?;
        let mut urls = Vec::with_capacity(files.len());
        for file in &files {
            match file_url(&file.storage_path, base_url) {
                Some(url) => urls.push(url),
                None => debug!(file_id = %file.id, "no base url for attachment; skipped"),
            }
        }
        Ok(urls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_path_keeps_lowercase_extension() {
        let project_id = Uuid::new_v4();
        let estimate_id = Uuid::new_v4();
        let path = storage_path_for(&project_id, &estimate_id, "Front Elevation.PNG");
        assert!(path.starts_with(&format!("{}/{}/", project_id, estimate_id)));
        assert!(path.ends_with(".png"));
        assert!(storage_path_for(&project_id, &estimate_id, "scan").ends_with(".jpg"));
    }

    #[test]
    fn test_file_url_joins_base() {
        assert_eq!(
            file_url("p/e/a.jpg", Some("https://files.example.com/")).as_deref(),
            Some("https://files.example.com/p/e/a.jpg")
        );
        assert_eq!(
            file_url("https://cdn.example.com/a.jpg", None).as_deref(),
            Some("https://cdn.example.com/a.jpg")
        );
        assert!(file_url("p/e/a.jpg", None).is_none());
        assert!(file_url("p/e/a.jpg", Some("  ")).is_none());
    }
}
