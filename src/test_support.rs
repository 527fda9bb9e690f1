// In-memory doubles for the source and destination services.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;

use crate::disk::{DestinationService, DiskError, FolderStatus, UploadLink};
use crate::vk::responses::Likes;
use crate::vk::{PhotosPage, PhotosQuery, RawPhoto, SizeVariant, SourceService, VkError};

/// Build a photo with a single size variant of `kind` pointing at `url`.
pub fn raw_photo(id: i64, likes: u64, date: i64, kind: &str, url: &str) -> RawPhoto {
    RawPhoto {
        id: Some(id),
        date: Some(date),
        likes: Some(Likes { count: likes }),
        sizes: vec![SizeVariant {
            kind: kind.to_string(),
            url: url.to_string(),
        }],
    }
}

/// Serves a fixed album in offset/count pages.
pub struct MockSource {
    total: u64,
    items: Vec<RawPhoto>,
    error: Option<(i64, String)>,
    calls: Mutex<usize>,
}

impl MockSource {
    pub fn new(items: Vec<RawPhoto>) -> Self {
        Self {
            total: items.len() as u64,
            items,
            error: None,
            calls: Mutex::new(0),
        }
    }

    pub fn failing(code: i64, message: &str) -> Self {
        Self {
            total: 0,
            items: Vec::new(),
            error: Some((code, message.to_string())),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl SourceService for MockSource {
    async fn photos(&self, query: &PhotosQuery) -> Result<PhotosPage, VkError> {
        *self.calls.lock().unwrap() += 1;
        if let Some((code, message)) = &self.error {
            return Err(VkError::Api {
                code: *code,
                message: message.clone(),
            });
        }
        let start = (query.offset as usize).min(self.items.len());
        let end = (start + query.count as usize).min(self.items.len());
        Ok(PhotosPage {
            count: self.total,
            items: self.items[start..end].to_vec(),
        })
    }
}

/// Records every call and keeps uploaded bytes keyed by disk path.
#[derive(Default)]
pub struct MockDisk {
    folder_exists: bool,
    folder_error: Option<u16>,
    /// Disk paths whose upload link request is rejected with 409.
    pub reject: HashSet<String>,
    calls: Mutex<Vec<String>>,
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MockDisk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folder creation answers "already exists".
    pub fn existing_folder() -> Self {
        Self {
            folder_exists: true,
            ..Self::default()
        }
    }

    /// Folder creation fails with the given HTTP status.
    pub fn failing_folder(status: u16) -> Self {
        Self {
            folder_error: Some(status),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(path).cloned()
    }

    pub fn file_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl DestinationService for MockDisk {
    async fn create_folder(&self, path: &str) -> Result<FolderStatus, DiskError> {
        self.calls.lock().unwrap().push(format!("create {path}"));
        if let Some(status) = self.folder_error {
            return Err(DiskError::Api {
                status,
                message: "UnauthorizedError".into(),
            });
        }
        if self.folder_exists {
            Ok(FolderStatus::AlreadyExists)
        } else {
            Ok(FolderStatus::Created)
        }
    }

    async fn upload_link(&self, path: &str) -> Result<UploadLink, DiskError> {
        self.calls.lock().unwrap().push(format!("link {path}"));
        if self.reject.contains(path) {
            return Err(DiskError::Api {
                status: 409,
                message: "DiskResourceAlreadyExistsError".into(),
            });
        }
        Ok(UploadLink {
            href: path.to_string(),
            method: "PUT".into(),
            templated: false,
        })
    }

    async fn upload(&self, link: &UploadLink, file: &Path) -> Result<(), DiskError> {
        self.calls.lock().unwrap().push(format!("upload {}", link.href));
        let bytes = tokio::fs::read(file).await?;
        self.files.lock().unwrap().insert(link.href.clone(), bytes);
        Ok(())
    }
}
