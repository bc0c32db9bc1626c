//! Shared fixtures for tree mutation engine tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tempfile::TempDir;
use uuid::Uuid;

use treehub_cache::{CacheManager, ImageCacheService};
use treehub_core::config::{CacheConfig, StorageConfig};
use treehub_core::error::AppError;
use treehub_core::result::AppResult;
use treehub_core::traits::{ByteStream, RemoteFetcher};
use treehub_database::MemoryMatterRepository;
use treehub_entity::image_cache::ImageCacheEntry;
use treehub_entity::matter::Matter;
use treehub_entity::user::User;
use treehub_service::MatterService;
use treehub_storage::LocalStorageProvider;

/// Serves canned bodies for known URLs and fails for everything else.
#[derive(Debug, Default)]
pub struct StubFetcher {
    bodies: HashMap<String, Vec<u8>>,
}

impl StubFetcher {
    pub fn with(mut self, url: &str, body: &[u8]) -> Self {
        self.bodies.insert(url.to_string(), body.to_vec());
        self
    }
}

#[async_trait]
impl RemoteFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> AppResult<ByteStream> {
        match self.bodies.get(url) {
            Some(body) => Ok(stream_of(body)),
            None => Err(AppError::external(format!("Failed to fetch {url}"))),
        }
    }
}

/// A service over the in-memory repository and a temp-dir matter root.
pub struct TestContext {
    pub service: MatterService,
    pub repo: Arc<MemoryMatterRepository>,
    pub images: ImageCacheService,
    pub root: TempDir,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_fetcher(StubFetcher::default()).await
    }

    pub async fn with_fetcher(fetcher: StubFetcher) -> Self {
        let root = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            matter_root: root.path().to_string_lossy().into_owned(),
            ..StorageConfig::default()
        };

        let repo = Arc::new(MemoryMatterRepository::new());
        let storage = Arc::new(LocalStorageProvider::new(root.path()).await.unwrap());
        let images = ImageCacheService::new(CacheManager::new(&CacheConfig::default()).unwrap());

        let service = MatterService::new(
            repo.clone(),
            storage,
            Arc::new(images.clone()),
            Arc::new(fetcher),
            &config,
        );

        Self {
            service,
            repo,
            images,
            root,
        }
    }

    /// Absolute on-disk location of a matter.
    pub fn disk_path(&self, matter: &Matter) -> PathBuf {
        self.service.paths().absolute_path(matter)
    }

    /// Assert a matter sits at `user_root + relative_path` on disk.
    pub fn assert_materialized(&self, matter: &Matter) {
        let expected = self
            .root
            .path()
            .join(&matter.owner_name)
            .join("root")
            .join(matter.relative_path.trim_start_matches('/'));
        let actual = self.disk_path(matter);
        assert_eq!(actual, expected);
        assert!(actual.exists(), "{} is missing on disk", actual.display());
        assert_eq!(actual.is_dir(), matter.is_directory);
    }

    /// Reload a matter from the repository.
    pub async fn reload(&self, matter: &Matter) -> Matter {
        use treehub_database::MatterRepository;
        self.repo.check_by_id(matter.id).await.unwrap()
    }

    pub async fn upload(&self, user: &User, dir: &Matter, name: &str, body: &[u8]) -> Matter {
        self.service
            .atomic_upload(stream_of(body), user, dir, name, false)
            .await
            .unwrap()
    }

    pub async fn mkdir(&self, user: &User, dir: &Matter, name: &str) -> Matter {
        self.service
            .atomic_create_directory(dir, name, user)
            .await
            .unwrap()
    }

    /// Record a derived-image artifact for a file.
    pub async fn cache_image(&self, matter: &Matter) {
        self.images
            .put(&ImageCacheEntry::new(matter.id, "fit_64_64", "cache/x.png", 10))
            .await
            .unwrap();
    }

    pub async fn has_cached_image(&self, matter: &Matter) -> bool {
        self.images.get(matter.id, "fit_64_64").await.unwrap().is_some()
    }
}

pub fn user(name: &str) -> User {
    User::new(Uuid::new_v4(), name, -1)
}

pub fn stream_of(body: &[u8]) -> ByteStream {
    let chunks: Vec<Result<Bytes, std::io::Error>> = body
        .chunks(7)
        .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
        .collect();
    Box::pin(futures::stream::iter(chunks))
}
