//! Matter creation, upload and lookup.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use treehub_core::config::StorageConfig;
use treehub_core::error::AppError;
use treehub_core::result::AppResult;
use treehub_core::traits::{ByteStream, ImageCacheInvalidator, RemoteFetcher, StorageProvider};
use treehub_core::types::human_size;
use treehub_database::MatterRepository;
use treehub_entity::matter::{CreateMatter, Matter, MatterDetail, MatterFilter};
use treehub_entity::user::User;
use treehub_storage::PathResolver;

use super::detail::DetailAssembler;
use super::validate;
use crate::lock::UserLockManager;

/// The tree mutation engine.
///
/// Methods without the `atomic_` prefix never take the per-user lock and
/// must only be reached by a caller that already holds it.
#[derive(Clone)]
pub struct MatterService {
    pub(crate) repo: Arc<dyn MatterRepository>,
    pub(crate) storage: Arc<dyn StorageProvider>,
    pub(crate) images: Arc<dyn ImageCacheInvalidator>,
    pub(crate) fetcher: Arc<dyn RemoteFetcher>,
    pub(crate) paths: PathResolver,
    pub(crate) locks: UserLockManager,
    pub(crate) details: DetailAssembler,
    pub(crate) name_max_length: usize,
    pub(crate) max_depth: usize,
}

impl std::fmt::Debug for MatterService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatterService")
            .field("storage", &self.storage.provider_type())
            .field("matter_root", self.paths.matter_root())
            .finish()
    }
}

impl MatterService {
    /// Creates a new matter service.
    pub fn new(
        repo: Arc<dyn MatterRepository>,
        storage: Arc<dyn StorageProvider>,
        images: Arc<dyn ImageCacheInvalidator>,
        fetcher: Arc<dyn RemoteFetcher>,
        config: &StorageConfig,
    ) -> Self {
        Self {
            details: DetailAssembler::new(Arc::clone(&repo)),
            repo,
            storage,
            images,
            fetcher,
            paths: PathResolver::from_config(config),
            locks: UserLockManager::new(),
            name_max_length: config.name_max_length,
            max_depth: config.max_depth,
        }
    }

    /// The per-user lock manager guarding the `atomic_*` entry points.
    pub fn locks(&self) -> &UserLockManager {
        &self.locks
    }

    /// The path resolver for this service's matter root.
    pub fn paths(&self) -> &PathResolver {
        &self.paths
    }

    /// Load a matter with its ancestor chain.
    pub async fn detail(&self, id: Uuid) -> AppResult<MatterDetail> {
        self.details.detail(id).await
    }

    /// Attach the ancestor chain to an already loaded matter.
    pub async fn wrap_detail(&self, matter: Matter) -> AppResult<MatterDetail> {
        self.details.wrap_detail(matter).await
    }

    /// Resolve an absolute virtual path of `user` to a matter.
    ///
    /// `/` resolves to the synthesized root without a repository lookup.
    pub async fn find_by_path(&self, user: &User, path: &str) -> AppResult<Matter> {
        if !path.starts_with('/') {
            return Err(AppError::validation("Path must start with '/'"));
        }
        let path = path.trim_end_matches('/');
        if path.is_empty() {
            return Ok(Matter::root(user));
        }
        self.repo
            .find_by_owner_and_path(user.id, path)
            .await?
            .ok_or_else(|| AppError::not_found(format!("'{path}' not found")))
    }

    /// List the children of `dir`, directories first.
    pub async fn list(
        &self,
        user: &User,
        dir: &Matter,
        filter: &MatterFilter,
    ) -> AppResult<Vec<Matter>> {
        require_directory_of(dir, user)?;
        self.repo.list_children(dir.id, user.id, filter).await
    }

    /// Reload a caller-supplied matter so decisions use the stored state.
    pub(crate) async fn refresh(&self, matter: &Matter) -> AppResult<Matter> {
        if matter.is_root() {
            Ok(matter.clone())
        } else {
            self.repo.check_by_id(matter.id).await
        }
    }

    /// Upload `stream` as a new file named `filename` inside `dir`.
    ///
    /// The size limit is checked once the whole stream is written; a file
    /// over the limit is removed before the error is returned.
    pub async fn upload(
        &self,
        stream: ByteStream,
        user: &User,
        dir: &Matter,
        filename: &str,
        privacy: bool,
    ) -> AppResult<Matter> {
        validate::check_name(filename, self.name_max_length)?;
        require_directory_of(dir, user)?;

        if self
            .repo
            .count_by_owner_parent_kind_name(user.id, dir.id, false, filename)
            .await?
            > 0
        {
            return Err(AppError::conflict(format!(
                "'{filename}' already exists in this directory"
            )));
        }

        self.paths
            .ensure_user_root(self.storage.as_ref(), &user.username)
            .await?;
        self.storage
            .create_dir(&self.paths.key_for(&user.username, &dir.relative_path))
            .await?;

        let relative_path = dir.child_path(filename);
        let key = self.paths.key_for(&user.username, &relative_path);
        if self.storage.exists(&key).await? {
            if self.storage.is_dir(&key).await? {
                return Err(AppError::conflict(format!(
                    "A directory already occupies '{relative_path}'"
                )));
            }
            warn!(key = %key, "Removing stale file at upload destination");
            self.storage.delete(&key).await?;
        }

        let written = match self.storage.write_stream(&key, stream).await {
            Ok(written) => written,
            Err(e) => {
                self.discard_file(&key).await;
                return Err(e);
            }
        };
        debug!(key = %key, size = %human_size(written as i64), "Upload written");

        if user.exceeds_limit(written) {
            self.storage.delete(&key).await?;
            return Err(AppError::quota(format!(
                "File size exceeds the limit: {} > {}",
                human_size(written as i64),
                human_size(user.size_limit),
            )));
        }

        let record = CreateMatter {
            parent_id: dir.id,
            owner_id: user.id,
            owner_name: user.username.clone(),
            is_directory: false,
            name: filename.to_string(),
            relative_path,
            size: written as i64,
            privacy,
            content_hash: None,
        };
        let matter = match self.repo.create(&record).await {
            Ok(matter) => matter,
            Err(e) => {
                self.discard_file(&key).await;
                return Err(e);
            }
        };

        info!(
            user_id = %user.id,
            matter_id = %matter.id,
            path = %matter.relative_path,
            size = matter.size,
            "File uploaded"
        );
        Ok(matter)
    }

    /// Create a directory named `name` inside `dir`.
    pub async fn create_directory(
        &self,
        dir: &Matter,
        name: &str,
        user: &User,
    ) -> AppResult<Matter> {
        require_directory_of(dir, user)?;
        let name = validate::normalize_name(name, self.name_max_length)?;

        if self
            .repo
            .count_by_owner_parent_kind_name(user.id, dir.id, true, &name)
            .await?
            > 0
        {
            return Err(AppError::conflict(format!(
                "'{name}' already exists, please use another name"
            )));
        }
        if dir.depth() + 1 > self.max_depth {
            return Err(AppError::validation(format!(
                "Directories can nest at most {} levels",
                self.max_depth
            )));
        }

        self.paths
            .ensure_user_root(self.storage.as_ref(), &user.username)
            .await?;
        let key = self.paths.key_for(&user.username, &dir.child_path(&name));
        if self.storage.exists(&key).await? && !self.storage.is_dir(&key).await? {
            return Err(AppError::conflict(format!(
                "A file already occupies '{}'",
                dir.child_path(&name)
            )));
        }
        self.storage.create_dir(&key).await?;

        let matter = self
            .repo
            .create(&CreateMatter::directory(dir, &name))
            .await?;

        info!(
            user_id = %user.id,
            matter_id = %matter.id,
            path = %matter.relative_path,
            "Directory created"
        );
        Ok(matter)
    }

    /// Make sure every directory along `path` exists and return the deepest.
    ///
    /// Existing segments are reused, so repeating a call is harmless.
    pub async fn create_directories_by_path(&self, user: &User, path: &str) -> AppResult<Matter> {
        let segments = validate::split_directory_path(path, self.name_max_length, self.max_depth)?;

        let mut dir = Matter::root(user);
        for segment in segments {
            dir = match self
                .repo
                .find_by_owner_parent_kind_name(user.id, dir.id, true, &segment)
                .await?
            {
                Some(existing) => existing,
                None => self.create_directory(&dir, &segment, user).await?,
            };
        }
        Ok(dir)
    }

    /// Fetch `url` and upload its body as `filename` inside `dir`.
    pub async fn crawl(
        &self,
        url: &str,
        filename: &str,
        user: &User,
        dir: &Matter,
        privacy: bool,
    ) -> AppResult<Matter> {
        validate::check_crawl_url(url)?;
        let stream = self.fetcher.fetch(url).await?;
        info!(user_id = %user.id, url, "Crawling remote resource");
        self.upload(stream, user, dir, filename, privacy).await
    }

    /// Best-effort removal of a partially written file.
    async fn discard_file(&self, key: &str) {
        if let Err(e) = self.storage.delete(key).await {
            warn!(key, error = %e, "Failed to remove partial file");
        }
    }
}

/// Fail unless `dir` is a directory owned by `user`.
pub(crate) fn require_directory_of(dir: &Matter, user: &User) -> AppResult<()> {
    if !dir.is_directory {
        return Err(AppError::validation(format!(
            "'{}' is not a directory",
            dir.name
        )));
    }
    if dir.owner_id != user.id {
        return Err(AppError::validation(format!(
            "Directory '{}' does not belong to {}",
            dir.name, user.username
        )));
    }
    Ok(())
}
