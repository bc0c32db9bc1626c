//! Locked entry points of the tree mutation engine.
//!
//! Each method takes the per-user lock for its whole body, reloads the
//! matters it was handed, validates, then runs the unlocked variant. The
//! lock is released on every exit path when the guard drops. Calling one
//! of these from inside another for the same user deadlocks.

use treehub_core::error::AppError;
use treehub_core::result::AppResult;
use treehub_core::traits::ByteStream;
use treehub_entity::matter::Matter;
use treehub_entity::user::User;

use super::service::MatterService;
use super::validate;

impl MatterService {
    /// Locked [`upload`](Self::upload).
    pub async fn atomic_upload(
        &self,
        stream: ByteStream,
        user: &User,
        dir: &Matter,
        filename: &str,
        privacy: bool,
    ) -> AppResult<Matter> {
        let _guard = self.locks.acquire(user.id).await;
        let dir = self.refresh(dir).await?;
        self.upload(stream, user, &dir, filename, privacy).await
    }

    /// Locked [`create_directory`](Self::create_directory).
    pub async fn atomic_create_directory(
        &self,
        dir: &Matter,
        name: &str,
        user: &User,
    ) -> AppResult<Matter> {
        let _guard = self.locks.acquire(user.id).await;
        let dir = self.refresh(dir).await?;
        self.create_directory(&dir, name, user).await
    }

    /// Locked [`create_directories_by_path`](Self::create_directories_by_path).
    pub async fn atomic_create_directories(&self, user: &User, path: &str) -> AppResult<Matter> {
        let _guard = self.locks.acquire(user.id).await;
        self.create_directories_by_path(user, path).await
    }

    /// Move `src` into `dest`.
    ///
    /// Rejects a destination equal to or beneath `src`, then applies the
    /// overwrite policy at the destination path. Moving a matter into the
    /// directory it already lives in changes nothing.
    pub async fn atomic_move(
        &self,
        src: &Matter,
        dest: &Matter,
        overwrite: bool,
    ) -> AppResult<Matter> {
        let _guard = self.locks.acquire(src.owner_id).await;
        let src = self.refresh(src).await?;
        let dest = self.refresh(dest).await?;
        if !dest.is_directory {
            return Err(AppError::validation("The destination must be a directory"));
        }

        self.ensure_not_descendant(&src, &dest).await?;
        if src.parent_id == dest.id {
            return Ok(src);
        }
        self.ensure_depth_fits(&src, &dest).await?;
        let destination = dest.child_path(&src.name);
        check_destination(&src, &destination)?;
        self.handle_overwrite(src.owner_id, &destination, overwrite).await?;
        self.move_matter(&src, &dest).await
    }

    /// Move several matters into one destination under a single lock.
    ///
    /// Every item passes the cycle check before the first move. Each item
    /// is reloaded right before it moves, since an earlier move in the
    /// batch may have relocated it. A failing move aborts the remaining
    /// items; earlier moves stay applied.
    pub async fn atomic_move_batch(&self, srcs: &[Matter], dest: &Matter) -> AppResult<Vec<Matter>> {
        let _guard = self.locks.acquire(dest.owner_id).await;
        let dest = self.refresh(dest).await?;
        if !dest.is_directory {
            return Err(AppError::validation("The destination must be a directory"));
        }

        let lineage = self.details.lineage(&dest).await?;
        for src in srcs {
            if lineage.contains(&src.id) {
                return Err(AppError::conflict(format!(
                    "'{}' cannot be placed into itself or one of its descendants",
                    src.name
                )));
            }
            self.refresh(src).await?;
        }

        let mut moved = Vec::with_capacity(srcs.len());
        for src in srcs {
            let src = self.refresh(src).await?;
            if src.parent_id == dest.id {
                moved.push(src);
                continue;
            }
            self.ensure_depth_fits(&src, &dest).await?;
            moved.push(self.move_matter(&src, &dest).await?);
        }
        Ok(moved)
    }

    /// Copy `src` into `dest` as `name`, applying the overwrite policy to
    /// the top-level destination only.
    pub async fn atomic_copy(
        &self,
        src: &Matter,
        dest: &Matter,
        name: &str,
        overwrite: bool,
    ) -> AppResult<Matter> {
        let _guard = self.locks.acquire(src.owner_id).await;
        let src = self.refresh(src).await?;
        let dest = self.refresh(dest).await?;
        if !dest.is_directory {
            return Err(AppError::validation("The destination must be a directory"));
        }
        let name = validate::normalize_name(name, self.name_max_length)?;

        if src.is_directory {
            self.ensure_not_descendant(&src, &dest).await?;
        }
        self.ensure_depth_fits(&src, &dest).await?;
        let destination = dest.child_path(&name);
        check_destination(&src, &destination)?;
        self.handle_overwrite(src.owner_id, &destination, overwrite).await?;
        self.copy_matter(&src, &dest, &name).await
    }

    /// Locked [`rename_matter`](Self::rename_matter).
    pub async fn atomic_rename(&self, matter: &Matter, name: &str, user: &User) -> AppResult<Matter> {
        let _guard = self.locks.acquire(user.id).await;
        let matter = self.refresh(matter).await?;
        self.rename_matter(&matter, name, user).await
    }

    /// Locked [`crawl`](Self::crawl).
    pub async fn atomic_crawl(
        &self,
        url: &str,
        filename: &str,
        user: &User,
        dir: &Matter,
        privacy: bool,
    ) -> AppResult<Matter> {
        let _guard = self.locks.acquire(user.id).await;
        let dir = self.refresh(dir).await?;
        self.crawl(url, filename, user, &dir, privacy).await
    }

    /// Locked [`delete_matter`](Self::delete_matter).
    pub async fn atomic_delete(&self, matter: &Matter) -> AppResult<u64> {
        let _guard = self.locks.acquire(matter.owner_id).await;
        let matter = self.refresh(matter).await?;
        self.delete_matter(&matter).await
    }
}

/// Fail if `destination` is `src` itself or one of its ancestors.
fn check_destination(src: &Matter, destination: &str) -> AppResult<()> {
    let path = &src.relative_path;
    if path == destination
        || path
            .strip_prefix(destination)
            .is_some_and(|rest| rest.starts_with('/'))
    {
        return Err(AppError::conflict(format!(
            "'{destination}' contains the matter being placed there"
        )));
    }
    Ok(())
}
