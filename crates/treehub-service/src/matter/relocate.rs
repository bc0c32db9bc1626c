//! Move, copy, rename and delete.
//!
//! Directory walks use an explicit worklist. Each entry carries its depth
//! below the starting matter so a corrupt parent chain cannot loop forever.

use tracing::{debug, info};
use uuid::Uuid;

use treehub_core::error::AppError;
use treehub_core::result::AppResult;
use treehub_entity::matter::{CreateMatter, Matter, MatterFilter};
use treehub_entity::user::User;

use super::service::MatterService;
use super::validate;

impl MatterService {
    /// Move `src` into `dest`, keeping its name.
    ///
    /// A directory moves with one physical rename; every descendant's
    /// relative path is re-stamped afterwards.
    pub async fn move_matter(&self, src: &Matter, dest: &Matter) -> AppResult<Matter> {
        self.check_relocatable(src, dest)?;

        let new_path = dest.child_path(&src.name);
        if self
            .repo
            .count_by_owner_parent_kind_name(src.owner_id, dest.id, src.is_directory, &src.name)
            .await?
            > 0
        {
            return Err(AppError::conflict(format!("'{new_path}' already exists")));
        }

        let from = self.paths.storage_key(src);
        let to = self.paths.key_for(&src.owner_name, &new_path);
        if self.storage.exists(&to).await? {
            return Err(AppError::conflict(format!("'{new_path}' is already occupied")));
        }
        self.storage.rename(&from, &to).await?;

        if !src.is_directory {
            self.images.delete_by_matter_id(src.id).await?;
        }

        let mut moved = src.clone();
        moved.parent_id = dest.id;
        moved.relative_path = new_path;
        let moved = self.repo.save(&moved).await?;

        if moved.is_directory {
            self.restamp_descendants(&moved).await?;
        }

        info!(
            user_id = %moved.owner_id,
            matter_id = %moved.id,
            from = %src.relative_path,
            to = %moved.relative_path,
            "Matter moved"
        );
        Ok(moved)
    }

    /// Copy `src` into `dest` under `name`. Directories are copied with
    /// all their descendants; every copy gets a new identifier.
    pub async fn copy_matter(&self, src: &Matter, dest: &Matter, name: &str) -> AppResult<Matter> {
        self.check_relocatable(src, dest)?;
        validate::check_name(name, self.name_max_length)?;

        let new_path = dest.child_path(name);
        if self
            .repo
            .count_by_owner_parent_kind_name(src.owner_id, dest.id, src.is_directory, name)
            .await?
            > 0
        {
            return Err(AppError::conflict(format!("'{new_path}' already exists")));
        }
        if self
            .storage
            .exists(&self.paths.key_for(&dest.owner_name, &new_path))
            .await?
        {
            return Err(AppError::conflict(format!("'{new_path}' is already occupied")));
        }

        let top = self.copy_one(src, dest, name).await?;
        if src.is_directory {
            let mut work = vec![(src.clone(), top.clone(), 1usize)];
            while let Some((source_dir, copy_dir, depth)) = work.pop() {
                self.check_walk_depth(depth, &source_dir)?;
                let children = self
                    .repo
                    .list_children(source_dir.id, source_dir.owner_id, &MatterFilter::all())
                    .await?;
                for child in children {
                    let copied = self.copy_one(&child, &copy_dir, &child.name).await?;
                    if child.is_directory {
                        work.push((child, copied, depth + 1));
                    }
                }
            }
        }

        info!(
            user_id = %top.owner_id,
            source_id = %src.id,
            matter_id = %top.id,
            path = %top.relative_path,
            "Matter copied"
        );
        Ok(top)
    }

    /// Rename `matter` in place.
    pub async fn rename_matter(&self, matter: &Matter, name: &str, user: &User) -> AppResult<Matter> {
        if matter.is_root() {
            return Err(AppError::validation("The root directory cannot be renamed"));
        }
        if matter.owner_id != user.id {
            return Err(AppError::validation(format!(
                "'{}' does not belong to {}",
                matter.name, user.username
            )));
        }
        let name = validate::normalize_name(name, self.name_max_length)?;
        if name == matter.name {
            return Err(AppError::conflict(
                "The new name is the same as the current name",
            ));
        }
        if self
            .repo
            .count_by_owner_parent_kind_name(user.id, matter.parent_id, matter.is_directory, &name)
            .await?
            > 0
        {
            return Err(AppError::conflict(format!(
                "'{name}' already exists, please use another name"
            )));
        }

        let new_path = format!("{}/{}", matter.parent_path(), name);
        let from = self.paths.storage_key(matter);
        let to = self.paths.key_for(&matter.owner_name, &new_path);
        if self.storage.exists(&to).await? {
            return Err(AppError::conflict(format!("'{new_path}' is already occupied")));
        }
        self.storage.rename(&from, &to).await?;

        if !matter.is_directory {
            self.images.delete_by_matter_id(matter.id).await?;
        }

        let mut renamed = matter.clone();
        renamed.name = name;
        renamed.relative_path = new_path;
        let renamed = self.repo.save(&renamed).await?;

        if renamed.is_directory {
            self.restamp_descendants(&renamed).await?;
        }

        info!(
            user_id = %user.id,
            matter_id = %renamed.id,
            path = %renamed.relative_path,
            "Matter renamed"
        );
        Ok(renamed)
    }

    /// Delete `matter` with all its descendants. Returns the number of
    /// records removed.
    pub async fn delete_matter(&self, matter: &Matter) -> AppResult<u64> {
        if matter.is_root() {
            return Err(AppError::validation("The root directory cannot be deleted"));
        }

        let mut doomed = Vec::new();
        let mut work = vec![(matter.clone(), 0usize)];
        while let Some((current, depth)) = work.pop() {
            if current.is_directory {
                self.check_walk_depth(depth, &current)?;
                let children = self
                    .repo
                    .list_children(current.id, current.owner_id, &MatterFilter::all())
                    .await?;
                work.extend(children.into_iter().map(|child| (child, depth + 1)));
            }
            doomed.push(current);
        }

        let mut removed = 0u64;
        for record in &doomed {
            if !record.is_directory {
                self.images.delete_by_matter_id(record.id).await?;
            }
            if self.repo.delete(record.id).await? {
                removed += 1;
            }
        }

        let key = self.paths.storage_key(matter);
        if matter.is_directory {
            self.storage.delete_dir(&key).await?;
        } else {
            self.storage.delete(&key).await?;
        }

        info!(
            user_id = %matter.owner_id,
            matter_id = %matter.id,
            path = %matter.relative_path,
            removed,
            "Matter deleted"
        );
        Ok(removed)
    }

    /// Apply the overwrite policy for `destination_path` of `owner_id`.
    ///
    /// An existing matter there is deleted when `overwrite` is set;
    /// otherwise the operation is rejected before anything changes.
    pub async fn handle_overwrite(
        &self,
        owner_id: Uuid,
        destination_path: &str,
        overwrite: bool,
    ) -> AppResult<()> {
        let Some(existing) = self
            .repo
            .find_by_owner_and_path(owner_id, destination_path)
            .await?
        else {
            return Ok(());
        };

        if !overwrite {
            return Err(AppError::conflict(format!(
                "'{destination_path}' already exists"
            )));
        }
        debug!(matter_id = %existing.id, path = destination_path, "Overwriting matter");
        self.delete_matter(&existing).await?;
        Ok(())
    }

    /// Recompute the relative path of every descendant of `dir` from its
    /// current path. Returns the number of records re-stamped.
    pub async fn restamp_descendants(&self, dir: &Matter) -> AppResult<u64> {
        let mut restamped = 0u64;
        let mut work = vec![(dir.clone(), 1usize)];

        while let Some((parent, depth)) = work.pop() {
            self.check_walk_depth(depth, &parent)?;
            let children = self
                .repo
                .list_children(parent.id, parent.owner_id, &MatterFilter::all())
                .await?;
            for mut child in children {
                if !child.is_directory {
                    self.images.delete_by_matter_id(child.id).await?;
                }
                child.relative_path = parent.child_path(&child.name);
                let child = self.repo.save(&child).await?;
                restamped += 1;
                if child.is_directory {
                    work.push((child, depth + 1));
                }
            }
        }

        debug!(matter_id = %dir.id, restamped, "Re-stamped descendant paths");
        Ok(restamped)
    }

    /// Fail if `dest` is `src` or lies beneath it.
    pub async fn ensure_not_descendant(&self, src: &Matter, dest: &Matter) -> AppResult<()> {
        if self.details.lineage(dest).await?.contains(&src.id) {
            return Err(AppError::conflict(
                "A directory cannot be placed into itself or one of its descendants",
            ));
        }
        Ok(())
    }

    /// Fail if placing `src` under `dest` would nest directories deeper
    /// than allowed. Files never add a level.
    pub async fn ensure_depth_fits(&self, src: &Matter, dest: &Matter) -> AppResult<()> {
        if !src.is_directory {
            return Ok(());
        }
        let height = self.subtree_height(src).await?;
        if dest.depth() + height > self.max_depth {
            return Err(AppError::validation(format!(
                "Directories can nest at most {} levels",
                self.max_depth
            )));
        }
        Ok(())
    }

    /// Number of directory levels `dir` occupies, itself included.
    async fn subtree_height(&self, dir: &Matter) -> AppResult<usize> {
        let mut height = 1usize;
        let mut work = vec![(dir.clone(), 1usize)];
        while let Some((current, level)) = work.pop() {
            self.check_walk_depth(level, &current)?;
            let subdirs = self
                .repo
                .list_children(current.id, current.owner_id, &MatterFilter::directories())
                .await?;
            for child in subdirs {
                height = height.max(level + 1);
                work.push((child, level + 1));
            }
        }
        Ok(height)
    }

    fn check_relocatable(&self, src: &Matter, dest: &Matter) -> AppResult<()> {
        if src.is_root() {
            return Err(AppError::validation("The root directory cannot be relocated"));
        }
        if !dest.is_directory {
            return Err(AppError::validation("The destination must be a directory"));
        }
        if src.owner_id != dest.owner_id {
            return Err(AppError::validation(
                "Source and destination belong to different users",
            ));
        }
        Ok(())
    }

    fn check_walk_depth(&self, depth: usize, at: &Matter) -> AppResult<()> {
        if depth > self.max_depth {
            return Err(AppError::internal(format!(
                "Tree under {} is deeper than {} levels",
                at.relative_path, self.max_depth
            )));
        }
        Ok(())
    }

    /// Copy one matter (without descendants) into `dest` as `name`.
    async fn copy_one(&self, src: &Matter, dest: &Matter, name: &str) -> AppResult<Matter> {
        let relative_path = dest.child_path(name);
        let to = self.paths.key_for(&dest.owner_name, &relative_path);

        if src.is_directory {
            self.storage.create_dir(&to).await?;
        } else {
            self.storage
                .copy(&self.paths.storage_key(src), &to)
                .await?;
        }

        let record = CreateMatter {
            parent_id: dest.id,
            owner_id: src.owner_id,
            owner_name: src.owner_name.clone(),
            is_directory: src.is_directory,
            name: name.to_string(),
            relative_path,
            size: src.size,
            privacy: src.privacy,
            content_hash: None,
        };
        self.repo.create(&record).await
    }
}
