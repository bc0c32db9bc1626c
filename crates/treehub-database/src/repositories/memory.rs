//! In-process matter repository.
//!
//! Holds every record in a map behind a Tokio `RwLock`. Used by tests and
//! by single-process tooling that has no PostgreSQL at hand. Enforces the
//! same sibling-name constraint as the `matters_sibling_name_key` index.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use treehub_core::error::AppError;
use treehub_core::result::AppResult;
use treehub_entity::matter::{CreateMatter, Matter, MatterFilter};

use super::matter::MatterRepository;

/// Matter repository backed by an in-memory map.
#[derive(Debug, Clone, Default)]
pub struct MemoryMatterRepository {
    records: Arc<RwLock<HashMap<Uuid, Matter>>>,
}

impl MemoryMatterRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the repository holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Snapshot of every stored record.
    pub async fn all(&self) -> Vec<Matter> {
        self.records.read().await.values().cloned().collect()
    }
}

fn is_sibling(
    m: &Matter,
    owner_id: Uuid,
    parent_id: Uuid,
    is_directory: bool,
    name: &str,
) -> bool {
    m.owner_id == owner_id
        && m.parent_id == parent_id
        && m.is_directory == is_directory
        && m.name == name
}

fn sibling_conflict(name: &str) -> AppError {
    AppError::conflict(format!("'{name}' already exists in this directory"))
}

#[async_trait]
impl MatterRepository for MemoryMatterRepository {
    async fn create(&self, data: &CreateMatter) -> AppResult<Matter> {
        let mut records = self.records.write().await;
        if records.values().any(|m| {
            is_sibling(m, data.owner_id, data.parent_id, data.is_directory, &data.name)
        }) {
            return Err(sibling_conflict(&data.name));
        }

        let now = Utc::now();
        let matter = Matter {
            id: Uuid::now_v7(),
            parent_id: data.parent_id,
            owner_id: data.owner_id,
            owner_name: data.owner_name.clone(),
            is_directory: data.is_directory,
            name: data.name.clone(),
            relative_path: data.relative_path.clone(),
            size: data.size,
            privacy: data.privacy,
            content_hash: data.content_hash.clone(),
            created_at: now,
            updated_at: now,
        };
        records.insert(matter.id, matter.clone());
        Ok(matter)
    }

    async fn save(&self, matter: &Matter) -> AppResult<Matter> {
        let mut records = self.records.write().await;
        if !records.contains_key(&matter.id) {
            return Err(AppError::not_found(format!("Matter {} not found", matter.id)));
        }
        if records.values().any(|m| {
            m.id != matter.id
                && is_sibling(
                    m,
                    matter.owner_id,
                    matter.parent_id,
                    matter.is_directory,
                    &matter.name,
                )
        }) {
            return Err(sibling_conflict(&matter.name));
        }

        let mut saved = matter.clone();
        saved.updated_at = Utc::now();
        records.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.records.write().await.remove(&id).is_some())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Matter>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn count_by_owner_parent_kind_name(
        &self,
        owner_id: Uuid,
        parent_id: Uuid,
        is_directory: bool,
        name: &str,
    ) -> AppResult<u64> {
        let records = self.records.read().await;
        let count = records
            .values()
            .filter(|m| is_sibling(m, owner_id, parent_id, is_directory, name))
            .count();
        Ok(count as u64)
    }

    async fn find_by_owner_parent_kind_name(
        &self,
        owner_id: Uuid,
        parent_id: Uuid,
        is_directory: bool,
        name: &str,
    ) -> AppResult<Option<Matter>> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .find(|m| is_sibling(m, owner_id, parent_id, is_directory, name))
            .cloned())
    }

    async fn find_by_owner_and_path(
        &self,
        owner_id: Uuid,
        relative_path: &str,
    ) -> AppResult<Option<Matter>> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .find(|m| m.owner_id == owner_id && m.relative_path == relative_path)
            .cloned())
    }

    async fn list_children(
        &self,
        parent_id: Uuid,
        owner_id: Uuid,
        filter: &MatterFilter,
    ) -> AppResult<Vec<Matter>> {
        let records = self.records.read().await;
        let mut children: Vec<Matter> = records
            .values()
            .filter(|m| m.parent_id == parent_id && m.owner_id == owner_id && filter.matches(m))
            .cloned()
            .collect();
        children.sort_by(|a, b| {
            b.is_directory
                .cmp(&a.is_directory)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(children)
    }
}
