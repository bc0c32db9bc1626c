//! Matter repository contract and its PostgreSQL implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use treehub_core::error::{AppError, ErrorKind};
use treehub_core::result::AppResult;
use treehub_entity::matter::{CreateMatter, Matter, MatterFilter};

/// Unique constraint guarding sibling names.
const SIBLING_NAME_CONSTRAINT: &str = "matters_sibling_name_key";

/// Persistence contract for matter records.
///
/// Every method is a single point operation; there is no transaction
/// spanning several calls.
#[async_trait]
pub trait MatterRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a new record and return it with its assigned identifier.
    async fn create(&self, data: &CreateMatter) -> AppResult<Matter>;

    /// Persist the mutable fields of an existing record.
    async fn save(&self, matter: &Matter) -> AppResult<Matter>;

    /// Delete a record by identifier. Returns `true` if a record was removed.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Find a record by identifier.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Matter>>;

    /// Find a record by identifier, failing with a not-found error.
    async fn check_by_id(&self, id: Uuid) -> AppResult<Matter> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Matter {id} not found")))
    }

    /// Count siblings with the given owner, parent, kind and name.
    async fn count_by_owner_parent_kind_name(
        &self,
        owner_id: Uuid,
        parent_id: Uuid,
        is_directory: bool,
        name: &str,
    ) -> AppResult<u64>;

    /// Find the sibling with the given owner, parent, kind and name.
    async fn find_by_owner_parent_kind_name(
        &self,
        owner_id: Uuid,
        parent_id: Uuid,
        is_directory: bool,
        name: &str,
    ) -> AppResult<Option<Matter>>;

    /// Find the record at an exact relative path for an owner.
    async fn find_by_owner_and_path(
        &self,
        owner_id: Uuid,
        relative_path: &str,
    ) -> AppResult<Option<Matter>>;

    /// List the direct children of a directory.
    async fn list_children(
        &self,
        parent_id: Uuid,
        owner_id: Uuid,
        filter: &MatterFilter,
    ) -> AppResult<Vec<Matter>>;
}

/// PostgreSQL-backed matter repository.
#[derive(Debug, Clone)]
pub struct PgMatterRepository {
    pool: PgPool,
}

impl PgMatterRepository {
    /// Create a new matter repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a write error, turning sibling-name violations into conflicts.
fn map_write_error(err: sqlx::Error, name: &str, action: &str) -> AppError {
    match err {
        sqlx::Error::Database(ref db_err)
            if db_err.constraint() == Some(SIBLING_NAME_CONSTRAINT) =>
        {
            AppError::conflict(format!("'{name}' already exists in this directory"))
        }
        _ => AppError::with_source(ErrorKind::Database, format!("Failed to {action} matter"), err),
    }
}

/// Escape `\`, `%` and `_` so a search text matches literally inside `ILIKE`.
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl MatterRepository for PgMatterRepository {
    async fn create(&self, data: &CreateMatter) -> AppResult<Matter> {
        sqlx::query_as::<_, Matter>(
            "INSERT INTO matters (id, parent_id, owner_id, owner_name, is_directory, name, \
             relative_path, size, privacy, content_hash) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(data.parent_id)
        .bind(data.owner_id)
        .bind(&data.owner_name)
        .bind(data.is_directory)
        .bind(&data.name)
        .bind(&data.relative_path)
        .bind(data.size)
        .bind(data.privacy)
        .bind(&data.content_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &data.name, "create"))
    }

    async fn save(&self, matter: &Matter) -> AppResult<Matter> {
        sqlx::query_as::<_, Matter>(
            "UPDATE matters SET parent_id = $2, name = $3, relative_path = $4, size = $5, \
             privacy = $6, content_hash = $7, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(matter.id)
        .bind(matter.parent_id)
        .bind(&matter.name)
        .bind(&matter.relative_path)
        .bind(matter.size)
        .bind(matter.privacy)
        .bind(&matter.content_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &matter.name, "save"))?
        .ok_or_else(|| AppError::not_found(format!("Matter {} not found", matter.id)))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM matters WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete matter", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Matter>> {
        sqlx::query_as::<_, Matter>("SELECT * FROM matters WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find matter", e))
    }

    async fn count_by_owner_parent_kind_name(
        &self,
        owner_id: Uuid,
        parent_id: Uuid,
        is_directory: bool,
        name: &str,
    ) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM matters \
             WHERE owner_id = $1 AND parent_id = $2 AND is_directory = $3 AND name = $4",
        )
        .bind(owner_id)
        .bind(parent_id)
        .bind(is_directory)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count siblings", e))?;
        Ok(count as u64)
    }

    async fn find_by_owner_parent_kind_name(
        &self,
        owner_id: Uuid,
        parent_id: Uuid,
        is_directory: bool,
        name: &str,
    ) -> AppResult<Option<Matter>> {
        sqlx::query_as::<_, Matter>(
            "SELECT * FROM matters \
             WHERE owner_id = $1 AND parent_id = $2 AND is_directory = $3 AND name = $4",
        )
        .bind(owner_id)
        .bind(parent_id)
        .bind(is_directory)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find sibling", e))
    }

    async fn find_by_owner_and_path(
        &self,
        owner_id: Uuid,
        relative_path: &str,
    ) -> AppResult<Option<Matter>> {
        sqlx::query_as::<_, Matter>(
            "SELECT * FROM matters WHERE owner_id = $1 AND relative_path = $2 LIMIT 1",
        )
        .bind(owner_id)
        .bind(relative_path)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find matter by path", e)
        })
    }

    async fn list_children(
        &self,
        parent_id: Uuid,
        owner_id: Uuid,
        filter: &MatterFilter,
    ) -> AppResult<Vec<Matter>> {
        sqlx::query_as::<_, Matter>(
            "SELECT * FROM matters WHERE parent_id = $1 AND owner_id = $2 \
             AND ($3::BOOLEAN IS NULL OR is_directory = $3) \
             AND ($4::TEXT IS NULL OR name ILIKE '%' || $4 || '%' ESCAPE '\\') \
             ORDER BY is_directory DESC, name ASC",
        )
        .bind(parent_id)
        .bind(owner_id)
        .bind(filter.directory_flag())
        .bind(filter.name_contains.as_deref().map(escape_like))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list children", e))
    }
}
