//! Ancestor chain assembly.

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use treehub_core::error::AppError;
use treehub_core::result::AppResult;
use treehub_database::MatterRepository;
use treehub_entity::matter::{MATTER_ROOT, Matter, MatterDetail};

/// Walks a matter's parents up to the virtual root.
///
/// The walk is read-only and never touches the records it loads.
#[derive(Debug, Clone)]
pub struct DetailAssembler {
    repo: Arc<dyn MatterRepository>,
}

impl DetailAssembler {
    /// Create a new detail assembler.
    pub fn new(repo: Arc<dyn MatterRepository>) -> Self {
        Self { repo }
    }

    /// Attach the ancestor chain to `matter`.
    ///
    /// Fails with not-found if any ancestor record is missing.
    pub async fn wrap_detail(&self, matter: Matter) -> AppResult<MatterDetail> {
        let mut ancestors = Vec::new();
        let mut seen = HashSet::from([matter.id]);
        let mut parent_id = matter.parent_id;

        while parent_id != MATTER_ROOT {
            if !seen.insert(parent_id) {
                return Err(AppError::internal(format!(
                    "Ancestry of matter {} loops through {parent_id}",
                    matter.id
                )));
            }
            let parent = self.repo.check_by_id(parent_id).await?;
            parent_id = parent.parent_id;
            ancestors.push(parent);
        }

        ancestors.reverse();
        Ok(MatterDetail { matter, ancestors })
    }

    /// Load a matter by identifier with its ancestor chain.
    pub async fn detail(&self, id: Uuid) -> AppResult<MatterDetail> {
        let matter = self.repo.check_by_id(id).await?;
        self.wrap_detail(matter).await
    }

    /// Identifiers of `matter` and all its ancestors, nearest first.
    pub async fn lineage(&self, matter: &Matter) -> AppResult<Vec<Uuid>> {
        Ok(self.wrap_detail(matter.clone()).await?.lineage_ids())
    }
}
