use serde::{Deserialize, Serialize};

use storefront_core::{CategoryId, DomainError, DomainResult, Entity};

/// Category: a node in the self-referential catalog hierarchy.
///
/// Only the child holds the `parent_id`; the parent's children and the
/// many-to-many item links are queries against the store. The original
/// mutually-pointing parent/child collections are gone, so the "update both
/// sides together" invariant lives in the store's `add_child` operation,
/// which assigns the parent in the same transaction that checks it exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    id: CategoryId,
    name: String,
    parent_id: Option<CategoryId>,
}

impl Category {
    pub fn create(name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        Ok(Self {
            id: CategoryId::new(),
            name,
            parent_id: None,
        })
    }

    /// Rehydrate a category from stored state.
    pub fn from_parts(id: CategoryId, name: String, parent_id: Option<CategoryId>) -> Self {
        Self {
            id,
            name,
            parent_id,
        }
    }

    pub fn id_typed(&self) -> CategoryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent_id(&self) -> Option<CategoryId> {
        self.parent_id
    }

    /// Attach this category under a parent.
    pub fn assign_parent(&mut self, parent_id: CategoryId) -> DomainResult<()> {
        if parent_id == self.id {
            return Err(DomainError::invariant("category cannot be its own parent"));
        }
        self.parent_id = Some(parent_id);
        Ok(())
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_rejects_blank_name() {
        let err = Category::create("  ").unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for blank name"),
        }
    }

    #[test]
    fn assign_parent_links_the_child_side() {
        let parent = Category::create("books").unwrap();
        let mut child = Category::create("novels").unwrap();
        child.assign_parent(parent.id_typed()).unwrap();
        assert_eq!(child.parent_id(), Some(parent.id_typed()));
    }

    #[test]
    fn assign_parent_rejects_self_reference() {
        let mut cat = Category::create("books").unwrap();
        let id = cat.id_typed();
        let err = cat.assign_parent(id).unwrap_err();
        match err {
            DomainError::InvariantViolation(_) => {}
            _ => panic!("Expected InvariantViolation for self-parenting"),
        }
        assert_eq!(cat.parent_id(), None);
    }
}
