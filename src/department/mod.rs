/// Department hierarchy
///
/// A plain repository contract over the `t_department` table plus the
/// recursive tree loader used by the listing endpoint. The store keeps
/// `dep_path` and `is_parent` consistent on create/delete; everything
/// else (cycle prevention, cascading deletes) is out of scope.

mod memory;
mod postgres;
mod tree;

pub use memory::InMemoryDepartmentRepository;
pub use postgres::PgDepartmentRepository;
pub use tree::{load_tree, DepartmentNode, MAX_TREE_DEPTH};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Department {
    pub id: i32,
    pub name: String,
    /// `None` for a root department
    pub parent_id: Option<i32>,
    /// Dotted ancestor chain ending in this id, e.g. `.1.4.9`
    pub dep_path: Option<String>,
    pub enabled: bool,
    pub is_parent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewDepartment {
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<i32>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// `dep_path` of a department given its parent's path.
pub fn child_dep_path(parent_path: Option<&str>, id: i32) -> String {
    format!("{}.{}", parent_path.unwrap_or(""), id)
}

#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    /// Direct children of `parent_id`, or the roots for `None`, ordered by id.
    async fn list_by_parent(&self, parent_id: Option<i32>) -> Result<Vec<Department>, AppError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Department>, AppError>;

    /// # Errors
    /// `DatabaseError::NotFound` if `parent_id` names no department
    async fn create(&self, department: NewDepartment) -> Result<Department, AppError>;

    /// # Errors
    /// - `DatabaseError::NotFound` if `id` does not exist
    /// - `DatabaseError::HasDependents` if it still has children
    async fn delete(&self, id: i32) -> Result<(), AppError>;
}
