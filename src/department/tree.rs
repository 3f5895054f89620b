use futures::future::BoxFuture;
use serde::Serialize;

use super::{Department, DepartmentRepository};
use crate::error::{AppError, DatabaseError};

/// Deeper trees are treated as corrupt `parent_id` links.
pub const MAX_TREE_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentNode {
    #[serde(flatten)]
    pub department: Department,
    pub children: Vec<DepartmentNode>,
}

/// Load every department below `parent_id` (the whole forest for `None`),
/// one `list_by_parent` call per department.
pub async fn load_tree(
    repo: &dyn DepartmentRepository,
    parent_id: Option<i32>,
) -> Result<Vec<DepartmentNode>, AppError> {
    load_level(repo, parent_id, 0).await
}

fn load_level<'a>(
    repo: &'a dyn DepartmentRepository,
    parent_id: Option<i32>,
    depth: usize,
) -> BoxFuture<'a, Result<Vec<DepartmentNode>, AppError>> {
    Box::pin(async move {
        if depth >= MAX_TREE_DEPTH {
            return Err(DatabaseError::UnexpectedError(format!(
                "department tree under {:?} is deeper than {} levels",
                parent_id, MAX_TREE_DEPTH
            ))
            .into());
        }

        let mut nodes = Vec::new();
        for department in repo.list_by_parent(parent_id).await? {
            let children = load_level(repo, Some(department.id), depth + 1).await?;
            nodes.push(DepartmentNode { department, children });
        }
        Ok(nodes)
    })
}
