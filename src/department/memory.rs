use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{child_dep_path, Department, DepartmentRepository, NewDepartment};
use crate::error::{AppError, DatabaseError};

#[derive(Default)]
struct Table {
    next_id: i32,
    rows: BTreeMap<i32, Department>,
}

/// Same bookkeeping as the Postgres store, held in a map.
/// Ids start at 1 and are never reused.
#[derive(Default)]
pub struct InMemoryDepartmentRepository {
    table: RwLock<Table>,
}

impl InMemoryDepartmentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DepartmentRepository for InMemoryDepartmentRepository {
    async fn list_by_parent(&self, parent_id: Option<i32>) -> Result<Vec<Department>, AppError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|d| d.parent_id == parent_id)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Department>, AppError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn create(&self, department: NewDepartment) -> Result<Department, AppError> {
        let mut table = self.table.write().await;

        let parent_path = match department.parent_id {
            Some(parent_id) => {
                let parent = table.rows.get(&parent_id).ok_or_else(|| {
                    DatabaseError::NotFound(format!("parent department {}", parent_id))
                })?;
                Some(parent.dep_path.clone().unwrap_or_default())
            }
            None => None,
        };

        table.next_id += 1;
        let id = table.next_id;
        let created = Department {
            id,
            name: department.name,
            parent_id: department.parent_id,
            dep_path: Some(child_dep_path(parent_path.as_deref(), id)),
            enabled: department.enabled,
            is_parent: false,
        };
        table.rows.insert(id, created.clone());

        if let Some(parent) = department.parent_id.and_then(|pid| table.rows.get_mut(&pid)) {
            parent.is_parent = true;
        }

        Ok(created)
    }

    async fn delete(&self, id: i32) -> Result<(), AppError> {
        let mut table = self.table.write().await;

        let parent_id = table
            .rows
            .get(&id)
            .ok_or_else(|| DatabaseError::NotFound(format!("department {}", id)))?
            .parent_id;

        let children = table.rows.values().filter(|d| d.parent_id == Some(id)).count();
        if children > 0 {
            return Err(DatabaseError::HasDependents(format!(
                "department {} has {} child department(s)",
                id, children
            ))
            .into());
        }

        table.rows.remove(&id);

        if let Some(parent_id) = parent_id {
            let still_parent = table.rows.values().any(|d| d.parent_id == Some(parent_id));
            if let Some(parent) = table.rows.get_mut(&parent_id) {
                parent.is_parent = still_parent;
            }
        }

        Ok(())
    }
}
