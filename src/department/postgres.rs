use async_trait::async_trait;
use sqlx::PgPool;

use super::{child_dep_path, Department, DepartmentRepository, NewDepartment};
use crate::error::{AppError, DatabaseError};

pub struct PgDepartmentRepository {
    pool: PgPool,
}

impl PgDepartmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DepartmentRepository for PgDepartmentRepository {
    async fn list_by_parent(&self, parent_id: Option<i32>) -> Result<Vec<Department>, AppError> {
        let departments = sqlx::query_as::<_, Department>(
            r#"
            SELECT id, name, parent_id, dep_path, enabled, is_parent
            FROM t_department
            WHERE parent_id IS NOT DISTINCT FROM $1
            ORDER BY id
            "#,
        )
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(departments)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Department>, AppError> {
        let department = sqlx::query_as::<_, Department>(
            r#"
            SELECT id, name, parent_id, dep_path, enabled, is_parent
            FROM t_department
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(department)
    }

    async fn create(&self, department: NewDepartment) -> Result<Department, AppError> {
        let mut tx = self.pool.begin().await?;

        let parent_path = match department.parent_id {
            Some(parent_id) => {
                let path = sqlx::query_scalar::<_, Option<String>>(
                    "SELECT dep_path FROM t_department WHERE id = $1 FOR UPDATE",
                )
                .bind(parent_id)
                .fetch_optional(&mut tx)
                .await?
                .ok_or_else(|| {
                    DatabaseError::NotFound(format!("parent department {}", parent_id))
                })?;
                Some(path.unwrap_or_default())
            }
            None => None,
        };

        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO t_department (name, parent_id, enabled, is_parent)
            VALUES ($1, $2, $3, FALSE)
            RETURNING id
            "#,
        )
        .bind(&department.name)
        .bind(department.parent_id)
        .bind(department.enabled)
        .fetch_one(&mut tx)
        .await?;

        let created = sqlx::query_as::<_, Department>(
            r#"
            UPDATE t_department SET dep_path = $1
            WHERE id = $2
            RETURNING id, name, parent_id, dep_path, enabled, is_parent
            "#,
        )
        .bind(child_dep_path(parent_path.as_deref(), id))
        .bind(id)
        .fetch_one(&mut tx)
        .await?;

        if let Some(parent_id) = department.parent_id {
            sqlx::query("UPDATE t_department SET is_parent = TRUE WHERE id = $1")
                .bind(parent_id)
                .execute(&mut tx)
                .await?;
        }

        tx.commit().await?;

        tracing::debug!(department_id = created.id, parent_id = ?created.parent_id, "Department inserted");
        Ok(created)
    }

    async fn delete(&self, id: i32) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let parent_id = sqlx::query_scalar::<_, Option<i32>>(
            "SELECT parent_id FROM t_department WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut tx)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("department {}", id)))?;

        // serializes sibling deletes so the is_parent update below sees them
        if let Some(parent_id) = parent_id {
            sqlx::query("SELECT id FROM t_department WHERE id = $1 FOR UPDATE")
                .bind(parent_id)
                .execute(&mut tx)
                .await?;
        }

        let children = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM t_department WHERE parent_id = $1",
        )
        .bind(id)
        .fetch_one(&mut tx)
        .await?;

        if children > 0 {
            return Err(DatabaseError::HasDependents(format!(
                "department {} has {} child department(s)",
                id, children
            ))
            .into());
        }

        sqlx::query("DELETE FROM t_department WHERE id = $1")
            .bind(id)
            .execute(&mut tx)
            .await?;

        if let Some(parent_id) = parent_id {
            sqlx::query(
                r#"
                UPDATE t_department
                SET is_parent = EXISTS (SELECT 1 FROM t_department WHERE parent_id = $1)
                WHERE id = $1
                "#,
            )
            .bind(parent_id)
            .execute(&mut tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(department_id = id, "Department deleted");
        Ok(())
    }
}
