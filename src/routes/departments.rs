/// Department Routes
///
/// Tree listing, direct children, create and delete under
/// `/api/system/basic/department`. All of them sit behind `JwtMiddleware`.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::audit::{AuditLog, AuditStatus};
use crate::department::{load_tree, DepartmentRepository, NewDepartment};
use crate::error::{AppError, ErrorContext};
use crate::middleware::AuthenticatedUser;
use crate::validators::is_valid_department_name;

/// Create request; `parent_id` omitted or null creates a root department
#[derive(Deserialize)]
pub struct CreateDepartmentRequest {
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<i32>,
}

/// GET /api/system/basic/department
///
/// Every department, nested from the roots down.
pub async fn department_tree(
    departments: web::Data<dyn DepartmentRepository>,
) -> Result<HttpResponse, AppError> {
    let tree = load_tree(departments.get_ref(), None).await?;
    Ok(HttpResponse::Ok().json(tree))
}

/// GET /api/system/basic/department/{parent_id}/children
///
/// Direct children only; an unknown parent simply has none.
pub async fn department_children(
    path: web::Path<i32>,
    departments: web::Data<dyn DepartmentRepository>,
) -> Result<HttpResponse, AppError> {
    let children = departments.list_by_parent(Some(path.into_inner())).await?;
    Ok(HttpResponse::Ok().json(children))
}

/// POST /api/system/basic/department
///
/// # Errors
/// - 400: Name fails validation
/// - 404: `parent_id` names no department
pub async fn create_department(
    form: web::Json<CreateDepartmentRequest>,
    departments: web::Data<dyn DepartmentRepository>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("create_department").with_username(user.username());
    let form = form.into_inner();

    let name = is_valid_department_name(&form.name)?;

    let created = departments
        .create(NewDepartment {
            name,
            parent_id: form.parent_id,
            enabled: true,
        })
        .await;

    match created {
        Ok(department) => {
            AuditLog::new("CREATE", "department", AuditStatus::Success, "Department created")
                .with_resource_id(department.id)
                .with_username(user.username())
                .record();
            tracing::info!(
                request_id = %context.request_id,
                operation = %context.operation,
                department_id = department.id,
                "Department created"
            );
            Ok(HttpResponse::Created().json(department))
        }
        Err(e) => {
            AuditLog::new("CREATE", "department", AuditStatus::Failure, e.to_string())
                .with_username(user.username())
                .record();
            Err(e)
        }
    }
}

/// DELETE /api/system/basic/department/{id}
///
/// # Errors
/// - 404: No such department
/// - 409: Department still has children
pub async fn delete_department(
    path: web::Path<i32>,
    departments: web::Data<dyn DepartmentRepository>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let context = ErrorContext::new("delete_department").with_username(user.username());

    match departments.delete(id).await {
        Ok(()) => {
            AuditLog::new("DELETE", "department", AuditStatus::Success, "Department deleted")
                .with_resource_id(id)
                .with_username(user.username())
                .record();
            tracing::info!(
                request_id = %context.request_id,
                operation = %context.operation,
                department_id = id,
                "Department deleted"
            );
            Ok(HttpResponse::NoContent().finish())
        }
        Err(e) => {
            AuditLog::new("DELETE", "department", AuditStatus::Failure, e.to_string())
                .with_resource_id(id)
                .with_username(user.username())
                .record();
            Err(e)
        }
    }
}
