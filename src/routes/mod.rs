mod auth;
mod departments;
mod health_check;

pub use auth::{admin_info, login, logout, refresh, LoginRequest, TokenResponse};
pub use departments::{
    create_department, delete_department, department_children, department_tree,
    CreateDepartmentRequest,
};
pub use health_check::health_check;
