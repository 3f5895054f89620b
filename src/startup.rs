use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::TokenService;
use crate::configuration::JwtSettings;
use crate::department::DepartmentRepository;
use crate::logger::LoggerMiddleware;
use crate::middleware::JwtMiddleware;
use crate::routes::{
    admin_info, create_department, delete_department, department_children, department_tree,
    health_check, login, logout, refresh,
};
use crate::user::UserRepository;

pub fn run(
    listener: TcpListener,
    tokens: TokenService,
    departments: Arc<dyn DepartmentRepository>,
    users: Arc<dyn UserRepository>,
    jwt_config: JwtSettings,
) -> Result<Server, std::io::Error> {
    let tokens_data = web::Data::new(tokens.clone());
    let departments_data: web::Data<dyn DepartmentRepository> = web::Data::from(departments);
    let users_data: web::Data<dyn UserRepository> = web::Data::from(users.clone());
    let jwt_config_data = web::Data::new(jwt_config.clone());

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(Logger::default())
            .wrap(LoggerMiddleware)

            // Shared state
            .app_data(tokens_data.clone())
            .app_data(departments_data.clone())
            .app_data(users_data.clone())
            .app_data(jwt_config_data.clone())

            // Public routes
            .route("/health_check", web::get().to(health_check))
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout))
            .route("/auth/refresh", web::post().to(refresh))

            // Protected routes
            .service(
                web::scope("/api")
                    .wrap(JwtMiddleware::new(tokens.clone(), users.clone(), &jwt_config))
                    .route("/admin/info", web::get().to(admin_info))
                    .service(
                        web::scope("/system/basic/department")
                            .route("", web::get().to(department_tree))
                            .route("", web::post().to(create_department))
                            .route("/{parent_id}/children", web::get().to(department_children))
                            .route("/{id}", web::delete().to(delete_department)),
                    ),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
