use actix_web::HttpResponse;

/// GET /health_check
///
/// Liveness probe. Touches neither the token service nor the database.
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().finish()
}
