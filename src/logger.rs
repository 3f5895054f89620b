use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    Error,
};
use futures::future::LocalBoxFuture;
use log::{info, warn};
use std::rc::Rc;
use std::time::Instant;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

tokio::task_local! {
    static REQUEST_ID: String;
}

/// Id of the request currently being served, if called under
/// [`LoggerMiddleware`].
pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|id| id.clone()).ok()
}

/// Logs every request's start and completion and tags the response
/// with an `x-request-id` (the caller's, if it sent one). The same id
/// is the `error_id` of any error body produced while serving it.
pub struct LoggerMiddleware;

impl<S, B> Transform<S, ServiceRequest> for LoggerMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = LoggerMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(LoggerMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct LoggerMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for LoggerMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start_time = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let request_id = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .filter(|id| !id.is_empty() && id.len() <= 128)
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        info!("Request started: {} {} [{}]", method, path, request_id);

        let http_req = req.request().clone();
        let service = self.service.clone();
        let inner = REQUEST_ID.sync_scope(request_id.clone(), || service.call(req));

        Box::pin(REQUEST_ID.scope(request_id.clone(), async move {
            let mut res = match inner.await {
                Ok(res) => res.map_into_left_body(),
                // rejected by an inner guard; render it here so the body
                // carries this request's id
                Err(err) => ServiceResponse::from_err(err, http_req).map_into_right_body(),
            };

            let elapsed = start_time.elapsed();
            let status = res.status();

            if let Ok(value) = HeaderValue::from_str(&request_id) {
                res.headers_mut()
                    .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
            }

            if status.is_server_error() {
                warn!(
                    "Request failed: {} {} - Status: {} ({}ms) [{}]",
                    method,
                    path,
                    status.as_u16(),
                    elapsed.as_millis(),
                    request_id
                );
            } else {
                info!(
                    "Request completed: {} {} - Status: {} ({}ms) [{}]",
                    method,
                    path,
                    status.as_u16(),
                    elapsed.as_millis(),
                    request_id
                );
            }

            Ok(res)
        }))
    }
}
