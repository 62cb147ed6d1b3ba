use std::rc::Rc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use log::debug;
use sqlx::SqlitePool;

use crate::auth::session::SESSION_COOKIE;
use crate::error::AppError;
use crate::repository::SessionRepository;

/// Rejects requests without a live session with `401 {"error": ...}`.
///
/// On success the session's `SessionUser` is inserted into the request
/// extensions, where the `AuthenticatedUser` extractor picks it up.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
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
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let session_id = req.cookie(SESSION_COOKIE).map(|c| c.value().to_string());
            let pool = req
                .app_data::<web::Data<SqlitePool>>()
                .cloned()
                .ok_or_else(|| AppError::InternalServerError("Database pool not configured".into()))?;

            let user = match session_id {
                Some(id) => SessionRepository::new(&pool).find_user(&id).await?,
                None => None,
            };

            match user {
                Some(user) => {
                    req.extensions_mut().insert(user);
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                None => {
                    debug!("Rejected unauthenticated request to {}", req.path());
                    let response = AppError::Unauthorized("Not authenticated".into())
                        .error_response()
                        .map_into_right_body();
                    let (request, _payload) = req.into_parts();
                    Ok(ServiceResponse::new(request, response))
                }
            }
        })
    }
}
