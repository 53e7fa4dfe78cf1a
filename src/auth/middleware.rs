use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::auth::extractors::AuthenticatedUserId;
use crate::auth::session::SessionManager;
use crate::auth::SESSION_COOKIE;
use crate::error::AppError;

/// Middleware gate for protected scopes.
///
/// Every request passing through must carry a `session_token` cookie whose
/// token resolves in the session store. Requests without a cookie, or with a
/// token the store does not know, are rejected with 401 before the downstream
/// handler runs; a store failure is rejected with 500 instead. On success the
/// resolved identity is inserted into request extensions for handlers to read
/// via the [`AuthenticatedUserId`] extractor.
///
/// The [`SessionManager`] is taken from app data, so the gate is stateless and
/// safe to apply to any scope of an app that registers one.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
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
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let token = match req.cookie(SESSION_COOKIE) {
                Some(cookie) => cookie.value().to_owned(),
                None => {
                    // No token: reject without touching the store.
                    return Err(
                        AppError::Unauthorized("no valid authorization token".into()).into()
                    );
                }
            };

            let sessions = req
                .app_data::<web::Data<SessionManager>>()
                .cloned()
                .ok_or_else(|| {
                    AppError::InternalServerError("session manager not configured".into())
                })?;

            // Store miss -> 401, store failure -> 500; validate_session
            // already draws that distinction.
            let user_id = sessions.validate_session(&token).await?;
            req.extensions_mut().insert(AuthenticatedUserId(user_id));

            service.call(req).await
        })
    }
}
