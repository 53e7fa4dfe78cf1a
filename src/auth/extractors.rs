use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;

/// Extracts the authenticated user's ID from request extensions.
///
/// This extractor is intended for routes protected by `AuthMiddleware`, which
/// resolves the session cookie against the store and inserts the user's ID
/// into request extensions. Identity is threaded through the request, never
/// through ambient state.
///
/// If the ID is not present (e.g. the route was registered outside a guarded
/// scope), this extractor returns `AppError::Unauthorized`.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUserId(pub i32);

impl FromRequest for AuthenticatedUserId {
    type Error = ActixError; // AppError is converted into ActixError via ResponseError
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUserId>().copied() {
            Some(user_id) => ready(Ok(user_id)),
            None => {
                // Reached only if the route is not behind AuthMiddleware;
                // rejecting as unauthorized is the safe default.
                let err = AppError::Unauthorized(
                    "no authenticated user on request. Ensure AuthMiddleware is active".to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}
