use crate::{
    auth::{hash_password, verify_password, AuthenticatedUserId, ChangePasswordRequest},
    error::AppError,
    models::User,
};
use actix_web::{get, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

/// Returns the profile of the authenticated user.
///
/// The identity comes from the `AuthenticatedUserId` extractor, which reads
/// what `AuthMiddleware` resolved from the session store for this request.
#[get("/me")]
pub async fn me(
    pool: web::Data<PgPool>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let user = User::find_by_id(&pool, user_id.0)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(HttpResponse::Ok().json(user))
}

/// Rotates the authenticated user's password.
///
/// The current password is re-verified before the stored hash is replaced, so
/// a hijacked session alone is not enough to lock the owner out. The new
/// password is held to the same strength policy as at registration.
#[put("/me/password")]
pub async fn change_password(
    pool: web::Data<PgPool>,
    user_id: AuthenticatedUserId,
    payload: web::Json<ChangePasswordRequest>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let user = User::find_by_id(&pool, user_id.0)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let current = payload.current_password.clone();
    let stored_hash = user.password_hash.clone();
    let current_matches = web::block(move || verify_password(&current, &stored_hash)).await?;

    if !current_matches {
        return Err(AppError::BadRequest("wrong password".into()));
    }

    let new_password = payload.new_password.clone();
    let new_hash = web::block(move || hash_password(&new_password)).await??;

    User::update_password(&pool, user.id, &new_hash).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "successfully updated password"
    })))
}
