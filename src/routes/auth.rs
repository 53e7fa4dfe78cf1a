use crate::{
    auth::{hash_password, verify_password, Credentials, SessionManager, SESSION_COOKIE},
    error::AppError,
    models::User,
};
use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{post, web, HttpRequest, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

/// Builds the session cookie for a freshly issued token.
///
/// HttpOnly and SameSite=Strict, scoped to the whole site, with Max-Age
/// aligned to the store-side TTL so browser and store expire together.
fn session_cookie(token: String, ttl: std::time::Duration) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .http_only(true)
        .path("/")
        .same_site(SameSite::Strict)
        .max_age(CookieDuration::seconds(ttl.as_secs() as i64))
        .finish()
}

/// Register a new user
///
/// Validates the submitted credentials, hashes the password, and creates the
/// user account. Registration does not log the user in; the client follows up
/// with a login request.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    credentials: web::Json<Credentials>,
) -> Result<impl Responder, AppError> {
    // Validate input
    credentials.validate()?;

    // Check if username already exists
    if User::find_by_username(&pool, &credentials.username)
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest("username already registered".into()));
    }

    // Hash password off the request reactor; bcrypt at cost 12 is slow on purpose.
    let password = credentials.password.clone();
    let password_hash = web::block(move || hash_password(&password)).await??;

    let user = User::create(&pool, &credentials.username, &password_hash).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "successfully created user",
        "id": user.id,
        "username": user.username
    })))
}

/// Login user
///
/// Authenticates a user, issues a session token backed by the session store,
/// and sets it as a cookie on the response. An unknown username and a wrong
/// password produce the identical response, so the endpoint cannot be used to
/// probe which usernames exist.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    sessions: web::Data<SessionManager>,
    credentials: web::Json<Credentials>,
) -> Result<impl Responder, AppError> {
    // Validate input
    credentials.validate()?;

    let user = User::find_by_username(&pool, &credentials.username)
        .await?
        .ok_or_else(|| AppError::BadRequest("wrong username or password".into()))?;

    let password = credentials.password.clone();
    let password_hash = user.password_hash.clone();
    let password_matches = web::block(move || verify_password(&password, &password_hash)).await?;

    if !password_matches {
        return Err(AppError::BadRequest("wrong username or password".into()));
    }

    let token = sessions.issue_session(user.id).await?;
    let cookie = session_cookie(token, sessions.session_ttl());

    Ok(HttpResponse::Ok().cookie(cookie).json(json!({
        "message": "successfully logged in",
        "user_id": user.id
    })))
}

/// Logout user
///
/// Revokes the session token in the store, then sends a removal cookie.
/// A request without a cookie still succeeds; there is simply nothing to revoke.
#[post("/logout")]
pub async fn logout(
    req: HttpRequest,
    sessions: web::Data<SessionManager>,
) -> Result<impl Responder, AppError> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        sessions.revoke_session(cookie.value()).await?;
    }

    let mut removal = Cookie::build(SESSION_COOKIE, "")
        .http_only(true)
        .path("/")
        .same_site(SameSite::Strict)
        .finish();
    removal.make_removal();

    Ok(HttpResponse::Ok().cookie(removal).json(json!({
        "message": "successfully logged out"
    })))
}
