pub mod auth;
pub mod health;
pub mod users;

use crate::auth::AuthMiddleware;
use actix_web::web;

/// Wires up the API routes.
///
/// The `/auth` scope is open; `/users` sits behind `AuthMiddleware`, so every
/// request into it must present a session token the store recognizes.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(auth::register)
            .service(auth::login)
            .service(auth::logout),
    )
    .service(
        web::scope("/users")
            .wrap(AuthMiddleware)
            .service(users::me)
            .service(users::change_password),
    );
}
