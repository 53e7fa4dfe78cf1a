use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use dotenv::dotenv;
use serde_json::json;
use sqlx::PgPool;
use std::time::Duration;

use timeline_api::auth::{SessionManager, SESSION_COOKIE};
use timeline_api::routes;
use timeline_api::routes::health;

// Full register/login/protected-access flow. Needs a live Postgres at
// DATABASE_URL (with the users table created) and a live Redis at REDIS_URL.
#[ignore]
#[actix_rt::test]
async fn test_register_login_and_protected_access_flow() {
    dotenv().ok(); // Load .env file

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test DB");

    let redis_url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    let client = redis::Client::open(redis_url).expect("Failed to open Redis client");
    let sessions =
        SessionManager::new(client, Duration::from_secs(60), Duration::from_millis(2000));

    // Clean up potential existing user
    let _ = sqlx::query("DELETE FROM users WHERE username = $1")
        .bind("a@example.com")
        .execute(&pool)
        .await;

    // Inline App setup, mirroring main.rs
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(sessions.clone()))
            .wrap(Logger::default())
            .service(health::health) // health is outside /api and the auth gate
            .service(web::scope("/api").configure(routes::config)),
    )
    .await;

    // Register a new user
    let register_payload = json!({
        "username": "a@example.com",
        "password": "Passw0rd!"
    });
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&register_payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    let status = resp.status();
    let body_bytes = test::read_body(resp).await; // Read body for potential error message
    assert_eq!(
        status,
        actix_web::http::StatusCode::CREATED,
        "Registration failed. Body: {:?}",
        String::from_utf8_lossy(&body_bytes)
    );

    // Try to register the same user again (should fail)
    let req_conflict = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&register_payload)
        .to_request();
    let resp_conflict = test::call_service(&app, req_conflict).await;
    assert_eq!(
        resp_conflict.status(),
        actix_web::http::StatusCode::BAD_REQUEST,
        "Duplicate registration did not fail as expected"
    );

    // Login with the wrong password: generic message, and no cookie set
    let req_wrong = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({
            "username": "a@example.com",
            "password": "Wr0ngPassw0rd!"
        }))
        .to_request();
    let resp_wrong = test::call_service(&app, req_wrong).await;
    assert_eq!(resp_wrong.status(), actix_web::http::StatusCode::BAD_REQUEST);
    assert!(
        resp_wrong.response().cookies().next().is_none(),
        "Failed login must not set a session cookie"
    );
    let body_wrong: serde_json::Value = test::read_body_json(resp_wrong).await;
    assert_eq!(body_wrong["error"], "wrong username or password");

    // Login with the correct credentials
    let req_login = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({
            "username": "a@example.com",
            "password": "Passw0rd!"
        }))
        .to_request();
    let resp_login = test::call_service(&app, req_login).await;
    assert_eq!(resp_login.status(), actix_web::http::StatusCode::OK);

    let session_cookie = resp_login
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .expect("Login must set the session cookie")
        .into_owned();
    assert!(!session_cookie.value().is_empty());

    let login_body: serde_json::Value = test::read_body_json(resp_login).await;
    let user_id = login_body["user_id"].as_i64().expect("user_id in login response") as i32;

    // The store must now resolve the token to the logged-in user
    let resolved = sessions
        .validate_session(session_cookie.value())
        .await
        .expect("Issued token must resolve in the store");
    assert_eq!(resolved, user_id);

    // A protected route without a cookie is rejected
    let req_bare = test::TestRequest::get().uri("/api/users/me").to_request();
    let resp_bare = test::try_call_service(&app, req_bare).await;
    let err = resp_bare.expect_err("Protected route must reject cookieless requests");
    assert_eq!(err.error_response().status(), 401);

    // With the cookie from login, the request is forwarded
    let req_me = test::TestRequest::get()
        .uri("/api/users/me")
        .cookie(session_cookie.clone())
        .to_request();
    let resp_me = test::call_service(&app, req_me).await;
    assert_eq!(resp_me.status(), actix_web::http::StatusCode::OK);
    let me_body: serde_json::Value = test::read_body_json(resp_me).await;
    assert_eq!(me_body["username"], "a@example.com");
    assert_eq!(me_body["id"], user_id);

    // An expired token is rejected
    let short_lived = SessionManager::new(
        redis::Client::open(
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
        )
        .unwrap(),
        Duration::from_secs(1),
        Duration::from_millis(2000),
    );
    let expiring_token = short_lived.issue_session(user_id).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;

    let req_expired = test::TestRequest::get()
        .uri("/api/users/me")
        .cookie(actix_web::cookie::Cookie::new(SESSION_COOKIE, expiring_token))
        .to_request();
    let resp_expired = test::try_call_service(&app, req_expired).await;
    let err = resp_expired.expect_err("Expired token must be rejected");
    assert_eq!(err.error_response().status(), 401);

    // Logout revokes the live session
    let req_logout = test::TestRequest::post()
        .uri("/api/auth/logout")
        .cookie(session_cookie.clone())
        .to_request();
    let resp_logout = test::call_service(&app, req_logout).await;
    assert_eq!(resp_logout.status(), actix_web::http::StatusCode::OK);

    let req_after_logout = test::TestRequest::get()
        .uri("/api/users/me")
        .cookie(session_cookie)
        .to_request();
    let resp_after_logout = test::try_call_service(&app, req_after_logout).await;
    let err = resp_after_logout.expect_err("Revoked token must be rejected");
    assert_eq!(err.error_response().status(), 401);
}

// Password rotation over the full stack. Same live-service requirements as above.
#[ignore]
#[actix_rt::test]
async fn test_password_rotation_flow() {
    dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test DB");

    let redis_url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    let client = redis::Client::open(redis_url).expect("Failed to open Redis client");
    let sessions =
        SessionManager::new(client, Duration::from_secs(60), Duration::from_millis(2000));

    let _ = sqlx::query("DELETE FROM users WHERE username = $1")
        .bind("rotate@example.com")
        .execute(&pool)
        .await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(sessions.clone()))
            .service(web::scope("/api").configure(routes::config)),
    )
    .await;

    // Register and login
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "username": "rotate@example.com",
            "password": "Passw0rd!"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({
            "username": "rotate@example.com",
            "password": "Passw0rd!"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let session_cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .expect("Login must set the session cookie")
        .into_owned();

    // Rotation with the wrong current password fails
    let req = test::TestRequest::put()
        .uri("/api/users/me/password")
        .cookie(session_cookie.clone())
        .set_json(json!({
            "current_password": "Wr0ngPassw0rd!",
            "new_password": "N3wPassw0rd!"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);

    // Rotation with the correct current password succeeds
    let req = test::TestRequest::put()
        .uri("/api/users/me/password")
        .cookie(session_cookie)
        .set_json(json!({
            "current_password": "Passw0rd!",
            "new_password": "N3wPassw0rd!"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);

    // Only the new password logs in now
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({
            "username": "rotate@example.com",
            "password": "Passw0rd!"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({
            "username": "rotate@example.com",
            "password": "N3wPassw0rd!"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
}
