use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::PgPool;

use timeline_api::auth::SessionManager;
use timeline_api::config::Config;
use timeline_api::routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    let pool = PgPool::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Opening the client does not dial the store; connections are per request.
    let sessions = SessionManager::connect(&config).expect("Failed to open session store client");

    log::info!("starting Timeline API server at {}", config.server_url());

    let bind_addr = (config.server_host.clone(), config.server_port);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(sessions.clone()))
            .wrap(Logger::default())
            .service(routes::health::health)
            .service(web::scope("/api").configure(routes::config))
    })
    .bind(bind_addr)?
    .run()
    .await
}
