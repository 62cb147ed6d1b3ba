use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use log::{error, info};

use turify_tasks::{
    config::Config,
    db,
    repository::SessionRepository,
    routes::{self, health},
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    let pool = match db::connect(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
        }
    };
    if let Err(e) = db::initialize(&pool).await {
        error!("Failed to initialize database schema: {}", e);
        return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
    }

    match SessionRepository::new(&pool).purge_expired().await {
        Ok(0) => {}
        Ok(purged) => info!("Purged {} expired session(s)", purged),
        Err(e) => error!("Failed to purge expired sessions: {}", e),
    }

    health::mark_started();
    let session_settings = config.session_settings();
    let cors_origin = config.cors_origin.clone();
    let app_config = web::Data::new(config.clone());

    info!("Starting server at {} ({})", config.server_url(), config.environment);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&cors_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(web::Data::new(pool.clone()))
            .app_data(app_config.clone())
            .app_data(web::Data::new(session_settings.clone()))
            .service(web::scope("/api").configure(routes::config))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
