mod chat;
mod config;
mod engine;
mod routes;
mod tips;

use std::env;

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use chat::ollama_service::OllamaService;
use config::AppConfig;
use engine::catalog::EngineContext;
use routes::configure_routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    dotenv::dotenv().ok();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Configuration loading failed: {}", e),
            ));
        }
    };

    // The scoring tables are cross-validated once here; a broken catalog is
    // fatal to startup, never a per-request error.
    let engine = match EngineContext::from_config(&config) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("Invalid scoring tables: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Engine startup failed: {}", e),
            ));
        }
    };

    let ollama_url =
        env::var("OLLAMA_URL").unwrap_or_else(|_| "http://localhost:11434".to_string());
    let assistant = OllamaService::new(
        ollama_url,
        config.ollama.model.clone(),
        config.ollama.system_prompt.clone(),
    );

    let frontend_dir = if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        format!("{}/../static", manifest_dir)
    } else {
        "/usr/src/app/static".to_string()
    };

    let engine_data = web::Data::new(engine);
    let config_data = web::Data::new(config);
    let assistant_data = web::Data::new(assistant);

    let port = env::var("PORT").unwrap_or_else(|_| "8081".to_string());
    let bind_address = format!("0.0.0.0:{}", port);

    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(engine_data.clone())
            .app_data(config_data.clone())
            .app_data(assistant_data.clone())
            .configure(|cfg| configure_routes(cfg, frontend_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
