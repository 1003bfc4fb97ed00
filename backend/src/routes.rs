use std::io::Write;

use actix_files::Files;
use actix_multipart::Multipart;
use actix_web::{Error, HttpResponse, web};
use futures::{StreamExt, TryStreamExt};
use log::{error, info, warn};
use serde::Serialize;
use serde_json::json;
use shared::{FootprintRequest, ScanReport};

use crate::chat::models::{ChatReply, ChatRequest};
use crate::chat::ollama_service::OllamaService;
use crate::config::AppConfig;
use crate::engine::catalog::EngineContext;
use crate::engine::{emission, features, material};
use crate::tips;

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, frontend_dir: String) {
    cfg.service(web::resource("/api/footprint").route(web::post().to(score_footprint)))
        .service(web::resource("/api/scan").route(web::post().to(scan_item)))
        .service(web::resource("/api/questions").route(web::get().to(list_questions)))
        .service(web::resource("/api/tips/daily").route(web::get().to(get_daily_tip)))
        .service(web::resource("/api/chat").route(web::post().to(chat)))
        .service(Files::new("/static", frontend_dir).show_files_listing());
}

async fn score_footprint(
    engine: web::Data<EngineContext>,
    request: web::Json<FootprintRequest>,
) -> HttpResponse {
    match emission::score(&engine.catalog, &request.answers) {
        Ok(profile) => HttpResponse::Ok().json(profile),
        Err(e) => {
            info!("Rejected footprint request: {}", e);
            HttpResponse::BadRequest().json(ErrorResponse {
                error: e.to_string(),
            })
        }
    }
}

async fn scan_item(
    engine: web::Data<EngineContext>,
    mut payload: Multipart,
) -> Result<HttpResponse, Error> {
    let mut image_data = Vec::new();
    while let Ok(Some(mut field)) = payload.try_next().await {
        while let Some(chunk) = field.next().await {
            let data = chunk?;
            image_data.write_all(&data)?;
        }
    }

    if image_data.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse {
            error: "no image uploaded".to_string(),
        }));
    }

    let decoded = match image::load_from_memory(&image_data) {
        Ok(decoded) => decoded.to_rgb8(),
        Err(e) => {
            error!("Failed to decode uploaded image: {}", e);
            return Ok(HttpResponse::BadRequest().json(ErrorResponse {
                error: format!("could not decode image: {}", e),
            }));
        }
    };

    let features = features::extract(&decoded);
    match material::classify(&engine.rules, &features) {
        Ok(verdict) => Ok(HttpResponse::Ok().json(ScanReport { verdict, features })),
        Err(e) => {
            error!("Feature extraction produced an invalid vector: {}", e);
            Ok(HttpResponse::BadRequest().json(ErrorResponse {
                error: e.to_string(),
            }))
        }
    }
}

async fn list_questions(engine: web::Data<EngineContext>) -> HttpResponse {
    HttpResponse::Ok().json(engine.catalog.question_infos())
}

async fn get_daily_tip(config: web::Data<AppConfig>) -> HttpResponse {
    match tips::daily_tip(&config.tips) {
        Some(tip) => HttpResponse::Ok().json(json!({ "tip": tip })),
        None => HttpResponse::NotFound().json(ErrorResponse {
            error: "no tips configured".to_string(),
        }),
    }
}

async fn chat(service: web::Data<OllamaService>, request: web::Json<ChatRequest>) -> HttpResponse {
    match service.chat(&request.history, &request.message).await {
        Ok(reply) => HttpResponse::Ok().json(ChatReply { reply }),
        Err(e) => {
            // The scanner and profiler keep working without the assistant, so
            // a chat outage degrades to a friendly static reply.
            warn!("Chat passthrough failed: {}", e);
            HttpResponse::Ok().json(ChatReply {
                reply: service.offline_reply(),
            })
        }
    }
}
