mod config;

use std::{process, sync::Arc, thread};

use actix_web::{
  delete, get, middleware::Logger, put, web, App, HttpResponse, HttpServer, Responder,
};
use env_logger::Env;
use kvlog::{db::Engine, errors::Errors};
use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::config::ServerConfig;

#[derive(Debug, Serialize, Deserialize)]
struct StatResponse {
  key_num: usize,
  last_sequence: u64,
  replayed_events: usize,
}

fn error_response(e: Errors) -> HttpResponse {
  let mut builder = match e {
    Errors::KeyNotFound => HttpResponse::NotFound(),
    Errors::KeyIsEmpty => HttpResponse::BadRequest(),
    Errors::LoggerDegraded => HttpResponse::ServiceUnavailable(),
    _ => HttpResponse::InternalServerError(),
  };
  builder.body(e.to_string())
}

#[get("/")]
async fn health_handler(eng: web::Data<Arc<Engine>>) -> impl Responder {
  let eng = eng.get_ref().clone();
  // With informational events on, this enqueues a log record and may block.
  match web::block(move || eng.health_check()).await {
    Ok(true) => HttpResponse::Ok().body("Healthcheck works..."),
    Ok(false) => HttpResponse::ServiceUnavailable().body("transaction log unavailable"),
    Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
  }
}

#[put("/v1/key/{key}")]
async fn put_handler(
  eng: web::Data<Arc<Engine>>,
  key: web::Path<String>,
  value: String,
) -> impl Responder {
  let eng = eng.get_ref().clone();
  let key = key.into_inner();
  // May block on a full log queue, so keep it off the async workers.
  match web::block(move || eng.put(&key, &value)).await {
    Ok(Ok(())) => HttpResponse::Created().finish(),
    Ok(Err(e)) => error_response(e),
    Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
  }
}

#[get("/v1/key/{key}")]
async fn get_handler(eng: web::Data<Arc<Engine>>, key: web::Path<String>) -> impl Responder {
  let eng = eng.get_ref().clone();
  let key = key.into_inner();
  match web::block(move || eng.get(&key)).await {
    Ok(Ok(value)) => HttpResponse::Ok().body(value),
    Ok(Err(e)) => error_response(e),
    Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
  }
}

#[delete("/v1/key/{key}")]
async fn delete_handler(eng: web::Data<Arc<Engine>>, key: web::Path<String>) -> impl Responder {
  let eng = eng.get_ref().clone();
  let key = key.into_inner();
  match web::block(move || eng.delete(&key)).await {
    Ok(Ok(())) => HttpResponse::Ok().finish(),
    Ok(Err(e)) => error_response(e),
    Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
  }
}

#[get("/v1/stat")]
async fn stat_handler(eng: web::Data<Arc<Engine>>) -> impl Responder {
  let stat = eng.stat();
  HttpResponse::Ok().json(StatResponse {
    key_num: stat.key_num,
    last_sequence: stat.last_sequence,
    replayed_events: stat.replayed_events,
  })
}

/// Logs the first transaction log failure. After it the engine only serves reads.
fn supervise(engine: &Engine) {
  let failures = engine.failures();
  let spawned = thread::Builder::new()
    .name("kvlog-supervisor".to_string())
    .spawn(move || {
      if let Ok(e) = failures.recv() {
        error!("transaction log failed, store is now read-only: {}", e);
      }
    });
  if let Err(e) = spawned {
    error!("failed to start log supervisor: {}", e);
  }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

  let cfg = ServerConfig::from_env();
  let engine = match Engine::open(cfg.options.clone()) {
    Ok(engine) => Arc::new(engine),
    Err(e) => {
      error!(
        "failed to initialize transaction log {:?}: {}",
        cfg.options.log_path, e
      );
      process::exit(1);
    }
  };
  supervise(&engine);

  info!("Listening on {}", cfg.listen_addr);
  HttpServer::new(move || {
    App::new()
      .wrap(Logger::default())
      .app_data(web::Data::new(engine.clone()))
      .service(health_handler)
      .service(stat_handler)
      .service(put_handler)
      .service(get_handler)
      .service(delete_handler)
  })
  .bind(cfg.listen_addr.as_str())?
  .run()
  .await
}
