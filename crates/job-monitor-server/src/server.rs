use actix_cors::Cors;
use actix_web::{web, App, HttpServer};

use crate::config::ServerConfig;
use crate::handlers;
use crate::state::AppState;

pub fn app_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/dashboard", web::get().to(handlers::dashboard::handler))
            .route(
                "/backends/{name}/connectivity",
                web::get().to(handlers::connectivity::handler),
            )
            .route("/health", web::get().to(handlers::health::handler)),
    );
}

pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    log::info!(
        "Initializing server on {}:{} (upstream: {})",
        config.host,
        config.port,
        config.upstream_url.as_deref().unwrap_or("none")
    );
    let state = web::Data::new(AppState::from_config(&config)?);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Cors::permissive())
            .configure(app_config)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
