use std::sync::Arc;

use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;

use crop_backend::config::Config;
use crop_backend::handlers::{self, AppState};
use crop_backend::onnx::OnnxClassifier;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let model = OnnxClassifier::load(&config.model_path, &config.labels_path)
        .context("could not start without a model")?;
    let state = web::Data::new(AppState::new(Arc::new(model)));

    log::info!("Server running at http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(crop_backend::cors())
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(handlers::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
