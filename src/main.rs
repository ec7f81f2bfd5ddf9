use actix_web::{middleware::Logger, web, App, HttpServer};
use tracing_subscriber::EnvFilter;

use student_dashboard::api;
use student_dashboard::config::Config;
use student_dashboard::model::ModelStore;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    tracing::info!("loading model artifacts from {}", config.model_dir.display());

    let store = ModelStore::new(&config.model_dir);
    if let Err(e) = store.get() {
        // Not fatal: requests keep retrying and report the error until the files appear.
        tracing::warn!("starting without a model: {}", e);
    }

    let store = web::Data::new(store);
    let (host, port) = config.bind_addr();
    tracing::info!("starting Student Performance Dashboard on http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(store.clone())
            .configure(api::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;

    Ok(())
}
