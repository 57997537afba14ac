mod application;
mod domain;
mod infrastructure;
mod presentation;
#[cfg(test)]
mod test_support;

use infrastructure::config::AppConfig;
use infrastructure::container::{AppContainer, StartupError};
use presentation::http::HttpServer;

async fn run() -> Result<(), StartupError> {
    let config = AppConfig::from_env()?;
    let port = config.server.port;

    let container = AppContainer::new(config)?;
    container.warm_up().await?;

    HttpServer::new(container.session_handler.clone(), Some(port))
        .run()
        .await
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run().await {
        tracing::error!("AgriRAG failed to start: {}", e);
        std::process::exit(1);
    }
}
