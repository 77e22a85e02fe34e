use std::fs;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use ontograph::interface::OntologyInterface;
use ontograph::server;
use ontograph::settings::{Settings, DEFAULT_SETTINGS_FILE};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SETTINGS_FILE.to_owned());
    let settings = Settings::load(&path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let interface = Arc::new(OntologyInterface::new(settings.persistor()));
    if let Some(preload) = &settings.ontology.preload {
        let snapshot = interface.load_graph(&fs::read(preload)?)?;
        info!(file = %preload, classes = snapshot.classes_count, "preloaded ontology");
    }

    let address = settings.address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(%address, mode = ?settings.storage.mode, "ontograph listening");
    axum::serve(listener, server::router(interface)).await?;
    Ok(())
}
