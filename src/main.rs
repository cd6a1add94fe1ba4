use std::{net::SocketAddr, sync::Arc};

use mongodb::Client;

use cafe_order::{
    AppState,
    config::{self, StorageBackend},
    routes,
    services::{db_init, memory_store::MemoryStore, mongo_store::MongoStore, store::Store},
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let settings = match config::load() {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    let store: Arc<dyn Store> = match settings.storage {
        StorageBackend::Mongo => {
            let client = Client::with_uri_str(&settings.mongodb_uri)
                .await
                .expect("Failed to connect to MongoDB");
            let db = client.database(&settings.mongodb_db);

            if let Err(e) = db_init::ensure_indexes(&db).await {
                tracing::warn!("could not ensure indexes: {e}");
            }
            Arc::new(MongoStore::new(db))
        }
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage, data is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState::new(settings.clone(), store);
    let app = routes::app(state);

    let ip = settings
        .host
        .parse::<std::net::IpAddr>()
        .expect("HOST must be an IP address");
    let addr = SocketAddr::from((ip, settings.port));
    tracing::info!(max_tables = settings.max_tables, "listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
