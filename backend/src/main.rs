use std::io;
use std::sync::Arc;

use actix_web::{App, HttpServer};
use mongodb::Client;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use backend::domain::ports::ObjectStore;
use backend::domain::TokenSigner;
use backend::inbound::http::HttpState;
use backend::middleware::Trace;
use backend::outbound::object_store::S3ObjectStore;
use backend::outbound::persistence::{MongoInvitationRepository, MongoUserRepository};
use backend::server::{configure_app, AppConfig};

fn init_tracing() {
    let result = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init();
    if let Err(err) = result {
        eprintln!("tracing init failed: {err}");
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    init_tracing();

    let config = AppConfig::from_env().map_err(io::Error::other)?;

    let client = Client::with_uri_str(&config.database_url)
        .await
        .map_err(io::Error::other)?;
    let database = client.database(&config.database_name);

    let users = MongoUserRepository::new(&database);
    users.ensure_indexes().await.map_err(io::Error::other)?;
    let invitations = MongoInvitationRepository::new(&database);

    let object_store: Option<Arc<dyn ObjectStore>> = match &config.object_store {
        Some(store) => {
            info!(bucket = %store.bucket, region = %store.region, "object storage configured");
            Some(Arc::new(S3ObjectStore::new(
                store.bucket.clone(),
                store.region.clone(),
                store.access_key.clone(),
                store.secret_key.clone(),
            )))
        }
        None => {
            warn!("object storage not configured; upload endpoints disabled");
            None
        }
    };

    let state = HttpState::new(
        Arc::new(users),
        Arc::new(invitations),
        object_store,
        Arc::new(TokenSigner::new(&config.jwt_secret)),
    );

    let addr = config.bind_addr();
    info!(port = addr.1, "starting http server");
    HttpServer::new(move || {
        App::new()
            .wrap(Trace)
            .configure(|cfg| configure_app(cfg, state.clone()))
    })
    .bind(addr)?
    .run()
    .await
}
