use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use duet_api::middleware::require_auth;
use duet_api::state::{AppState, AppStateInner};
use duet_api::{pairing, presence};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "duet=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("DUET_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("DUET_DB_PATH").unwrap_or_else(|_| "duet.db".into());
    let host = std::env::var("DUET_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("DUET_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Init database
    let db = duet_db::Database::open(&PathBuf::from(&db_path))?;

    // Shared state
    let state: AppState = Arc::new(AppStateInner { db, jwt_secret });

    // Routes: everything sits behind the identity layer; token issuance
    // belongs to the external auth service.
    let app = Router::new()
        .route(
            "/pairing/invitations",
            post(pairing::create_invitation).get(pairing::list_invitations),
        )
        .route(
            "/pairing/invitations/{invitation_id}/accept",
            post(pairing::accept_invitation),
        )
        .route(
            "/pairing/invitations/{invitation_id}/decline",
            post(pairing::decline_invitation),
        )
        .route("/pairing/relationship", get(pairing::get_relationship))
        .route("/pairing/partner", get(pairing::get_partner))
        .route("/presence/heartbeat", post(presence::heartbeat))
        .route("/presence/beacon", post(presence::offline_beacon))
        .route("/presence/batch", post(presence::batch_presence))
        .route("/presence/{user_id}", get(presence::single_presence))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Duet server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
